use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::App;
use crate::tui::task_form::{FormField, FormKind, TaskForm};

use super::{centered_rect_fixed, with_cursor};

const POPUP_W: u16 = 56;
const LABEL_W: usize = 13;

/// Render the add task / add subtask popup over `area`
pub fn render_form_popup(frame: &mut Frame, app: &App, area: Rect) {
    let Some(form) = app.form.as_ref() else {
        return;
    };
    let theme = &app.theme;
    let bg = theme.background;

    let title = match form.kind {
        FormKind::Task => " New task ".to_string(),
        FormKind::Subtask { parent } => {
            let name = app
                .editor
                .tasks()
                .iter()
                .find(|t| t.id == parent)
                .map_or_else(|| parent.to_string(), |t| t.title.clone());
            format!(" New subtask of {} ", name)
        }
    };

    let mut lines: Vec<Line> = vec![Line::from("")];
    for &field in form.fields() {
        let focused = form.focus == field;
        let label_style = if focused {
            Style::default()
                .fg(theme.highlight)
                .bg(bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.dim).bg(bg)
        };
        let value_style = Style::default()
            .fg(if focused { theme.text_bright } else { theme.text })
            .bg(bg);
        lines.push(Line::from(vec![
            Span::styled(format!(" {:<w$}", field.label(), w = LABEL_W), label_style),
            field_value(app, form, field, focused, value_style),
        ]));
    }

    lines.push(Line::from(""));
    match &form.error {
        Some(error) => lines.push(Line::from(Span::styled(
            format!(" {}", error),
            Style::default().fg(theme.red).bg(bg),
        ))),
        None => lines.push(Line::from(Span::styled(
            " Enter create  Esc cancel",
            Style::default().fg(theme.dim).bg(bg),
        ))),
    }

    let height = lines.len() as u16 + 2;
    let popup = centered_rect_fixed(POPUP_W, height, area);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.selection_border).bg(bg))
        .style(Style::default().bg(bg));
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

fn field_value<'a>(
    app: &App,
    form: &TaskForm,
    field: FormField,
    focused: bool,
    style: Style,
) -> Span<'a> {
    let theme = &app.theme;
    let input = match field {
        FormField::Title => Some(&form.title),
        FormField::Description => Some(&form.description),
        FormField::Estimate => Some(&form.estimate),
        FormField::Type | FormField::Assignee => None,
    };
    if let Some(input) = input {
        let text = if focused {
            with_cursor(input)
        } else {
            input.text().to_string()
        };
        let text = if field == FormField::Estimate && !text.is_empty() {
            format!("{} days", text)
        } else {
            text
        };
        return Span::styled(text, style);
    }

    match field {
        FormField::Type => Span::styled(
            format!("[{}]", form.task_type.label()),
            Style::default()
                .fg(theme.type_color(form.task_type))
                .bg(theme.background),
        ),
        _ => match &form.assignee {
            Some(a) => Span::styled(
                format!("@{}", a.name),
                Style::default().fg(theme.cyan).bg(theme.background),
            ),
            None => Span::styled(
                "unassigned",
                Style::default().fg(theme.dim).bg(theme.background),
            ),
        },
    }
}
