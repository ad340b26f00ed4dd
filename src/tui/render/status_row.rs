use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, EditTarget, Mode, PrdField, View};

use super::spans_width;

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let mut spans: Vec<Span> = vec![Span::styled(" ", Style::default().bg(bg))];
    if app.generating {
        spans.push(Span::styled(
            "\u{25CF} generating  ",
            Style::default().fg(app.theme.yellow).bg(bg),
        ));
    }
    if let Some(status) = &app.status {
        let color = if status.is_error {
            app.theme.red
        } else {
            app.theme.text
        };
        spans.push(Span::styled(
            status.text.clone(),
            Style::default().fg(color).bg(bg),
        ));
    }

    // Key hints on the right, dropped when they don't fit
    let hint = hints(app);
    let content_width = spans_width(&spans);
    let hint_width = hint.chars().count();
    if content_width + hint_width < width {
        let padding = width - content_width - hint_width;
        spans.push(Span::styled(" ".repeat(padding), Style::default().bg(bg)));
        spans.push(Span::styled(hint, Style::default().fg(app.theme.dim).bg(bg)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

fn hints(app: &App) -> &'static str {
    match (app.mode, app.edit_target) {
        (Mode::Form, _) => "Tab field  Enter create  Esc cancel ",
        (Mode::Edit, EditTarget::Prd(PrdField::Body)) if app.prd.source.is_manual() => {
            "Enter newline  Esc done "
        }
        (Mode::Edit, EditTarget::Prd(_)) => "Enter/Esc done ",
        (Mode::Edit, EditTarget::Row) => "Tab next field  Enter/Esc done ",
        (Mode::Navigate, _) => match app.view {
            View::Prd => "e edit  m source  S submit  ? help ",
            View::Tasks => "a add  s subtask  e edit  g gantt  ? help ",
            View::Gantt => "h/l scroll  g regenerate  ? help ",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;

    fn render(app: &App) -> String {
        render_to_string(TERM_W, 1, |frame, area| {
            render_status_row(frame, app, area);
        })
    }

    #[test]
    fn navigate_shows_view_hints() {
        let app = app_with_tasks();
        let output = render(&app);
        assert!(output.ends_with("a add  s subtask  e edit  g gantt  ? help"));
    }

    #[test]
    fn message_on_the_left() {
        let mut app = app_with_tasks();
        app.set_error("create task failed: timeout");
        let output = render(&app);
        assert!(output.starts_with(" create task failed: timeout"));
        assert!(output.ends_with("? help"));
    }

    #[test]
    fn generating_indicator() {
        let mut app = app_with_tasks();
        app.generating = true;
        app.set_status("generating gantt chart...");
        let output = render(&app);
        assert!(output.starts_with(" \u{25CF} generating  generating gantt chart..."));
    }

    #[test]
    fn edit_mode_hints() {
        let mut app = offline_app(None);
        app.mode = Mode::Edit;
        app.edit_target = EditTarget::Prd(PrdField::Body);
        assert!(render(&app).ends_with("Enter newline  Esc done"));
        app.edit_target = EditTarget::Row;
        assert!(render(&app).ends_with("Tab next field  Enter/Esc done"));
    }
}
