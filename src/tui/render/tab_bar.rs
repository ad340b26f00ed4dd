use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, View};

use super::spans_width;

/// Render the tab bar: one tab per view, project badge on the right,
/// separator line below
pub fn render_tab_bar(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    let sep_cols = render_tabs(frame, app, chunks[0]);
    render_separator(frame, app, chunks[1], &sep_cols);
}

/// Render tabs and return the column positions of each separator character.
fn render_tabs(frame: &mut Frame, app: &App, area: Rect) -> Vec<usize> {
    let bg = app.theme.background;
    let bg_style = Style::default().bg(bg);
    let mut spans: Vec<Span> = Vec::new();
    let mut sep_cols: Vec<usize> = Vec::new();
    let sep = Span::styled("\u{2502}", Style::default().fg(app.theme.dim).bg(bg));

    spans.push(Span::styled(" ", bg_style));
    spans.push(Span::styled(
        "\u{25B6}",
        Style::default().fg(app.theme.purple).bg(bg),
    ));
    spans.push(Span::styled(" ", bg_style));

    for (i, view) in View::ALL.iter().enumerate() {
        let label = format!(" {} {} ", i + 1, view.label());
        spans.push(Span::styled(label, tab_style(app, app.view == *view)));
        sep_cols.push(spans_width(&spans));
        spans.push(sep.clone());
    }

    let badge = match app.project {
        Some(id) => format!("project #{} ", id),
        None => "no project ".to_string(),
    };
    let used = spans_width(&spans);
    let width = area.width as usize;
    if used + badge.len() < width {
        spans.push(Span::styled(" ".repeat(width - used - badge.len()), bg_style));
        spans.push(Span::styled(badge, Style::default().fg(app.theme.dim).bg(bg)));
    }

    let tabs = Paragraph::new(Line::from(spans)).style(bg_style);
    frame.render_widget(tabs, area);
    sep_cols
}

fn render_separator(frame: &mut Frame, app: &App, area: Rect, sep_cols: &[usize]) {
    let width = area.width as usize;
    let line: String = (0..width)
        .map(|col| {
            if sep_cols.contains(&col) {
                '\u{2534}'
            } else {
                '\u{2500}'
            }
        })
        .collect();
    let sep_widget =
        Paragraph::new(line).style(Style::default().fg(app.theme.dim).bg(app.theme.background));
    frame.render_widget(sep_widget, area);
}

/// Style for a tab: highlighted if current, normal otherwise
fn tab_style(app: &App, is_current: bool) -> Style {
    if is_current {
        Style::default()
            .fg(app.theme.text_bright)
            .bg(app.theme.selection_bg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(app.theme.text).bg(app.theme.background)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn tabs_and_project_badge() {
        let app = offline_app(Some(42));
        let output = render_to_string(TERM_W, 2, |frame, area| {
            render_tab_bar(frame, &app, area);
        });
        let lines: Vec<&str> = output.lines().collect();
        assert!(lines[0].starts_with(" \u{25B6}  1 PRD \u{2502} 2 Tasks \u{2502} 3 Gantt \u{2502}"));
        assert!(lines[0].ends_with("project #42"));
        assert!(lines[1].contains('\u{2534}'));
    }
}
