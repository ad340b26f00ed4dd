use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::{App, View};

type Bindings = &'static [(&'static str, &'static str)];

const PRD_KEYS: Bindings = &[
    (" \u{2191}\u{2193}/jk", "Move between fields"),
    (" e/Enter", "Edit field"),
    (" m", "Switch manual / Confluence"),
    (" S", "Submit PRD and create project"),
];

const PRD_EDIT_KEYS: Bindings = &[
    (" Enter", "New line (PRD text)"),
    (" Esc", "Done"),
];

const TASK_KEYS: Bindings = &[
    (" \u{2191}\u{2193}/jk", "Move cursor"),
    (" Home/End", "Jump to first/last"),
    (" Space/Enter", "Expand / collapse"),
    (" e d n", "Edit title, description, days"),
    (" a", "Add task"),
    (" s", "Add subtask"),
    (" x", "Delete"),
    (" T", "Cycle type"),
    (" u / U", "Cycle assignee / unassign"),
    (" r", "Reload tasks"),
    (" g", "Generate gantt chart"),
];

const TASK_EDIT_KEYS: Bindings = &[
    (" Tab", "Next field on the row"),
    (" \u{2191}\u{2193}", "Leave field and move"),
    (" Enter/Esc", "Done"),
];

const FORM_KEYS: Bindings = &[
    (" Tab/S-Tab", "Next / previous field"),
    (" Space", "Cycle type or assignee"),
    (" Enter", "Create"),
    (" Esc", "Cancel"),
];

const GANTT_KEYS: Bindings = &[
    (" \u{2191}\u{2193}/jk", "Scroll rows"),
    (" \u{2190}\u{2192}/hl", "Scroll one day"),
    (" H/L", "Scroll one week"),
    (" r", "Reload chart"),
    (" g", "Regenerate chart"),
];

const GLOBAL_KEYS: Bindings = &[
    (" 1 2 3", "PRD, Tasks, Gantt"),
    (" Tab", "Next view"),
    (" ?", "Toggle this help"),
    (" q / Ctrl+C", "Quit"),
];

/// Render the help overlay (toggled with ?)
pub fn render_help_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let overlay_area = centered_rect(60, 90, area);
    frame.render_widget(Clear, overlay_area);

    let bg = app.theme.background;
    let key_style = Style::default()
        .fg(app.theme.highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let desc_style = Style::default().fg(app.theme.text).bg(bg);
    let header_style = Style::default()
        .fg(app.theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);

    let mut sections: Vec<(&str, Bindings)> = match app.view {
        View::Prd => vec![("PRD", PRD_KEYS), ("Editing", PRD_EDIT_KEYS)],
        View::Tasks => vec![
            ("Tasks", TASK_KEYS),
            ("Editing", TASK_EDIT_KEYS),
            ("Add form", FORM_KEYS),
        ],
        View::Gantt => vec![("Gantt", GANTT_KEYS)],
    };
    sections.push(("Global", GLOBAL_KEYS));

    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(" Key Bindings", header_style)),
        Line::from(""),
    ];
    for (title, bindings) in sections {
        lines.push(Line::from(Span::styled(format!(" {}", title), header_style)));
        for (key, desc) in bindings {
            add_binding(&mut lines, key, desc, key_style, desc_style);
        }
        lines.push(Line::from(""));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.dim).bg(bg))
        .style(Style::default().bg(bg));
    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().bg(bg));
    frame.render_widget(paragraph, overlay_area);
}

fn add_binding<'a>(
    lines: &mut Vec<Line<'a>>,
    key: &'a str,
    desc: &'a str,
    key_style: Style,
    desc_style: Style,
) {
    let key_width = 16;
    let padded_key = format!("{:<width$}", key, width = key_width);
    lines.push(Line::from(vec![
        Span::styled(padded_key, key_style),
        Span::styled(desc, desc_style),
    ]));
}

/// Create a centered rectangle of the given percentage of the parent
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;

    fn render(app: &App) -> String {
        render_to_string(TERM_W, 40, |frame, area| {
            render_help_overlay(frame, app, area);
        })
    }

    #[test]
    fn task_help_lists_row_keys_and_global() {
        let app = app_with_tasks();
        let output = render(&app);
        assert!(output.contains("Key Bindings"));
        assert!(output.contains("Add subtask"));
        assert!(output.contains("Next field on the row"));
        assert!(output.contains("Toggle this help"));
        assert!(!output.contains("Scroll one week"));
    }

    #[test]
    fn help_follows_the_view() {
        let mut app = offline_app(Some(7));
        app.view = View::Gantt;
        let output = render(&app);
        assert!(output.contains("Scroll one week"));
        assert!(!output.contains("Add subtask"));

        app.view = View::Prd;
        let output = render(&app);
        assert!(output.contains("Submit PRD and create project"));
    }
}
