use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::task::Task;
use crate::ops::task_tree::{EditField, RowEdit};
use crate::tui::app::{App, Mode, Row};
use crate::util::unicode;

use super::{spans_width, with_cursor};

/// Width of the right-hand estimate column ("999d")
const ESTIMATE_W: usize = 5;
/// Width of the right-hand assignee column
const ASSIGNEE_W: usize = 14;

/// Render the task page: summary cards over the task tree
pub fn render_task_list(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(1)])
        .split(area);

    render_summary(frame, app, chunks[0]);
    render_rows(frame, app, chunks[1]);
}

fn render_summary(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let label = Style::default().fg(app.theme.dim).bg(bg);
    let value = Style::default()
        .fg(app.theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let sep = Span::styled("  \u{2502}  ", label);

    let editor = &app.editor;
    let mut spans = vec![
        Span::styled(" Tasks ", label),
        Span::styled(editor.task_count().to_string(), value),
        sep.clone(),
        Span::styled("Subtasks ", label),
        Span::styled(editor.subtask_count().to_string(), value),
        sep.clone(),
        Span::styled("High ", label),
        Span::styled(editor.high_priority_count().to_string(), value),
        sep,
        Span::styled("Effort ", label),
        Span::styled(format!("{}d", editor.total_effort()), value),
    ];
    if app.loading_tasks {
        spans.push(Span::styled(
            "  loading...",
            Style::default().fg(app.theme.yellow).bg(bg),
        ));
    }
    let summary = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(summary, area);
}

fn render_rows(frame: &mut Frame, app: &mut App, area: Rect) {
    let bg = app.theme.background;
    let rows = app.rows();

    if rows.is_empty() {
        let msg = if app.project.is_none() {
            " No project yet. Submit a PRD on the PRD tab (1)."
        } else if app.loading_tasks {
            " Loading tasks..."
        } else {
            " No tasks. Press a to add one."
        };
        let empty = Paragraph::new(msg).style(Style::default().fg(app.theme.dim).bg(bg));
        frame.render_widget(empty, area);
        return;
    }

    // Keep the cursor on screen
    let visible_height = area.height as usize;
    app.cursor = app.cursor.min(rows.len() - 1);
    if app.cursor < app.scroll_offset {
        app.scroll_offset = app.cursor;
    } else if app.cursor >= app.scroll_offset + visible_height {
        app.scroll_offset = app.cursor.saturating_sub(visible_height.saturating_sub(1));
    }

    let end = rows.len().min(app.scroll_offset + visible_height);
    let width = area.width as usize;
    let mut lines: Vec<Line> = Vec::with_capacity(visible_height);
    for (row, index) in rows[app.scroll_offset..end].iter().zip(app.scroll_offset..end) {
        if let Some(task) = app.editor.find(row.node) {
            lines.push(render_row(app, task, row, index == app.cursor, width));
        }
    }

    let list = Paragraph::new(lines).style(Style::default().bg(bg));
    frame.render_widget(list, area);
}

/// Field of this row being edited, if any
fn editing_field(app: &App, row: &Row) -> Option<EditField> {
    if app.mode != Mode::Edit {
        return None;
    }
    match app.editor.row_edit() {
        RowEdit::Editing { node, field } if node == row.node => Some(field),
        _ => None,
    }
}

fn render_row<'a>(app: &App, task: &Task, row: &Row, is_cursor: bool, width: usize) -> Line<'a> {
    let theme = &app.theme;
    let row_bg = if is_cursor {
        theme.selection_bg
    } else {
        theme.background
    };
    let dim = Style::default().fg(theme.dim).bg(row_bg);
    let text = Style::default().fg(theme.text).bg(row_bg);
    let bright = Style::default().fg(theme.text_bright).bg(row_bg);
    let editing = editing_field(app, row);

    // Left: cursor bar, tree, type, title, description
    let mut left: Vec<Span> = Vec::new();
    if is_cursor {
        left.push(Span::styled(
            "\u{258E}",
            Style::default().fg(theme.selection_border).bg(row_bg),
        ));
    } else {
        left.push(Span::styled(" ", dim));
    }
    if row.node.depth() == 0 {
        let expand = if !row.has_children {
            " "
        } else if row.is_expanded {
            "\u{25BC}"
        } else {
            "\u{25B6}"
        };
        left.push(Span::styled(expand, dim));
    } else {
        let tree = if row.is_last { "\u{2514}" } else { "\u{251C}" };
        left.push(Span::styled(format!("  {}", tree), dim));
    }
    left.push(Span::styled(" ", dim));
    left.push(Span::styled(
        format!("[{}]", task.task_type.label()),
        Style::default().fg(theme.type_color(task.task_type)).bg(row_bg),
    ));
    left.push(Span::styled(" ", dim));

    let title_style = if is_cursor {
        bright.add_modifier(Modifier::BOLD)
    } else {
        text
    };
    match editing {
        Some(EditField::Title) => left.push(Span::styled(with_cursor(&app.input), bright)),
        _ => left.push(Span::styled(task.title.clone(), title_style)),
    }
    match editing {
        Some(EditField::Description) => {
            left.push(Span::styled("  ", dim));
            left.push(Span::styled(with_cursor(&app.input), bright));
        }
        _ if !task.description.is_empty() => {
            left.push(Span::styled("  ", dim));
            left.push(Span::styled(task.description.clone(), dim));
        }
        _ => {}
    }

    // Right: pending marker, estimate, assignee
    let estimate = match editing {
        Some(EditField::Estimate) => format!("{}d", with_cursor(&app.input)),
        _ if task.estimates.is_empty() => "-".to_string(),
        _ => format!("{}d", task.estimates),
    };
    let estimate_style = if editing == Some(EditField::Estimate) {
        bright
    } else {
        text
    };
    let assignee = match &task.assignee {
        Some(a) => format!("@{}", a.name),
        None => "unassigned".to_string(),
    };
    let assignee_style = if task.assignee.is_some() {
        Style::default().fg(theme.cyan).bg(row_bg)
    } else {
        dim
    };
    let right = vec![
        Span::styled(
            if task.is_pending() { " \u{2026}" } else { "  " },
            Style::default().fg(theme.yellow).bg(row_bg),
        ),
        Span::styled(
            format!("{:>w$}", estimate, w = ESTIMATE_W),
            estimate_style,
        ),
        Span::styled(" ", dim),
        Span::styled(unicode::fit_width(&assignee, ASSIGNEE_W), assignee_style),
    ];

    // Truncate the left part so the right columns stay aligned
    let right_w = spans_width(&right);
    let budget = width.saturating_sub(right_w);
    let mut spans = truncate_spans(left, budget);
    let used = spans_width(&spans);
    if used < budget {
        spans.push(Span::styled(" ".repeat(budget - used), dim));
    }
    spans.extend(right);
    Line::from(spans)
}

/// Cut a span list to `max` cells, ellipsizing the span that crosses it
fn truncate_spans(spans: Vec<Span<'_>>, max: usize) -> Vec<Span<'_>> {
    let mut out = Vec::with_capacity(spans.len());
    let mut used = 0;
    for span in spans {
        let w = unicode::display_width(&span.content);
        if used + w <= max {
            used += w;
            out.push(span);
            continue;
        }
        let cut = unicode::truncate_to_width(&span.content, max - used);
        if !cut.is_empty() {
            out.push(Span::styled(cut, span.style));
        }
        break;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::{TaskDraft, TaskId};
    use crate::ops::task_tree::NodeRef;
    use crate::tui::render::test_helpers::*;
    use crate::util::unicode::LineInput;

    fn render(app: &mut App) -> String {
        render_to_string(TERM_W, 12, |frame, area| {
            render_task_list(frame, app, area);
        })
    }

    #[test]
    fn summary_counts_top_level_effort() {
        let mut app = app_with_tasks();
        let output = render(&mut app);
        let first = output.lines().next().unwrap();
        assert!(first.contains("Tasks 2"));
        assert!(first.contains("Subtasks 2"));
        assert!(first.contains("High 2"));
        assert!(first.contains("Effort 8d"));
    }

    #[test]
    fn rows_show_tree_type_and_assignee() {
        let mut app = app_with_tasks();
        let output = render(&mut app);
        let lines: Vec<&str> = output.lines().collect();
        assert!(lines[2].starts_with("\u{258E}\u{25BC} [BE] Auth  Sign-in and sessions"));
        assert!(lines[2].ends_with("5d @Ana"));
        assert!(lines[3].starts_with("   \u{251C} [FE] Login form"));
        assert!(lines[4].starts_with("   \u{2514} [NA] Session store"));
        assert!(lines[4].contains("unassigned"));
        assert!(lines[5].contains("[NA] Billing"));
    }

    #[test]
    fn pending_rows_are_marked() {
        let mut app = app_with_tasks();
        app.editor
            .add_task(&mut TaskDraft::new("Search", "Full text"))
            .unwrap();
        let output = render(&mut app);
        let line = output.lines().find(|l| l.contains("Search")).unwrap();
        assert!(line.contains("\u{2026}   1d"));
    }

    #[test]
    fn edited_field_shows_cursor() {
        let mut app = app_with_tasks();
        let node = NodeRef::task(TaskId::Server(2));
        app.editor.begin_edit(node, EditField::Estimate);
        app.input = LineInput::new("3");
        app.mode = Mode::Edit;
        let output = render(&mut app);
        let line = output.lines().find(|l| l.contains("Billing")).unwrap();
        assert!(line.contains("3\u{258C}d"));
    }

    #[test]
    fn long_titles_are_truncated() {
        let mut app = app_with_tasks();
        app.editor.update_task(
            TaskId::Server(2),
            &crate::model::task::TaskPatch::title("x".repeat(200)),
        );
        let output = render(&mut app);
        let line = output.lines().find(|l| l.contains("xxx")).unwrap();
        assert!(line.contains('\u{2026}'));
        assert!(line.ends_with("unassigned"));
    }

    #[test]
    fn empty_project_hint() {
        let mut app = offline_app(None);
        let output = render(&mut app);
        assert!(output.contains("No project yet"));
    }
}
