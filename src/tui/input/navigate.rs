use crossterm::event::{KeyCode, KeyEvent};

use crate::model::task::TaskPatch;
use crate::ops::task_tree::{EditField, NodeRef};
use crate::tui::app::{App, EditTarget, Mode, next_assignee};
use crate::tui::task_form::{FormKind, TaskForm};
use crate::util::unicode::LineInput;

// ---------------------------------------------------------------------------
// Task list
// ---------------------------------------------------------------------------

pub(super) fn handle_tasks(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => move_cursor(app, 1),
        KeyCode::Char('k') | KeyCode::Up => move_cursor(app, -1),
        KeyCode::Home => app.cursor = 0,
        KeyCode::End => {
            app.cursor = usize::MAX;
            app.clamp_cursor();
        }
        KeyCode::Char(' ') | KeyCode::Enter => toggle_selected(app),
        KeyCode::Char('e') => begin_row_edit(app, EditField::Title),
        KeyCode::Char('d') => begin_row_edit(app, EditField::Description),
        KeyCode::Char('n') => begin_row_edit(app, EditField::Estimate),
        KeyCode::Char('x') => delete_selected(app),
        KeyCode::Char('a') => open_form(app, FormKind::Task),
        KeyCode::Char('s') => {
            if let Some(node) = app.selected() {
                open_form(app, FormKind::Subtask { parent: node.task });
            }
        }
        KeyCode::Char('T') => cycle_type(app),
        KeyCode::Char('u') => cycle_assignee(app),
        KeyCode::Char('U') => {
            if let Some(node) = app.selected() {
                app.editor.update_node(node, &TaskPatch::assignee(None));
            }
        }
        KeyCode::Char('r') => app.refresh_tasks(),
        KeyCode::Char('g') => app.generate_gantt(),
        _ => {}
    }
}

pub(super) fn move_cursor(app: &mut App, delta: isize) {
    let len = app.rows().len();
    if len == 0 {
        app.cursor = 0;
        return;
    }
    app.cursor = app.cursor.saturating_add_signed(delta).min(len - 1);
}

fn toggle_selected(app: &mut App) {
    if let Some(node) = app.selected() {
        // On a subtask row this folds the parent
        app.editor.toggle_expansion(node.task);
        app.select(NodeRef::task(node.task));
    }
}

/// Start editing a field of the selected row
pub(super) fn begin_row_edit(app: &mut App, field: EditField) {
    let Some(node) = app.selected() else {
        return;
    };
    if !app.editor.begin_edit(node, field) {
        return;
    }
    let value = app
        .editor
        .find(node)
        .map(|t| field_value(t, field).to_string())
        .unwrap_or_default();
    app.input = LineInput::new(value);
    app.edit_target = EditTarget::Row;
    app.mode = Mode::Edit;
}

pub(super) fn field_value(task: &crate::model::task::Task, field: EditField) -> &str {
    match field {
        EditField::Title => &task.title,
        EditField::Description => &task.description,
        EditField::Estimate => &task.estimates,
    }
}

fn delete_selected(app: &mut App) {
    let Some(node) = app.selected() else {
        return;
    };
    let title = app.editor.find(node).map(|t| t.title.clone());
    app.editor.delete_node(node);
    app.clamp_cursor();
    if let Some(title) = title {
        app.set_status(format!("deleted \"{}\"", title));
    }
}

fn open_form(app: &mut App, kind: FormKind) {
    app.form = Some(TaskForm::new(kind));
    app.mode = Mode::Form;
}

fn cycle_type(app: &mut App) {
    let Some(node) = app.selected() else {
        return;
    };
    let Some(current) = app.editor.find(node).map(|t| t.task_type) else {
        return;
    };
    // The assignee is kept even if they belong to another discipline
    app.editor
        .update_node(node, &TaskPatch::task_type(current.cycle()));
}

fn cycle_assignee(app: &mut App) {
    let Some(node) = app.selected() else {
        return;
    };
    let Some((task_type, current)) = app
        .editor
        .find(node)
        .map(|t| (t.task_type, t.assignee.clone()))
    else {
        return;
    };
    let next = match app.members(task_type) {
        Some(members) => next_assignee(current.as_ref(), members),
        None => {
            app.set_status("loading team members...");
            return;
        }
    };
    app.editor.update_node(node, &TaskPatch::assignee(next));
}

// ---------------------------------------------------------------------------
// Gantt chart
// ---------------------------------------------------------------------------

pub(super) fn handle_gantt(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            let rows = app.gantt.as_ref().map_or(0, |g| g.tasks.len());
            if app.gantt_row_offset + 1 < rows {
                app.gantt_row_offset += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.gantt_row_offset = app.gantt_row_offset.saturating_sub(1);
        }
        KeyCode::Char('l') | KeyCode::Right => scroll_days(app, 1),
        KeyCode::Char('h') | KeyCode::Left => scroll_days(app, -1),
        KeyCode::Char('L') => scroll_days(app, 7),
        KeyCode::Char('H') => scroll_days(app, -7),
        KeyCode::Char('r') => {
            app.gantt = None;
            app.ensure_gantt();
        }
        KeyCode::Char('g') => app.generate_gantt(),
        _ => {}
    }
}

fn scroll_days(app: &mut App, delta: isize) {
    let days = app
        .gantt
        .as_ref()
        .map_or(0, |g| (g.end - g.start).num_days().max(0) as usize);
    app.gantt_col_offset = app.gantt_col_offset.saturating_add_signed(delta).min(days);
}
