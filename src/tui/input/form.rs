use crossterm::event::{KeyCode, KeyEvent};
use tracing::debug;

use crate::io::worker::Request;
use crate::ops::estimates;
use crate::ops::task_tree::NodeRef;
use crate::tui::app::{App, Mode, next_assignee};
use crate::tui::task_form::{FormField, FormKind};

use super::apply_line_key;

pub(super) fn handle_form(app: &mut App, key: KeyEvent) {
    let Some(form) = app.form.as_mut() else {
        app.mode = Mode::Navigate;
        return;
    };
    match key.code {
        KeyCode::Esc => {
            app.form = None;
            app.mode = Mode::Navigate;
        }
        KeyCode::Enter => submit_form(app),
        KeyCode::Tab | KeyCode::Down => form.focus_next(),
        KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
        _ => match form.focus {
            FormField::Type => {
                if matches!(key.code, KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right) {
                    form.cycle_type();
                }
            }
            FormField::Assignee => {
                if matches!(key.code, KeyCode::Char(' ') | KeyCode::Right) {
                    cycle_form_assignee(app);
                } else if key.code == KeyCode::Backspace {
                    form.assignee = None;
                }
            }
            FormField::Estimate => {
                let Some(input) = form.focused_input() else {
                    return;
                };
                let mut next = input.clone();
                if apply_line_key(&mut next, key)
                    && estimates::normalize_input(next.text()).is_some()
                {
                    *input = next;
                }
            }
            FormField::Title | FormField::Description => {
                if let Some(input) = form.focused_input() {
                    apply_line_key(input, key);
                }
            }
        },
    }
}

fn cycle_form_assignee(app: &mut App) {
    let Some(task_type) = app.form.as_ref().map(|f| f.task_type) else {
        return;
    };
    let current = app.form.as_ref().and_then(|f| f.assignee.clone());
    let next = match app.members(task_type) {
        Some(members) => next_assignee(current.as_ref(), members),
        None => {
            if let Some(form) = app.form.as_mut() {
                form.error = Some("loading team members...".into());
            }
            return;
        }
    };
    if let Some(form) = app.form.as_mut() {
        form.assignee = next;
        form.error = None;
    }
}

fn submit_form(app: &mut App) {
    let Some(form) = app.form.as_mut() else {
        return;
    };
    if let Some(missing) = form.missing_fields() {
        form.error = Some(missing.to_string());
        return;
    }
    let kind = form.kind;
    let mut draft = form.draft();

    let created = match kind {
        FormKind::Task => app.editor.add_task(&mut draft),
        FormKind::Subtask { parent } => app.editor.add_subtask(&mut draft, parent),
    };
    let Some(task) = created else {
        if let Some(form) = app.form.as_mut() {
            form.error = Some("the parent task no longer exists".into());
        }
        return;
    };

    app.form = None;
    app.mode = Mode::Navigate;

    match kind {
        FormKind::Task => {
            app.select(NodeRef::task(task.id));
            match app.project {
                Some(project) => {
                    app.send(Request::CreateTask { project, task });
                }
                None => app.set_status("task kept locally: no project yet"),
            }
        }
        FormKind::Subtask { parent } => {
            if !app.editor.is_expanded(parent) {
                app.editor.toggle_expansion(parent);
            }
            app.select(NodeRef::subtask(parent, task.id));
            // Subtasks have no create endpoint
            debug!(id = %task.id, "subtask added locally");
            app.set_status(format!("added subtask \"{}\"", task.title));
        }
    }
}
