use crossterm::event::{KeyCode, KeyEvent};

use crate::ops::task_tree::{EditField, RowEdit};
use crate::tui::app::{App, EditTarget, Mode, PrdField};

use super::apply_line_key;
use super::navigate::{begin_row_edit, field_value, move_cursor};

pub(super) fn handle_edit(app: &mut App, key: KeyEvent) {
    match app.edit_target {
        EditTarget::Row => handle_row_edit(app, key),
        EditTarget::Prd(field) => handle_prd_edit(app, field, key),
    }
}

// ---------------------------------------------------------------------------
// Row fields
// ---------------------------------------------------------------------------

/// Every keystroke is bound to the task straight away; leaving the field
/// keeps whatever was typed.
fn handle_row_edit(app: &mut App, key: KeyEvent) {
    let RowEdit::Editing { field, .. } = app.editor.row_edit() else {
        app.mode = Mode::Navigate;
        return;
    };
    match key.code {
        KeyCode::Enter | KeyCode::Esc => finish_row_edit(app),
        // Moving away counts as losing focus
        KeyCode::Up => {
            finish_row_edit(app);
            move_cursor(app, -1);
        }
        KeyCode::Down => {
            finish_row_edit(app);
            move_cursor(app, 1);
        }
        KeyCode::Tab => {
            finish_row_edit(app);
            begin_row_edit(app, next_field(field));
        }
        _ => {
            let before = app.input.clone();
            if !apply_line_key(&mut app.input, key) {
                return;
            }
            if !app.editor.set_edit_value(app.input.text()) {
                app.input = before;
                return;
            }
            if field == EditField::Estimate {
                // Show the stored (canonical) number
                let RowEdit::Editing { node, .. } = app.editor.row_edit() else {
                    return;
                };
                if let Some(task) = app.editor.find(node) {
                    let stored = field_value(task, field).to_string();
                    if stored != app.input.text() {
                        app.input.set(stored);
                    }
                }
            }
        }
    }
}

fn finish_row_edit(app: &mut App) {
    app.editor.finish_edit();
    app.input.clear();
    app.mode = Mode::Navigate;
}

fn next_field(field: EditField) -> EditField {
    match field {
        EditField::Title => EditField::Description,
        EditField::Description => EditField::Estimate,
        EditField::Estimate => EditField::Title,
    }
}

// ---------------------------------------------------------------------------
// PRD fields
// ---------------------------------------------------------------------------

fn handle_prd_edit(app: &mut App, field: PrdField, key: KeyEvent) {
    let multiline = field == PrdField::Body && app.prd.source.is_manual();
    match key.code {
        KeyCode::Esc => finish_prd_edit(app),
        KeyCode::Enter if multiline => {
            app.input.insert('\n');
            store_prd_field(app, field);
        }
        KeyCode::Enter => finish_prd_edit(app),
        _ => {
            if apply_line_key(&mut app.input, key) {
                store_prd_field(app, field);
            }
        }
    }
}

fn store_prd_field(app: &mut App, field: PrdField) {
    let text = app.input.text().to_string();
    match field {
        PrdField::Title => app.prd.title = text,
        PrdField::Body if app.prd.source.is_manual() => app.prd.manual_content = text,
        PrdField::Body => app.prd.confluence_url = text,
        PrdField::Source => {}
    }
}

fn finish_prd_edit(app: &mut App) {
    app.input.clear();
    app.mode = Mode::Navigate;
}

#[cfg(test)]
mod tests {
    use crate::model::task::{Task, TaskId};
    use crate::ops::task_tree::TaskTreeEditor;
    use crate::tui::app::{App, Mode, View};
    use crate::tui::input::handle_key;
    use crate::tui::theme::Theme;
    use chrono::NaiveDate;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn app() -> App {
        let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let mut app = App::new(Theme::default(), None, None, today);
        let mut auth = Task::new(TaskId::Server(1), "Auth");
        auth.estimates = "3".into();
        app.editor = TaskTreeEditor::new(vec![auth, Task::new(TaskId::Server(2), "Billing")]);
        app.view = View::Tasks;
        app
    }

    fn first(app: &App) -> &Task {
        &app.editor.tasks()[0]
    }

    #[test]
    fn title_is_bound_on_every_keystroke() {
        let mut app = app();
        press(&mut app, KeyCode::Char('e'));
        type_str(&mut app, " flow");
        assert_eq!(first(&app).title, "Auth flow");
        press(&mut app, KeyCode::Backspace);
        assert_eq!(first(&app).title, "Auth flo");
        // Esc does not revert
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(first(&app).title, "Auth flo");
    }

    #[test]
    fn estimate_rejects_non_numbers() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.input.text(), "3");
        assert_eq!(first(&app).estimates, "3");
        press(&mut app, KeyCode::Backspace);
        assert_eq!(first(&app).estimates, "");
        type_str(&mut app, "07");
        assert_eq!(first(&app).estimates, "7");
        assert_eq!(app.input.text(), "7");
        press(&mut app, KeyCode::Char('-'));
        assert_eq!(first(&app).estimates, "7");
    }

    #[test]
    fn moving_down_leaves_the_field() {
        let mut app = app();
        press(&mut app, KeyCode::Char('d'));
        type_str(&mut app, "JWT");
        press(&mut app, KeyCode::Down);
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(app.cursor, 1);
        assert_eq!(first(&app).description, "JWT");
    }

    #[test]
    fn tab_moves_to_next_field_on_row() {
        let mut app = app();
        press(&mut app, KeyCode::Char('e'));
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.mode, Mode::Edit);
        press(&mut app, KeyCode::Char('D'));
        assert_eq!(first(&app).description, "D");
        assert_eq!(first(&app).title, "Auth");
    }

    #[test]
    fn prd_body_accepts_newlines() {
        let mut app = app();
        app.view = View::Prd;
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('e'));
        type_str(&mut app, "# Cart");
        press(&mut app, KeyCode::Enter);
        type_str(&mut app, "- add");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.prd.manual_content, "# Cart\n- add");
        assert_eq!(app.mode, Mode::Navigate);
    }
}
