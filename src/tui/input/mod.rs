mod edit;
mod form;
mod navigate;
mod prd;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::{App, Mode, View};
use crate::util::unicode::LineInput;

use edit::handle_edit;
use form::handle_form;
use navigate::{handle_gantt, handle_tasks};
use prd::handle_prd;

/// Handle a key event in the current mode
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }

    // Help overlay intercepts everything until closed
    if app.show_help {
        if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q')) {
            app.show_help = false;
        }
        return;
    }

    match app.mode {
        Mode::Navigate => {
            if !handle_global(app, key) {
                match app.view {
                    View::Prd => handle_prd(app, key),
                    View::Tasks => handle_tasks(app, key),
                    View::Gantt => handle_gantt(app, key),
                }
            }
        }
        Mode::Edit => handle_edit(app, key),
        Mode::Form => handle_form(app, key),
    }
}

/// Keys shared by every view in Navigate mode. Returns true if consumed.
fn handle_global(app: &mut App, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if key.code == KeyCode::Char('c') {
            app.should_quit = true;
            return true;
        }
        return false;
    }
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Char('1') => switch_view(app, View::Prd),
        KeyCode::Char('2') => switch_view(app, View::Tasks),
        KeyCode::Char('3') => switch_view(app, View::Gantt),
        KeyCode::Tab => switch_view(app, app.view.next()),
        _ => return false,
    }
    true
}

fn switch_view(app: &mut App, view: View) {
    app.view = view;
    app.status = None;
    if view == View::Gantt {
        app.ensure_gantt();
    }
}

/// Apply a line-editing key to `input`. Returns false for keys that are not
/// text edits (Enter, Esc, arrows up/down, ...).
pub(super) fn apply_line_key(input: &mut LineInput, key: KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('w') if ctrl => input.delete_word_back(),
        KeyCode::Char('a') if ctrl => input.home(),
        KeyCode::Char('e') if ctrl => input.end(),
        KeyCode::Char('u') if ctrl => input.clear(),
        KeyCode::Char(_) if ctrl => return false,
        KeyCode::Char(c) => input.insert(c),
        KeyCode::Backspace => {
            input.backspace();
        }
        KeyCode::Delete => {
            input.delete();
        }
        KeyCode::Left => input.move_left(),
        KeyCode::Right => input.move_right(),
        KeyCode::Home => input.home(),
        KeyCode::End => input.end(),
        _ => return false,
    }
    true
}
