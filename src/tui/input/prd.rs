use crossterm::event::{KeyCode, KeyEvent};

use crate::io::worker::Request;
use crate::model::project::PrdSource;
use crate::tui::app::{App, EditTarget, Mode, PrdField};
use crate::util::unicode::LineInput;

pub(super) fn handle_prd(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => move_focus(app, 1),
        KeyCode::Char('k') | KeyCode::Up => move_focus(app, -1),
        KeyCode::Char('m') => app.prd.toggle_source(),
        KeyCode::Char('e') | KeyCode::Enter | KeyCode::Char(' ') => match app.prd_focus {
            PrdField::Source => app.prd.toggle_source(),
            field => begin_prd_edit(app, field),
        },
        KeyCode::Char('S') => submit(app),
        _ => {}
    }
}

fn move_focus(app: &mut App, delta: isize) {
    let fields = PrdField::ALL;
    let i = fields.iter().position(|f| *f == app.prd_focus).unwrap_or(0);
    let next = i.saturating_add_signed(delta).min(fields.len() - 1);
    app.prd_focus = fields[next];
}

fn begin_prd_edit(app: &mut App, field: PrdField) {
    let value = match field {
        PrdField::Title => &app.prd.title,
        PrdField::Body if app.prd.source.is_manual() => &app.prd.manual_content,
        PrdField::Body => &app.prd.confluence_url,
        PrdField::Source => return,
    };
    app.input = LineInput::new(value.clone());
    app.edit_target = EditTarget::Prd(field);
    app.mode = Mode::Edit;
}

/// Why the form cannot be submitted yet
fn not_ready_reason(app: &App) -> &'static str {
    if app.prd.title.trim().is_empty() {
        return "a project title is required";
    }
    match app.prd.source {
        PrdSource::Manual => "PRD text is required",
        PrdSource::Confluence => {
            "Confluence pages cannot be fetched here: paste the text or use `bridge prd submit`"
        }
    }
}

fn submit(app: &mut App) {
    if app.submitting {
        return;
    }
    let Some(prd) = app.prd.submission() else {
        let reason = not_ready_reason(app);
        app.set_error(reason);
        return;
    };
    let features = prd.estimated_features;
    if app.send(Request::CreateProject { prd }) {
        app.submitting = true;
        app.set_status(format!("submitting PRD (~{} features)...", features));
    }
}
