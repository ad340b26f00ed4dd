use chrono::NaiveDate;
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;

use crate::model::task::{Assignee, Task, TaskId, TaskType};
use crate::ops::task_tree::TaskTreeEditor;
use crate::tui::app::{App, View};
use crate::tui::theme::Theme;

pub const TERM_W: u16 = 80;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
}

/// An App with no backend connection and no status message
pub fn offline_app(project: Option<u64>) -> App {
    let mut app = App::new(Theme::default(), project, None, today());
    app.status = None;
    app
}

/// Two tasks, the first with two subtasks; the first task is assigned.
pub fn app_with_tasks() -> App {
    let mut app = offline_app(Some(7));
    let mut auth = Task::new(TaskId::Server(1), "Auth");
    auth.description = "Sign-in and sessions".into();
    auth.estimates = "5".into();
    auth.task_type = TaskType::Be;
    auth.assignee = Some(Assignee {
        id: 3,
        name: "Ana".into(),
    });
    let mut login = Task::new(TaskId::Server(11), "Login form");
    login.estimates = "2".into();
    login.task_type = TaskType::Fe;
    let session = Task::new(TaskId::Server(12), "Session store");
    auth.children = vec![login, session];

    let mut billing = Task::new(TaskId::Server(2), "Billing");
    billing.estimates = "3".into();

    app.editor = TaskTreeEditor::new(vec![auth, billing]);
    app.view = View::Tasks;
    app
}
