use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{debug, info, warn};

use crate::api::{BridgeClient, ErrorCode};
use crate::io::config_io;
use crate::io::logging::{self, LogTarget};
use crate::io::worker::{Reply, Request, RequestKind, RequestWorker};
use crate::model::member::TeamMember;
use crate::model::task::{Assignee, TaskType};
use crate::ops::gantt::{self, GanttView};
use crate::ops::prd::PrdForm;
use crate::ops::task_tree::{NodeRef, RowEdit, TaskTreeEditor, tasks_from_remote};
use crate::util::unicode::LineInput;

use super::input;
use super::render;
use super::task_form::TaskForm;
use super::theme::Theme;

const TICK: Duration = Duration::from_millis(100);

/// Which view is currently displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// PRD input
    Prd,
    /// Task tree of the current project
    Tasks,
    /// Gantt chart of the current project
    Gantt,
}

impl View {
    pub const ALL: [View; 3] = [View::Prd, View::Tasks, View::Gantt];

    pub fn label(self) -> &'static str {
        match self {
            View::Prd => "PRD",
            View::Tasks => "Tasks",
            View::Gantt => "Gantt",
        }
    }

    pub fn next(self) -> View {
        match self {
            View::Prd => View::Tasks,
            View::Tasks => View::Gantt,
            View::Gantt => View::Prd,
        }
    }
}

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    /// Typing into a row field or a PRD field
    Edit,
    /// The add task / add subtask popup is open
    Form,
}

/// Focusable fields of the PRD page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrdField {
    Title,
    Source,
    /// Manual text or Confluence URL, depending on the source
    Body,
}

impl PrdField {
    pub const ALL: [PrdField; 3] = [PrdField::Title, PrdField::Source, PrdField::Body];
}

/// What an Edit-mode keystroke goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    /// The row field held in the editor's `RowEdit`
    Row,
    Prd(PrdField),
}

/// A visible line of the task tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Row {
    pub node: NodeRef,
    pub has_children: bool,
    pub is_expanded: bool,
    pub is_last: bool,
}

/// One-line message in the status row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

/// Main application state
pub struct App {
    pub view: View,
    pub mode: Mode,
    pub should_quit: bool,
    pub theme: Theme,
    pub project: Option<u64>,
    pub prd: PrdForm,
    pub prd_focus: PrdField,
    pub editor: TaskTreeEditor,
    /// Cursor index into `rows()`
    pub cursor: usize,
    pub scroll_offset: usize,
    /// Buffer for Edit mode
    pub input: LineInput,
    pub edit_target: EditTarget,
    pub form: Option<TaskForm>,
    /// Team members by discipline, fetched once per session
    pub directory: HashMap<TaskType, Vec<TeamMember>>,
    pending_users: HashSet<TaskType>,
    pub gantt: Option<GanttView>,
    pub gantt_row_offset: usize,
    pub gantt_col_offset: usize,
    /// Set while a Gantt generation is in flight
    pub generating: bool,
    pub loading_tasks: bool,
    pub loading_gantt: bool,
    pub submitting: bool,
    pub status: Option<StatusMessage>,
    pub show_help: bool,
    pub today: NaiveDate,
    worker: Option<RequestWorker>,
}

impl App {
    pub fn new(
        theme: Theme,
        project: Option<u64>,
        worker: Option<RequestWorker>,
        today: NaiveDate,
    ) -> Self {
        let mut app = App {
            view: if project.is_some() {
                View::Tasks
            } else {
                View::Prd
            },
            mode: Mode::Navigate,
            should_quit: false,
            theme,
            project,
            prd: PrdForm::default(),
            prd_focus: PrdField::Title,
            editor: TaskTreeEditor::default(),
            cursor: 0,
            scroll_offset: 0,
            input: LineInput::default(),
            edit_target: EditTarget::Row,
            form: None,
            directory: HashMap::new(),
            pending_users: HashSet::new(),
            gantt: None,
            gantt_row_offset: 0,
            gantt_col_offset: 0,
            generating: false,
            loading_tasks: false,
            loading_gantt: false,
            submitting: false,
            status: None,
            show_help: false,
            today,
            worker,
        };
        app.refresh_tasks();
        app
    }

    // -----------------------------------------------------------------------
    // Status
    // -----------------------------------------------------------------------

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: false,
        });
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: true,
        });
    }

    // -----------------------------------------------------------------------
    // Backend requests
    // -----------------------------------------------------------------------

    /// Hand a request to the worker. Returns false when there is no backend.
    pub fn send(&mut self, request: Request) -> bool {
        match &self.worker {
            Some(worker) => {
                worker.submit(request);
                true
            }
            None => {
                warn!(request = %request.kind(), "no backend connection");
                self.set_error("no backend connection");
                false
            }
        }
    }

    /// Refetch the task listing of the current project
    pub fn refresh_tasks(&mut self) {
        if let Some(project) = self.project {
            self.loading_tasks = self.send(Request::LoadTasks { project });
        }
    }

    /// Ask for the chart unless it is already shown
    pub fn ensure_gantt(&mut self) {
        if self.gantt.is_none()
            && !self.loading_gantt
            && let Some(project) = self.project
        {
            self.loading_gantt = self.send(Request::LoadGantt { project });
        }
    }

    /// Start a chart generation. Ignored while one is in flight.
    pub fn generate_gantt(&mut self) {
        if self.generating {
            debug!("gantt generation already running");
            return;
        }
        let Some(project) = self.project else {
            self.set_error("no project yet: submit a PRD first");
            return;
        };
        if self.send(Request::GenerateGantt { project }) {
            self.generating = true;
            self.set_status("generating gantt chart...");
        }
    }

    /// Team members for a discipline, fetching them on first use
    pub fn members(&mut self, task_type: TaskType) -> Option<&[TeamMember]> {
        if !self.directory.contains_key(&task_type)
            && !self.pending_users.contains(&task_type)
            && self.send(Request::LoadUsers { task_type })
        {
            self.pending_users.insert(task_type);
        }
        self.directory.get(&task_type).map(|v| v.as_slice())
    }

    /// Drain finished requests. Call once per tick.
    pub fn poll_worker(&mut self) {
        let replies = match &self.worker {
            Some(worker) => worker.poll(),
            None => return,
        };
        for reply in replies {
            self.handle_reply(reply);
        }
    }

    #[cfg(test)]
    pub fn wait_reply(&mut self) -> bool {
        let reply = self
            .worker
            .as_ref()
            .and_then(|w| w.wait(Duration::from_secs(5)));
        match reply {
            Some(reply) => {
                self.handle_reply(reply);
                true
            }
            None => false,
        }
    }

    pub fn handle_reply(&mut self, reply: Reply) {
        match reply {
            Reply::TasksLoaded(remote) => {
                self.loading_tasks = false;
                let count = remote.len();
                self.editor.merge_remote(tasks_from_remote(remote));
                self.clamp_cursor();
                debug!(count, "tasks loaded");
            }
            Reply::TaskCreated {
                local,
                server_id,
                code,
            } => {
                match server_id {
                    Some(id) => {
                        self.editor.confirm(local, id);
                    }
                    None => warn!(%local, "task creation not confirmed"),
                }
                if code != ErrorCode::Success {
                    self.set_error(format!("task not saved: {}", code));
                }
            }
            Reply::GanttGenerated => {
                self.generating = false;
                self.gantt = None;
                self.view = View::Gantt;
                self.set_status("gantt chart generated");
                self.ensure_gantt();
            }
            Reply::GanttLoaded(chart) => {
                self.loading_gantt = false;
                self.gantt = Some(gantt::prepare(chart, self.today));
                self.gantt_row_offset = 0;
                self.gantt_col_offset = 0;
            }
            Reply::UsersLoaded { task_type, users } => {
                self.pending_users.remove(&task_type);
                self.directory.insert(task_type, users);
            }
            Reply::ProjectCreated(created) => {
                info!(project = created.id, "project created");
                self.submitting = false;
                self.project = Some(created.id);
                self.prd = PrdForm::default();
                self.prd_focus = PrdField::Title;
                self.editor = TaskTreeEditor::default();
                self.gantt = None;
                self.cursor = 0;
                self.scroll_offset = 0;
                self.view = View::Tasks;
                self.set_status(format!("project {} created", created.id));
                self.refresh_tasks();
            }
            Reply::Failed { request, message } => {
                match request {
                    RequestKind::GenerateGantt => self.generating = false,
                    RequestKind::CreateProject => self.submitting = false,
                    RequestKind::LoadTasks => self.loading_tasks = false,
                    RequestKind::LoadGantt => self.loading_gantt = false,
                    // The reply does not say which discipline failed
                    RequestKind::LoadUsers => self.pending_users.clear(),
                    RequestKind::CreateTask => {}
                }
                self.set_error(format!("{} failed: {}", request, message));
            }
        }
        // A refetch may have removed the row being edited
        if self.mode == Mode::Edit
            && self.edit_target == EditTarget::Row
            && self.editor.row_edit() == RowEdit::Display
        {
            self.mode = Mode::Navigate;
        }
    }

    // -----------------------------------------------------------------------
    // Task rows
    // -----------------------------------------------------------------------

    /// Visible rows: every task, followed by its subtasks when expanded
    pub fn rows(&self) -> Vec<Row> {
        let mut rows = Vec::new();
        for task in self.editor.tasks() {
            let is_expanded = self.editor.is_expanded(task.id);
            rows.push(Row {
                node: NodeRef::task(task.id),
                has_children: !task.children.is_empty(),
                is_expanded,
                is_last: false,
            });
            if is_expanded {
                let count = task.children.len();
                for (i, sub) in task.children.iter().enumerate() {
                    rows.push(Row {
                        node: NodeRef::subtask(task.id, sub.id),
                        has_children: false,
                        is_expanded: false,
                        is_last: i + 1 == count,
                    });
                }
            }
        }
        rows
    }

    pub fn selected(&self) -> Option<NodeRef> {
        self.rows().get(self.cursor).map(|r| r.node)
    }

    pub fn clamp_cursor(&mut self) {
        let len = self.rows().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    /// Put the cursor on `node` if it is visible
    pub fn select(&mut self, node: NodeRef) {
        if let Some(i) = self.rows().iter().position(|r| r.node == node) {
            self.cursor = i;
        }
    }
}

/// The member after `current` in `members`, wrapping through unassigned
pub fn next_assignee(current: Option<&Assignee>, members: &[TeamMember]) -> Option<Assignee> {
    let next = match current {
        None => members.first(),
        Some(a) => match members.iter().position(|m| m.id == a.id) {
            Some(i) => members.get(i + 1),
            None => members.first(),
        },
    };
    next.map(TeamMember::as_assignee)
}

/// Run the TUI application
pub fn run(api_url: Option<&str>, project: Option<u64>) -> Result<(), Box<dyn std::error::Error>> {
    let config = config_io::load_config(&config_io::config_path())?;
    logging::init(&config.log, LogTarget::tui_file(&config.log))?;

    let base_url = api_url.unwrap_or(&config.api.base_url);
    let client = BridgeClient::new(base_url, Duration::from_secs(config.api.timeout_secs))?;
    info!(base_url = client.base_url(), ?project, "starting tui");
    let worker = RequestWorker::start(Arc::new(client))?;

    let today = chrono::Local::now().date_naive();
    let mut app = App::new(Theme::from_config(&config.ui), project, Some(worker), today);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        app.poll_worker();
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(TICK)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            input::handle_key(app, key);
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeBackend;
    use crate::model::gantt::GanttChart;
    use crate::model::project::CreatedProject;
    use crate::model::task::{RemoteTask, Task, TaskDraft, TaskId};
    use pretty_assertions::assert_eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    fn offline_app() -> App {
        let mut app = App::new(Theme::default(), Some(7), None, today());
        // Drop the "no backend" notice from the initial fetch
        app.status = None;
        app
    }

    fn app_with_tasks() -> App {
        let mut app = offline_app();
        let mut a = Task::new(TaskId::Server(1), "Auth");
        a.children = vec![
            Task::new(TaskId::Server(11), "Login form"),
            Task::new(TaskId::Server(12), "Session store"),
        ];
        let b = Task::new(TaskId::Server(2), "Billing");
        app.editor = TaskTreeEditor::new(vec![a, b]);
        app
    }

    fn remote(id: u64, title: &str) -> RemoteTask {
        serde_json::from_value(serde_json::json!({ "id": id, "title": title })).unwrap()
    }

    #[test]
    fn starts_on_prd_without_project() {
        let app = App::new(Theme::default(), None, None, today());
        assert_eq!(app.view, View::Prd);
        let app = offline_app();
        assert_eq!(app.view, View::Tasks);
    }

    #[test]
    fn rows_follow_expansion() {
        let mut app = app_with_tasks();
        let rows = app.rows();
        assert_eq!(rows.len(), 4);
        assert!(rows[0].has_children && rows[0].is_expanded);
        assert_eq!(rows[1].node, NodeRef::subtask(TaskId::Server(1), TaskId::Server(11)));
        assert!(!rows[1].is_last && rows[2].is_last);

        app.editor.toggle_expansion(TaskId::Server(1));
        let rows = app.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].node, NodeRef::task(TaskId::Server(2)));
    }

    #[test]
    fn cursor_is_clamped_after_refetch() {
        let mut app = app_with_tasks();
        app.cursor = 3;
        app.handle_reply(Reply::TasksLoaded(vec![remote(1, "Auth")]));
        assert_eq!(app.editor.task_count(), 1);
        assert_eq!(app.cursor, 0);
        assert!(!app.loading_tasks);
    }

    #[test]
    fn created_task_is_confirmed() {
        let mut app = offline_app();
        let task = app
            .editor
            .add_task(&mut TaskDraft::new("Search", "Full text"))
            .unwrap();
        app.handle_reply(Reply::TaskCreated {
            local: task.id,
            server_id: Some(40),
            code: ErrorCode::Success,
        });
        let stored = app.editor.find_task(TaskId::Server(40)).unwrap();
        assert!(!stored.is_pending());
        assert_eq!(app.status, None);
    }

    #[test]
    fn rejected_creation_shows_code() {
        let mut app = offline_app();
        let task = app
            .editor
            .add_task(&mut TaskDraft::new("Search", "Full text"))
            .unwrap();
        app.handle_reply(Reply::TaskCreated {
            local: task.id,
            server_id: None,
            code: ErrorCode::BadRequest,
        });
        assert!(app.editor.tasks()[0].is_pending());
        assert!(app.status.as_ref().unwrap().is_error);
    }

    #[test]
    fn generation_is_not_reentrant() {
        let backend = Arc::new(FakeBackend::new());
        let worker = RequestWorker::start(backend.clone()).unwrap();
        let mut app = App::new(Theme::default(), Some(3), Some(worker), today());
        assert!(app.wait_reply()); // initial task listing

        app.generate_gantt();
        assert!(app.generating);
        app.generate_gantt();
        assert!(app.wait_reply()); // GanttGenerated
        assert!(!app.generating);
        assert_eq!(app.view, View::Gantt);
        assert!(app.wait_reply()); // GanttLoaded
        assert!(app.gantt.is_some());
        // The second key press never reached the backend
        assert_eq!(
            backend.calls(),
            vec!["list_tasks 3", "generate_gantt 3", "gantt_chart 3"]
        );
    }

    #[test]
    fn failed_generation_clears_flag() {
        let mut app = offline_app();
        app.generating = true;
        app.handle_reply(Reply::Failed {
            request: RequestKind::GenerateGantt,
            message: "backend rejected the request: unauthorized (2)".into(),
        });
        assert!(!app.generating);
        let status = app.status.unwrap();
        assert!(status.is_error);
        assert!(status.text.starts_with("generate gantt chart failed"));
    }

    #[test]
    fn created_project_opens_task_list() {
        let mut app = App::new(Theme::default(), None, None, today());
        app.prd.title = "Shop".into();
        app.submitting = true;
        app.handle_reply(Reply::ProjectCreated(CreatedProject { id: 12 }));
        assert_eq!(app.project, Some(12));
        assert_eq!(app.view, View::Tasks);
        assert!(!app.submitting);
        assert_eq!(app.prd, PrdForm::default());
    }

    #[test]
    fn gantt_chart_is_prepared_on_load() {
        let mut app = offline_app();
        app.loading_gantt = true;
        app.handle_reply(Reply::GanttLoaded(GanttChart::default()));
        let view = app.gantt.as_ref().unwrap();
        assert_eq!(view.start, today());
        assert!(!app.loading_gantt);
    }

    #[test]
    fn directory_is_fetched_once() {
        let backend = Arc::new(FakeBackend::new().with_user(TaskType::Be, 4, "Bo"));
        let worker = RequestWorker::start(backend.clone()).unwrap();
        let mut app = App::new(Theme::default(), None, Some(worker), today());
        assert!(app.members(TaskType::Be).is_none());
        assert!(app.members(TaskType::Be).is_none());
        assert!(app.wait_reply());
        assert_eq!(app.members(TaskType::Be).unwrap()[0].name, "Bo");
        assert_eq!(backend.calls(), vec!["list_users BE"]);
    }

    #[test]
    fn assignee_cycles_through_unassigned() {
        let members = vec![
            TeamMember {
                id: 1,
                name: "Ana".into(),
                email: String::new(),
                avatar: String::new(),
            },
            TeamMember {
                id: 2,
                name: "Bo".into(),
                email: String::new(),
                avatar: String::new(),
            },
        ];
        let first = next_assignee(None, &members);
        assert_eq!(first.as_ref().map(|a| a.id), Some(1));
        let second = next_assignee(first.as_ref(), &members);
        assert_eq!(second.as_ref().map(|a| a.id), Some(2));
        assert_eq!(next_assignee(second.as_ref(), &members), None);
        let stranger = Assignee {
            id: 99,
            name: "Zed".into(),
        };
        assert_eq!(next_assignee(Some(&stranger), &members).map(|a| a.id), Some(1));
        assert_eq!(next_assignee(None, &[]), None);
    }
}
