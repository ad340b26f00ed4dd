use std::sync::Arc;
use std::sync::mpsc;
use std::thread;

use tracing::{debug, error, info, warn};

use crate::api::{Backend, ErrorCode, created_task};
use crate::model::gantt::GanttChart;
use crate::model::member::TeamMember;
use crate::model::project::{CreatedProject, PrdSubmission};
use crate::model::task::{CreatedTask, RemoteTask, Task, TaskId, TaskType};

/// Work handed to the background thread
#[derive(Debug, Clone)]
pub enum Request {
    LoadTasks { project: u64 },
    CreateTask { project: u64, task: Task },
    GenerateGantt { project: u64 },
    LoadGantt { project: u64 },
    LoadUsers { task_type: TaskType },
    CreateProject { prd: PrdSubmission },
}

impl Request {
    pub fn kind(&self) -> RequestKind {
        match self {
            Request::LoadTasks { .. } => RequestKind::LoadTasks,
            Request::CreateTask { .. } => RequestKind::CreateTask,
            Request::GenerateGantt { .. } => RequestKind::GenerateGantt,
            Request::LoadGantt { .. } => RequestKind::LoadGantt,
            Request::LoadUsers { .. } => RequestKind::LoadUsers,
            Request::CreateProject { .. } => RequestKind::CreateProject,
        }
    }
}

/// Which request a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    LoadTasks,
    CreateTask,
    GenerateGantt,
    LoadGantt,
    LoadUsers,
    CreateProject,
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RequestKind::LoadTasks => "load tasks",
            RequestKind::CreateTask => "create task",
            RequestKind::GenerateGantt => "generate gantt chart",
            RequestKind::LoadGantt => "load gantt chart",
            RequestKind::LoadUsers => "load users",
            RequestKind::CreateProject => "create project",
        };
        f.write_str(name)
    }
}

/// Results sent back to the TUI event loop
#[derive(Debug)]
pub enum Reply {
    TasksLoaded(Vec<RemoteTask>),
    /// `server_id` is set when the backend confirmed the node and echoed
    /// a matching correlation id (or none at all)
    TaskCreated {
        local: TaskId,
        server_id: Option<u64>,
        code: ErrorCode,
    },
    GanttGenerated,
    GanttLoaded(GanttChart),
    UsersLoaded {
        task_type: TaskType,
        users: Vec<TeamMember>,
    },
    ProjectCreated(CreatedProject),
    Failed {
        request: RequestKind,
        message: String,
    },
}

/// A background thread running backend calls one at a time.
/// Submitting never blocks; `poll()` should be called each tick.
pub struct RequestWorker {
    tx: mpsc::Sender<Request>,
    rx: mpsc::Receiver<Reply>,
}

impl RequestWorker {
    pub fn start(backend: Arc<dyn Backend>) -> std::io::Result<Self> {
        let (req_tx, req_rx) = mpsc::channel::<Request>();
        let (reply_tx, reply_rx) = mpsc::channel();

        thread::Builder::new()
            .name("bridge-requests".into())
            .spawn(move || {
                for request in req_rx {
                    let reply = execute(backend.as_ref(), request);
                    if reply_tx.send(reply).is_err() {
                        break;
                    }
                }
                debug!("request worker stopped");
            })?;

        Ok(RequestWorker {
            tx: req_tx,
            rx: reply_rx,
        })
    }

    /// Queue a request. Fire and forget: failures come back as
    /// [`Reply::Failed`].
    pub fn submit(&self, request: Request) {
        debug!(request = %request.kind(), "queued");
        if self.tx.send(request).is_err() {
            error!("request worker is gone");
        }
    }

    /// Non-blocking poll for finished requests.
    /// Returns all queued replies (may be empty).
    pub fn poll(&self) -> Vec<Reply> {
        let mut replies = Vec::new();
        while let Ok(reply) = self.rx.try_recv() {
            replies.push(reply);
        }
        replies
    }

    #[cfg(test)]
    pub fn wait(&self, timeout: std::time::Duration) -> Option<Reply> {
        self.rx.recv_timeout(timeout).ok()
    }
}

fn execute(backend: &dyn Backend, request: Request) -> Reply {
    let kind = request.kind();
    let result = match request {
        Request::LoadTasks { project } => backend.list_tasks(project).map(Reply::TasksLoaded),
        Request::CreateTask { project, task } => {
            backend.create_task(project, &task).map(|envelope| {
                info!(code = %envelope.code, title = %task.title, "task submitted");
                Reply::TaskCreated {
                    local: task.id,
                    server_id: confirmed_id(task.id, created_task(&envelope)),
                    code: envelope.code,
                }
            })
        }
        Request::GenerateGantt { project } => {
            backend.generate_gantt(project).map(|_| Reply::GanttGenerated)
        }
        Request::LoadGantt { project } => backend.gantt_chart(project).map(Reply::GanttLoaded),
        Request::LoadUsers { task_type } => backend
            .list_users(task_type)
            .map(|users| Reply::UsersLoaded { task_type, users }),
        Request::CreateProject { prd } => backend.create_project(&prd).map(Reply::ProjectCreated),
    };
    result.unwrap_or_else(|e| {
        error!(request = %kind, error = %e, "backend request failed");
        Reply::Failed {
            request: kind,
            message: e.to_string(),
        }
    })
}

/// Match a create response to the placeholder it was sent for
fn confirmed_id(local: TaskId, created: Option<CreatedTask>) -> Option<u64> {
    let created = created?;
    match (local, created.client_ref) {
        (TaskId::Local(sent), Some(echoed)) if sent != echoed => {
            warn!(%sent, %echoed, "create response for a different task");
            None
        }
        _ => Some(created.id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeBackend;
    use std::time::Duration;
    use uuid::Uuid;

    const WAIT: Duration = Duration::from_secs(5);

    #[test]
    fn create_task_reports_server_id() {
        let worker = RequestWorker::start(Arc::new(FakeBackend::new())).unwrap();
        let task = Task::new(TaskId::new_local(), "Login");
        worker.submit(Request::CreateTask {
            project: 3,
            task: task.clone(),
        });
        match worker.wait(WAIT) {
            Some(Reply::TaskCreated {
                local,
                server_id,
                code,
            }) => {
                assert_eq!(local, task.id);
                assert_eq!(server_id, Some(101));
                assert_eq!(code, ErrorCode::Success);
            }
            other => panic!("unexpected reply {:?}", other),
        }
    }

    #[test]
    fn failures_come_back_as_replies() {
        let backend = FakeBackend {
            fail_with: Some(ErrorCode::Unauthorized),
            ..FakeBackend::new()
        };
        let worker = RequestWorker::start(Arc::new(backend)).unwrap();
        worker.submit(Request::GenerateGantt { project: 1 });
        match worker.wait(WAIT) {
            Some(Reply::Failed { request, message }) => {
                assert_eq!(request, RequestKind::GenerateGantt);
                assert_eq!(request.to_string(), "generate gantt chart");
                assert!(message.contains("unauthorized"));
            }
            other => panic!("unexpected reply {:?}", other),
        }
    }

    #[test]
    fn replies_arrive_in_submission_order() {
        let backend = FakeBackend::new().with_user(TaskType::Fe, 1, "Ana");
        let worker = RequestWorker::start(Arc::new(backend)).unwrap();
        worker.submit(Request::LoadUsers {
            task_type: TaskType::Fe,
        });
        worker.submit(Request::LoadGantt { project: 2 });
        assert!(matches!(
            worker.wait(WAIT),
            Some(Reply::UsersLoaded { task_type: TaskType::Fe, ref users }) if users.len() == 1
        ));
        assert!(matches!(worker.wait(WAIT), Some(Reply::GanttLoaded(_))));
        assert!(worker.poll().is_empty());
    }

    #[test]
    fn mismatched_correlation_is_not_confirmed() {
        let local = TaskId::new_local();
        let other = CreatedTask {
            id: 5,
            client_ref: Some(Uuid::new_v4()),
        };
        assert_eq!(confirmed_id(local, Some(other)), None);
        let bare = CreatedTask {
            id: 6,
            client_ref: None,
        };
        assert_eq!(confirmed_id(local, Some(bare)), Some(6));
        assert_eq!(confirmed_id(local, None), None);
    }
}
