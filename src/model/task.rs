use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Deepest nesting level a node may sit at (0 = task, 1 = subtask)
pub const MAX_DEPTH: usize = 1;

/// Identifier of a node in the task tree.
///
/// Backend records carry numeric ids. Nodes created locally get a random
/// placeholder until the backend confirms them; the placeholder doubles as
/// the correlation id sent with the create request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskId {
    Server(u64),
    Local(Uuid),
}

impl TaskId {
    /// Fresh placeholder id, never equal to any other id in the process
    pub fn new_local() -> Self {
        TaskId::Local(Uuid::new_v4())
    }

    pub fn is_local(&self) -> bool {
        matches!(self, TaskId::Local(_))
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskId::Server(id) => write!(f, "{}", id),
            // Short form is enough to tell pending rows apart on screen
            TaskId::Local(uuid) => write!(f, "~{}", &uuid.simple().to_string()[..8]),
        }
    }
}

/// Task priority. Wire values are the backend's integers (1 = high).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Priority {
    #[default]
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn label(self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl From<Priority> for u8 {
    fn from(p: Priority) -> u8 {
        match p {
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }
}

impl TryFrom<u8> for Priority {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(Priority::High),
            2 => Ok(Priority::Medium),
            3 => Ok(Priority::Low),
            other => Err(format!("invalid priority: {}", other)),
        }
    }
}

/// Discipline of a task. Decides which team members can be assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TaskType {
    #[default]
    General,
    Fe,
    Be,
}

impl TaskType {
    pub const ALL: [TaskType; 3] = [TaskType::General, TaskType::Fe, TaskType::Be];

    /// Short label shown in lists ("NA" for general work, as in the web UI)
    pub fn label(self) -> &'static str {
        match self {
            TaskType::General => "NA",
            TaskType::Fe => "FE",
            TaskType::Be => "BE",
        }
    }

    /// Next discipline in display order, wrapping around
    pub fn cycle(self) -> TaskType {
        match self {
            TaskType::General => TaskType::Fe,
            TaskType::Fe => TaskType::Be,
            TaskType::Be => TaskType::General,
        }
    }

    /// Value for the `task_type` query parameter of the user directory.
    /// General work is not filtered, so it sends an empty value.
    pub fn query_value(self) -> String {
        match self {
            TaskType::General => String::new(),
            other => u8::from(other).to_string(),
        }
    }

    /// Parse a CLI spelling: `general`/`na`, `fe`, `be`, or the wire number
    pub fn parse(s: &str) -> Option<TaskType> {
        match s.to_ascii_lowercase().as_str() {
            "general" | "na" | "0" => Some(TaskType::General),
            "fe" | "frontend" | "1" => Some(TaskType::Fe),
            "be" | "backend" | "2" => Some(TaskType::Be),
            _ => None,
        }
    }
}

impl From<TaskType> for u8 {
    fn from(t: TaskType) -> u8 {
        match t {
            TaskType::General => 0,
            TaskType::Fe => 1,
            TaskType::Be => 2,
        }
    }
}

impl TryFrom<u8> for TaskType {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(TaskType::General),
            1 => Ok(TaskType::Fe),
            2 => Ok(TaskType::Be),
            other => Err(format!("invalid task type: {}", other)),
        }
    }
}

/// Team member assigned to a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignee {
    pub id: u64,
    pub name: String,
}

/// Whether the backend has acknowledged a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    /// Created locally; the id is a placeholder
    Pending,
    #[default]
    Confirmed,
}

/// A node in the task tree. Top-level nodes are tasks, their children are
/// subtasks; subtasks never have children of their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Effort in days, kept as text so an in-progress edit can be empty
    #[serde(default)]
    pub estimates: String,
    #[serde(default)]
    pub assignee: Option<Assignee>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub task_type: TaskType,
    #[serde(default)]
    pub children: Vec<Task>,
    #[serde(skip)]
    pub sync: SyncState,
}

impl Task {
    /// Create a confirmed node with empty optional fields
    pub fn new(id: TaskId, title: impl Into<String>) -> Self {
        Task {
            id,
            title: title.into(),
            description: String::new(),
            estimates: String::new(),
            assignee: None,
            priority: Priority::default(),
            task_type: TaskType::default(),
            children: Vec::new(),
            sync: SyncState::Confirmed,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.sync == SyncState::Pending
    }

    /// Apply every field present in `patch`
    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(estimates) = &patch.estimates {
            self.estimates = estimates.clone();
        }
        if let Some(assignee) = &patch.assignee {
            self.assignee = assignee.clone();
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(task_type) = patch.task_type {
            self.task_type = task_type;
        }
    }
}

/// Partial update for a node. `None` leaves the field untouched;
/// `assignee: Some(None)` clears the assignee.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub estimates: Option<String>,
    pub assignee: Option<Option<Assignee>>,
    pub priority: Option<Priority>,
    pub task_type: Option<TaskType>,
}

impl TaskPatch {
    pub fn title(title: impl Into<String>) -> Self {
        TaskPatch {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn description(description: impl Into<String>) -> Self {
        TaskPatch {
            description: Some(description.into()),
            ..Default::default()
        }
    }

    pub fn estimates(estimates: impl Into<String>) -> Self {
        TaskPatch {
            estimates: Some(estimates.into()),
            ..Default::default()
        }
    }

    pub fn assignee(assignee: Option<Assignee>) -> Self {
        TaskPatch {
            assignee: Some(assignee),
            ..Default::default()
        }
    }

    pub fn task_type(task_type: TaskType) -> Self {
        TaskPatch {
            task_type: Some(task_type),
            ..Default::default()
        }
    }
}

/// Contents of the add-task / add-subtask form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub estimates: Option<String>,
    pub assignee: Option<Assignee>,
    pub priority: Option<Priority>,
    pub task_type: Option<TaskType>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        TaskDraft {
            title: title.into(),
            description: description.into(),
            ..Default::default()
        }
    }
}

/// A task as returned by `GET /projects/:id/tasks/`. Estimates arrive as
/// numbers (or null) and are converted to the text model on load.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteTask {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub estimates: Option<serde_json::Value>,
    #[serde(default)]
    pub assignee: Option<Assignee>,
    #[serde(default, deserialize_with = "lenient_code")]
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "lenient_code")]
    pub task_type: Option<TaskType>,
    #[serde(default)]
    pub children: Vec<RemoteTask>,
}

/// Integer enum code that falls back to `None` when the value is out of
/// range, so one odd record doesn't fail the whole listing.
fn lenient_code<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: TryFrom<u8>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(serde_json::Value::as_u64)
        .and_then(|n| u8::try_from(n).ok())
        .and_then(|n| T::try_from(n).ok()))
}

/// Body of `POST /projects/:id/tasks/create/`: the task itself plus the
/// flattened assignee id and the placeholder id as correlation reference.
#[derive(Debug, Clone, Serialize)]
pub struct CreateTaskRequest<'a> {
    #[serde(flatten)]
    pub task: &'a Task,
    pub assignee_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ref: Option<Uuid>,
}

impl<'a> CreateTaskRequest<'a> {
    pub fn new(task: &'a Task) -> Self {
        CreateTaskRequest {
            task,
            assignee_id: task.assignee.as_ref().map(|a| a.id),
            client_ref: match task.id {
                TaskId::Local(uuid) => Some(uuid),
                TaskId::Server(_) => None,
            },
        }
    }
}

/// `data` of a create-task response. `client_ref` echoes the correlation
/// id when the backend supports it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedTask {
    pub id: u64,
    #[serde(default)]
    pub client_ref: Option<Uuid>,
}
