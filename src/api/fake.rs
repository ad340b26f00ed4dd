use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::json;

use super::client::Backend;
use super::envelope::{Envelope, ErrorCode};
use super::error::ApiError;
use crate::model::gantt::GanttChart;
use crate::model::member::TeamMember;
use crate::model::project::{CreatedProject, PrdSubmission};
use crate::model::task::{RemoteTask, Task, TaskId, TaskType};

/// In-memory backend for unit tests
#[derive(Default)]
pub struct FakeBackend {
    pub tasks: Mutex<Vec<RemoteTask>>,
    pub users: HashMap<TaskType, Vec<TeamMember>>,
    pub chart: GanttChart,
    pub fail_with: Option<ErrorCode>,
    pub calls: Mutex<Vec<String>>,
    pub next_id: Mutex<u64>,
}

impl FakeBackend {
    pub fn new() -> Self {
        FakeBackend {
            next_id: Mutex::new(100),
            ..Default::default()
        }
    }

    pub fn with_user(mut self, task_type: TaskType, id: u64, name: &str) -> Self {
        self.users.entry(task_type).or_default().push(TeamMember {
            id,
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            avatar: String::new(),
        });
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call);
        match self.fail_with {
            Some(code) => Err(ApiError::Backend {
                code,
                fields: Vec::new(),
            }),
            None => Ok(()),
        }
    }
}

impl Backend for FakeBackend {
    fn list_tasks(&self, project: u64) -> Result<Vec<RemoteTask>, ApiError> {
        self.record(format!("list_tasks {}", project))?;
        Ok(self.tasks.lock().unwrap().clone())
    }

    fn create_task(&self, project: u64, task: &Task) -> Result<Envelope, ApiError> {
        self.record(format!("create_task {} {}", project, task.title))?;
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        let client_ref = match task.id {
            TaskId::Local(uuid) => Some(uuid),
            TaskId::Server(_) => None,
        };
        Ok(Envelope {
            code: ErrorCode::Success,
            data: Some(json!({"id": *next, "client_ref": client_ref})),
        })
    }

    fn generate_gantt(&self, project: u64) -> Result<(), ApiError> {
        self.record(format!("generate_gantt {}", project))
    }

    fn gantt_chart(&self, project: u64) -> Result<GanttChart, ApiError> {
        self.record(format!("gantt_chart {}", project))?;
        Ok(self.chart.clone())
    }

    fn list_users(&self, task_type: TaskType) -> Result<Vec<TeamMember>, ApiError> {
        self.record(format!("list_users {}", task_type.label()))?;
        Ok(self.users.get(&task_type).cloned().unwrap_or_default())
    }

    fn create_project(&self, prd: &PrdSubmission) -> Result<CreatedProject, ApiError> {
        self.record(format!("create_project {}", prd.title))?;
        Ok(CreatedProject { id: 7 })
    }
}
