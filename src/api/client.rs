use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::envelope::Envelope;
use super::error::ApiError;
use super::url::{Param, join_url_params};
use crate::model::gantt::{GanttChart, GanttChartResponse};
use crate::model::member::TeamMember;
use crate::model::project::{CreatedProject, PrdSubmission};
use crate::model::task::{CreateTaskRequest, CreatedTask, RemoteTask, Task, TaskType};

/// Operations the client needs from the planning backend.
///
/// Implemented over HTTP by [`BridgeClient`]; tests substitute an in-memory
/// fake.
pub trait Backend: Send + Sync {
    /// `GET /projects/:id/tasks/`
    fn list_tasks(&self, project: u64) -> Result<Vec<RemoteTask>, ApiError>;

    /// `POST /projects/:id/tasks/create/`. The raw envelope is returned: the
    /// caller logs the result code instead of failing on it.
    fn create_task(&self, project: u64, task: &Task) -> Result<Envelope, ApiError>;

    /// `POST /projects/:id/gantt-chart/generate/`
    fn generate_gantt(&self, project: u64) -> Result<(), ApiError>;

    /// `GET /projects/:id/gantt-chart/`
    fn gantt_chart(&self, project: u64) -> Result<GanttChart, ApiError>;

    /// `GET /users/?task_type=`
    fn list_users(&self, task_type: TaskType) -> Result<Vec<TeamMember>, ApiError>;

    /// `POST /projects/create/`
    fn create_project(&self, prd: &PrdSubmission) -> Result<CreatedProject, ApiError>;
}

/// Backend id of a created task, when the envelope carries one
pub fn created_task(envelope: &Envelope) -> Option<CreatedTask> {
    if !envelope.is_success() {
        return None;
    }
    let data = envelope.data.clone()?;
    serde_json::from_value(data).ok()
}

/// Blocking HTTP client for the backend's JSON API
#[derive(Debug, Clone)]
pub struct BridgeClient {
    http: Client,
    base_url: String,
}

impl BridgeClient {
    /// `base_url` includes the API prefix, e.g. `http://localhost:8000/api`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = base_url.trim().trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiError::BaseUrl(base_url.to_string()));
        }
        let http = Client::builder().timeout(timeout).build()?;
        Ok(BridgeClient {
            http,
            base_url: base_url.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str, params: &[Param<'_>]) -> String {
        join_url_params(&format!("{}{}", self.base_url, path), &[params])
    }

    fn get(&self, path: &str, params: &[Param<'_>]) -> Result<Envelope, ApiError> {
        let url = self.url(path, params);
        debug!(%url, "GET");
        let response = self.http.get(&url).send()?;
        read_envelope(response)
    }

    fn post<B: Serialize + ?Sized>(&self, path: &str, body: Option<&B>) -> Result<Envelope, ApiError> {
        let url = self.url(path, &[]);
        debug!(%url, "POST");
        let mut request = self.http.post(&url);
        request = match body {
            Some(b) => request.json(b),
            None => request.header(reqwest::header::CONTENT_TYPE, "application/json"),
        };
        read_envelope(request.send()?)
    }

    fn get_data<T: DeserializeOwned>(&self, path: &str, params: &[Param<'_>]) -> Result<T, ApiError> {
        self.get(path, params)?.into_data()
    }
}

/// Parse the body as an envelope. Error statuses with an envelope body are
/// reported through the envelope code; anything else becomes
/// [`ApiError::Status`].
fn read_envelope(response: Response) -> Result<Envelope, ApiError> {
    let status = response.status();
    let body = response.text()?;
    match serde_json::from_str::<Envelope>(&body) {
        Ok(envelope) => {
            if !envelope.is_success() {
                warn!(code = %envelope.code, http = status.as_u16(), "backend reported failure");
            }
            Ok(envelope)
        }
        Err(_) if !status.is_success() => Err(ApiError::Status {
            status: status.as_u16(),
            body,
        }),
        Err(e) => Err(ApiError::Decode(e)),
    }
}

impl Backend for BridgeClient {
    fn list_tasks(&self, project: u64) -> Result<Vec<RemoteTask>, ApiError> {
        self.get_data(&format!("/projects/{}/tasks/", project), &[])
    }

    fn create_task(&self, project: u64, task: &Task) -> Result<Envelope, ApiError> {
        let body = CreateTaskRequest::new(task);
        self.post(&format!("/projects/{}/tasks/create/", project), Some(&body))
    }

    fn generate_gantt(&self, project: u64) -> Result<(), ApiError> {
        let envelope = self.post::<Value>(&format!("/projects/{}/gantt-chart/generate/", project), None)?;
        envelope.into_data::<Value>().map(|_| ())
    }

    fn gantt_chart(&self, project: u64) -> Result<GanttChart, ApiError> {
        let resp: GanttChartResponse =
            self.get_data(&format!("/projects/{}/gantt-chart/", project), &[])?;
        Ok(resp.gantt_chart)
    }

    fn list_users(&self, task_type: TaskType) -> Result<Vec<TeamMember>, ApiError> {
        let params = [("task_type", Some(task_type.query_value()))];
        self.get_data("/users/", &params)
    }

    fn create_project(&self, prd: &PrdSubmission) -> Result<CreatedProject, ApiError> {
        self.post("/projects/create/", Some(prd))?.into_data()
    }
}
