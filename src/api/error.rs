use thiserror::Error;

use super::envelope::{ErrorCode, FieldError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("backend rejected the request: {code}{}", describe_fields(.fields))]
    Backend {
        code: ErrorCode,
        fields: Vec<FieldError>,
    },

    #[error("unexpected response shape: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("invalid base url: {0}")]
    BaseUrl(String),
}

fn describe_fields(fields: &[FieldError]) -> String {
    if fields.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = fields.iter().map(|f| f.to_string()).collect();
    format!(" [{}]", parts.join(", "))
}

impl ApiError {
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            ApiError::Backend { code, .. } => Some(*code),
            _ => None,
        }
    }
}
