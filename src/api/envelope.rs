use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::ApiError;

/// Result code carried by every backend response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum ErrorCode {
    #[default]
    Success,
    UnknownError,
    Unauthorized,
    PermissionDenied,
    BadRequest,
    BadFieldRequest,
    MultipleBadFieldRequest,
}

impl From<i64> for ErrorCode {
    fn from(v: i64) -> Self {
        match v {
            0 => ErrorCode::Success,
            2 => ErrorCode::Unauthorized,
            3 => ErrorCode::PermissionDenied,
            4 => ErrorCode::BadRequest,
            5 => ErrorCode::BadFieldRequest,
            6 => ErrorCode::MultipleBadFieldRequest,
            _ => ErrorCode::UnknownError,
        }
    }
}

impl From<ErrorCode> for i64 {
    fn from(c: ErrorCode) -> i64 {
        match c {
            ErrorCode::Success => 0,
            ErrorCode::UnknownError => 1,
            ErrorCode::Unauthorized => 2,
            ErrorCode::PermissionDenied => 3,
            ErrorCode::BadRequest => 4,
            ErrorCode::BadFieldRequest => 5,
            ErrorCode::MultipleBadFieldRequest => 6,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorCode::Success => "success",
            ErrorCode::UnknownError => "unknown error",
            ErrorCode::Unauthorized => "unauthorized",
            ErrorCode::PermissionDenied => "permission denied",
            ErrorCode::BadRequest => "bad request",
            ErrorCode::BadFieldRequest => "bad field",
            ErrorCode::MultipleBadFieldRequest => "bad fields",
        };
        write!(f, "{} ({})", name, i64::from(*self))
    }
}

/// Per-field validation failure kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorCode {
    Required,
    InvalidType,
    MinLength,
    MaxLength,
    MinItems,
    MaxItems,
    Minimum,
    Maximum,
    Enum,
    Duplicated,
    InvalidValue,
    AlreadyExist,
    DoesNotExist,
    NumItems,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub code: FieldErrorCode,
    #[serde(default)]
    pub message: Option<String>,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.message {
            Some(m) => write!(f, "{}: {}", self.field, m),
            None => write!(f, "{}: {:?}", self.field, self.code),
        }
    }
}

/// `{code, data}` wrapper around every response body
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T = Value> {
    pub code: ErrorCode,
    #[serde(default)]
    pub data: Option<T>,
}

impl Envelope<Value> {
    pub fn is_success(&self) -> bool {
        self.code == ErrorCode::Success
    }

    /// Decode `data` as `T` on success, or turn a failure code into
    /// [`ApiError::Backend`].
    pub fn into_data<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        if !self.is_success() {
            return Err(ApiError::Backend {
                code: self.code,
                fields: self.data.as_ref().map(field_errors).unwrap_or_default(),
            });
        }
        let data = self.data.unwrap_or(Value::Null);
        serde_json::from_value(data).map_err(ApiError::Decode)
    }
}

/// Field errors in a failure payload, given either as one object, a list,
/// or under an `errors` key. Anything else yields nothing.
pub fn field_errors(data: &Value) -> Vec<FieldError> {
    let list = match data {
        Value::Object(map) => match map.get("errors") {
            Some(inner) => return field_errors(inner),
            None => vec![data.clone()],
        },
        Value::Array(items) => items.clone(),
        _ => Vec::new(),
    };
    list.into_iter()
        .filter_map(|v| serde_json::from_value(v).ok())
        .collect()
}
