pub mod client;
pub mod envelope;
pub mod error;
#[cfg(test)]
pub mod fake;
pub mod url;

pub use client::{Backend, BridgeClient, created_task};
pub use envelope::{Envelope, ErrorCode, FieldErrorCode};
pub use error::ApiError;
