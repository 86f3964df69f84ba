use std::time::Duration;

use thiserror::Error;

use crate::common::{ApiErrorDetails, OperationStatus};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API returned error (HTTP {status}): {message}")]
    Api {
        status: u16,
        message: String,
        #[source]
        details: Option<Box<ApiErrorDetails>>,
    },

    #[error("Request failed after {attempts} attempts (last status: {status:?}): {body}")]
    RequestFailed {
        attempts: u32,
        status: Option<u16>,
        body: String,
    },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("Payload of {size} bytes exceeds the limit of {limit} bytes")]
    PayloadTooLarge { size: u64, limit: u64 },

    #[error("Operation polling timed out after {0:?}")]
    PollTimeout(Duration),

    #[error("Operation canceled")]
    Canceled,

    #[error("Operation for resource {id} ended with status {status}: {}", .reason.as_deref().unwrap_or("no failure reason"))]
    OperationFailed {
        id: String,
        status: OperationStatus,
        reason: Option<String>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            ApiError::RequestFailed { status, .. } => *status,
            ApiError::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
