//! Error types for service clients.

use thiserror::Error;

/// Errors that can occur when calling an external service.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Service is not reachable at the configured host.
    #[error("Service is not reachable at {host}")]
    Unreachable { host: String },

    /// Request timeout.
    #[error("Request timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// API returned an error response.
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// A required local tool is not installed.
    #[error("Required tool not found: {tool}")]
    ToolNotFound { tool: String },

    /// Recognition produced no text; treated as a failure even when the
    /// transport call succeeded.
    #[error("Recognition returned empty text for {file_name}")]
    EmptyRecognition { file_name: String },

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error reading local content.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ServiceError {
    /// Classify a reqwest transport error against the configured host.
    pub fn from_transport(err: reqwest::Error, host: &str, timeout_seconds: u64) -> Self {
        if err.is_connect() {
            ServiceError::Unreachable {
                host: host.to_string(),
            }
        } else if err.is_timeout() {
            ServiceError::Timeout {
                seconds: timeout_seconds,
            }
        } else {
            ServiceError::Http(err)
        }
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
