//! Error types for the API layer

use serde_json::Value as JsonValue;

/// Errors returned by [`crate::services::api::MonitorApi`]
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Request rejected with status {status}")]
    Rejected {
        status: u16,
        body: Option<JsonValue>,
    },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for API operations
pub type Result<T> = std::result::Result<T, ApiError>;
