//! Error types for calgrid.

use thiserror::Error;

/// Errors that can occur in calgrid operations.
#[derive(Error, Debug)]
pub enum CalgridError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request to {url} failed with status {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Invalid {entity} payload: {message}")]
    Decode { entity: &'static str, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CalgridError {
    pub fn decode(entity: &'static str, message: impl Into<String>) -> Self {
        CalgridError::Decode {
            entity,
            message: message.into(),
        }
    }
}

/// Result type alias for calgrid operations.
pub type CalgridResult<T> = Result<T, CalgridError>;
