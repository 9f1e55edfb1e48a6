//! Error types for the remote data collaborator and settings handling.
//!
//! Interaction-level anomalies (illegal transitions, relations whose endpoints
//! are missing) are deliberately not represented here: they are silent no-ops.

use thiserror::Error;

/// Errors surfaced by a [`crate::api::GraphApi`] implementation.
///
/// Cloneable so one failed fetch can be handed to every caller waiting on it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The requested node or relation does not exist remotely
    #[error("Not found: {0}")]
    NotFound(String),

    /// The server understood the request but refused it
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The request never produced a response
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),
}

/// Result type alias for remote data operations
pub type ApiResult<T> = Result<T, ApiError>;

impl From<String> for ApiError {
    fn from(s: String) -> Self {
        ApiError::Transport(s)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}

impl From<&str> for ApiError {
    fn from(s: &str) -> Self {
        ApiError::Transport(s.to_string())
    }
}

/// Errors that can occur while loading, saving or watching settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// IO error from std::io
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file is not valid JSON for [`crate::settings::Settings`]
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The file watcher could not be created
    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),
}
