//! Error types for skope-session.
//!
//! Only lookup failures and programmer errors are reported through this enum.
//! Failures of a time-series request are ordinary session state and live in
//! [`crate::status::RequestStatus`] instead.

use thiserror::Error;

/// The main error type for session operations.
#[derive(Error, Debug)]
pub enum SessionError {
    /// No catalog record has the requested dataset id
    #[error("Dataset not found: {id}")]
    MetadataNotFound { id: String },

    /// No variable of the loaded dataset has the requested id
    #[error("Variable not found: {id}")]
    VariableNotFound { id: String },

    /// An operation was called while the session was not ready for it
    #[error("Precondition violated: {message}")]
    Precondition { message: String },

    /// A catalog record is malformed
    #[error("Invalid metadata for dataset {id}: {message}")]
    InvalidMetadata { id: String, message: String },

    /// A study-area geometry is malformed
    #[error("Invalid geometry: {message}")]
    InvalidGeometry { message: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SessionError {
    pub(crate) fn precondition(message: impl Into<String>) -> Self {
        SessionError::Precondition {
            message: message.into(),
        }
    }
}

/// Convenience type alias for Results with SessionError
pub type Result<T> = std::result::Result<T, SessionError>;
