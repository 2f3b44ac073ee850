//! Checkpoint errors.

use thiserror::Error;

/// Checkpoint error types.
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// Checkpoint not found.
    #[error("Checkpoint not found: {0}")]
    NotFound(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Could not open the durable backend.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// A statement against the durable backend failed.
    #[error("Query failed: {0}")]
    Query(String),

    /// Connection string names a backend this build cannot open.
    #[error("Unsupported checkpoint backend: {0}")]
    UnsupportedBackend(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error.
    #[error("{0}")]
    Custom(String),
}

impl From<serde_json::Error> for CheckpointError {
    fn from(err: serde_json::Error) -> Self {
        CheckpointError::Serialization(err.to_string())
    }
}
