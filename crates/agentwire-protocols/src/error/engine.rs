//! Execution engine errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Step '{node}' failed: {reason}")]
    StepFailed { node: String, reason: String },

    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Engine run was aborted")]
    Aborted,
}

impl EngineError {
    pub fn step_failed(node: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::StepFailed {
            node: node.into(),
            reason: reason.into(),
        }
    }
}
