//! Runtime errors.

use thiserror::Error;

use agentwire_config::ConfigError;
use agentwire_protocols::{EngineError, RequestError};

/// Errors from workflow registration and resolution.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Unknown workflow: {0}")]
    UnknownWorkflow(String),

    #[error("Failed to load workflow constructor '{locator}': {reason}")]
    ConstructorLoad { locator: String, reason: String },

    #[error("Workflow locator already registered: {0}")]
    DuplicateLocator(String),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors returned by the session orchestrator.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Unknown workflow: {0}")]
    UnknownWorkflow(String),

    #[error("Failed to load workflow constructor '{locator}': {reason}")]
    ConstructorLoad { locator: String, reason: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] RequestError),

    #[error("Cancelled")]
    Cancelled,

    #[error("{0}")]
    Engine(#[from] EngineError),
}

impl SessionError {
    /// Whether the run never started.
    pub fn prevented_start(&self) -> bool {
        matches!(
            self,
            SessionError::UnknownWorkflow(_)
                | SessionError::ConstructorLoad { .. }
                | SessionError::InvalidRequest(_)
        )
    }
}

impl From<RegistryError> for SessionError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::UnknownWorkflow(name) => SessionError::UnknownWorkflow(name),
            RegistryError::ConstructorLoad { locator, reason } => {
                SessionError::ConstructorLoad { locator, reason }
            }
            RegistryError::DuplicateLocator(locator) => SessionError::ConstructorLoad {
                reason: "duplicate locator".to_string(),
                locator,
            },
            RegistryError::Config(e) => SessionError::ConstructorLoad {
                locator: String::new(),
                reason: e.to_string(),
            },
        }
    }
}
