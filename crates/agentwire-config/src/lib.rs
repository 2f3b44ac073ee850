//! # agentwire Config
//!
//! Configuration loading, validation and workflow locator resolution.

mod error;
mod loader;
mod locators;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use locators::{normalize_locator, WorkflowLocators, LOCATOR_FILE_NAME};
pub use schema::*;
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};
