//! Configuration validation.

use crate::error::ConfigError;
use crate::locators::{normalize_locator, WorkflowLocators};
use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Collapse into the first error, if any.
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(err) => Err(ConfigError::InvalidValue {
                field: err.path,
                message: err.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_server(config, &mut result);
        Self::validate_workflows(config, &mut result);
        Self::validate_checkpoint(config, &mut result);

        Ok(result)
    }

    /// Validate a merged locator mapping against the configuration.
    pub fn validate_locators(
        config: &Config,
        locators: &WorkflowLocators,
    ) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        for (name, locator) in locators.iter() {
            if normalize_locator(locator).is_none() {
                result.add_error(ValidationError::new(
                    format!("graphs.{}", name),
                    format!("Malformed locator '{}', expected '<module>:<constructor>'", locator),
                ));
            }
        }

        let default_agent = &config.workflows.default_agent;
        if !default_agent.is_empty() && locators.get(default_agent).is_none() {
            result.add_warning(ValidationWarning::new(
                "workflows.default_agent",
                format!(
                    "Default agent '{}' is not mapped, chat history reads will return nothing",
                    default_agent
                ),
            ));
        }

        Ok(result)
    }

    fn validate_server(config: &Config, result: &mut ValidationResult) {
        if config.server.port == 0 {
            result.add_error(ValidationError::new("server.port", "Port cannot be 0"));
        }

        if config.server.host.is_empty() {
            result.add_error(ValidationError::new("server.host", "Host cannot be empty"));
        }
    }

    fn validate_workflows(config: &Config, result: &mut ValidationResult) {
        if config.workflows.default_agent.is_empty() {
            result.add_error(ValidationError::new(
                "workflows.default_agent",
                "Default agent cannot be empty",
            ));
        }

        for (name, locator) in &config.workflows.graphs {
            if normalize_locator(locator).is_none() {
                result.add_error(ValidationError::new(
                    format!("workflows.graphs.{}", name),
                    format!("Malformed locator '{}', expected '<module>:<constructor>'", locator),
                ));
            }
        }
    }

    fn validate_checkpoint(config: &Config, result: &mut ValidationResult) {
        if config.checkpoint.db_uri_env.trim().is_empty() {
            result.add_error(ValidationError::new(
                "checkpoint.db_uri_env",
                "Connection string variable name cannot be empty",
            ));
        }

        if config.checkpoint.max_checkpoints_per_thread == 0 {
            result.add_warning(ValidationWarning::new(
                "checkpoint.max_checkpoints_per_thread",
                "Checkpoint pruning is disabled, threads will grow without bound",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
