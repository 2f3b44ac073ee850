//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

fn default_true() -> bool {
    true
}

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub workflows: WorkflowsConfig,

    #[serde(default)]
    pub checkpoint: CheckpointConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Workflow routing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowsConfig {
    /// Agent used for side reads such as chat history.
    #[serde(default = "default_agent")]
    pub default_agent: String,

    /// Explicit `langgraph.json`-style locator file.
    ///
    /// When unset, the usual locations are searched.
    #[serde(default)]
    pub locator_file: Option<PathBuf>,

    /// Agent name to `<module>:<constructor>` locator.
    /// Entries here override the locator file.
    #[serde(default)]
    pub graphs: HashMap<String, String>,
}

impl Default for WorkflowsConfig {
    fn default() -> Self {
        Self {
            default_agent: default_agent(),
            locator_file: None,
            graphs: HashMap::new(),
        }
    }
}

fn default_agent() -> String {
    "echo".to_string()
}

/// Checkpoint persistence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointConfig {
    /// Name of the environment variable holding the durable connection string.
    #[serde(default = "default_db_uri_env")]
    pub db_uri_env: String,

    /// Checkpoints kept per thread. 0 keeps everything.
    #[serde(default = "default_max_checkpoints")]
    pub max_checkpoints_per_thread: usize,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            db_uri_env: default_db_uri_env(),
            max_checkpoints_per_thread: default_max_checkpoints(),
        }
    }
}

fn default_db_uri_env() -> String {
    "DB_URI".to_string()
}

fn default_max_checkpoints() -> usize {
    20
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Emit console logs as JSON lines.
    #[serde(default)]
    pub json: bool,

    /// Write rolling log files.
    #[serde(default = "default_true")]
    pub file_logs: bool,

    /// Directory for log files. Defaults to `~/.agentwire/logs`.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            json: false,
            file_logs: default_true(),
            log_dir: None,
        }
    }
}
