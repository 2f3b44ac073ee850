//! Execution state types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Mapping from state-field name to value, owned by one engine run.
///
/// Key order is insertion order.
pub type ExecutionState = Map<String, Value>;

/// State key holding the conversation message list.
pub const MESSAGES_KEY: &str = "messages";

/// Persisted view of a thread's execution state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// The state values at the last checkpoint.
    pub values: ExecutionState,
    /// Step counter of the checkpoint the snapshot was taken from.
    pub step: u32,
    /// When the checkpoint was written.
    pub created_at: DateTime<Utc>,
}

impl StateSnapshot {
    /// The message list stored under `messages`, if any.
    pub fn messages(&self) -> &[Value] {
        self.values
            .get(MESSAGES_KEY)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
