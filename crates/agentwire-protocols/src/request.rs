//! Inbound run requests.
//!
//! A run request is a loosely-typed JSON object. Three keys route the request
//! and never reach workflow state; every other key is forwarded verbatim.

use serde_json::{Map, Value};

use crate::error::RequestError;
use crate::types::{ExecutionState, Message, MESSAGES_KEY};

/// Keys consumed by routing. They are never copied into execution state.
pub const RESERVED_KEYS: [&str; 3] = ["agent_name", "message", "thread_id"];

/// Older clients send the free-text turn under this key.
const LEGACY_MESSAGE_KEY: &str = "user_message";

/// A chat turn addressed to a named workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRequest {
    agent_name: String,
    message: String,
    thread_id: Option<String>,
    extra: Map<String, Value>,
}

impl RunRequest {
    /// Create a request with no pass-through fields.
    pub fn new(
        agent_name: impl Into<String>,
        thread_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            agent_name: agent_name.into(),
            message: message.into(),
            thread_id: Some(thread_id.into()),
            extra: Map::new(),
        }
    }

    /// Add a pass-through field. Reserved keys are ignored.
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        let key = key.into();
        if !RESERVED_KEYS.contains(&key.as_str()) {
            self.extra.insert(key, value);
        }
        self
    }

    /// Parse a request from an inbound JSON frame.
    pub fn from_value(value: Value) -> Result<Self, RequestError> {
        let Value::Object(mut map) = value else {
            return Err(RequestError::NotAnObject);
        };
        if map.is_empty() {
            return Err(RequestError::Empty);
        }

        let agent_name = match map.remove("agent_name") {
            Some(Value::String(name)) if !name.trim().is_empty() => name,
            Some(Value::String(_)) => {
                return Err(RequestError::InvalidField {
                    field: "agent_name",
                    reason: "must not be empty".to_string(),
                })
            }
            Some(Value::Null) | None => return Err(RequestError::MissingField("agent_name")),
            Some(_) => {
                return Err(RequestError::InvalidField {
                    field: "agent_name",
                    reason: "must be a string".to_string(),
                })
            }
        };

        let message = match map.remove("message") {
            Some(value) => text_field(value),
            None => match map.remove(LEGACY_MESSAGE_KEY) {
                Some(value) => text_field(value),
                None => return Err(RequestError::MissingField("message")),
            },
        };

        let thread_id = match map.remove("thread_id") {
            Some(Value::String(id)) if !id.is_empty() => Some(id),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::String(_)) | Some(Value::Null) | None => None,
            Some(_) => {
                return Err(RequestError::InvalidField {
                    field: "thread_id",
                    reason: "must be a string or number".to_string(),
                })
            }
        };

        Ok(Self {
            agent_name,
            message,
            thread_id,
            extra: map,
        })
    }

    pub fn agent_name(&self) -> &str {
        &self.agent_name
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Thread id, when the client supplied one.
    pub fn thread_id(&self) -> Option<&str> {
        self.thread_id.as_deref()
    }

    /// Pass-through fields.
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// Build the initial execution state for this request.
    ///
    /// The user message becomes a one-element `messages` list; pass-through
    /// fields are then copied verbatim, so a client-supplied `messages` key
    /// replaces the seeded list.
    pub fn initial_state(&self) -> ExecutionState {
        let mut state = ExecutionState::new();
        state.insert(
            MESSAGES_KEY.to_string(),
            Value::Array(vec![Message::human(&self.message).to_value()]),
        );
        for (key, value) in &self.extra {
            state.insert(key.clone(), value.clone());
        }
        state
    }
}

fn text_field(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
