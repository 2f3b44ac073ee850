//! Outbound wire messages.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Text sent when a run is cancelled by the client.
pub const CANCELLED_CONTENT: &str = "Cancelled!";

/// A JSON message written to the client.
///
/// Stream messages carry all four fields; error and control messages carry
/// only `type` and `content`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundMessage {
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_message: Option<Value>,
}

impl OutboundMessage {
    /// A stream message.
    pub fn stream(
        kind: impl Into<String>,
        content: impl Into<String>,
        tool_calls: Vec<Value>,
        base_message: Value,
    ) -> Self {
        Self {
            kind: kind.into(),
            content: content.into(),
            tool_calls: Some(tool_calls),
            base_message: Some(base_message),
        }
    }

    /// An error message.
    pub fn error(content: impl Into<String>) -> Self {
        Self::control("error", content)
    }

    /// The message written when a run is cancelled.
    pub fn cancelled() -> Self {
        Self::error(CANCELLED_CONTENT)
    }

    /// Reply to a client `ping`.
    pub fn pong() -> Self {
        Self::control("pong", "")
    }

    fn control(kind: &str, content: impl Into<String>) -> Self {
        Self {
            kind: kind.to_string(),
            content: content.into(),
            tool_calls: None,
            base_message: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == "error"
    }

    /// Serialize to a JSON text frame.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
