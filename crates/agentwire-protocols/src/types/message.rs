//! Message types for conversations.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::content::MessageContent;

/// A message in a conversation thread.
///
/// Serializes to the same flat shape clients receive as `base_message`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Kind of message (`human`, `ai`, ...).
    #[serde(rename = "type")]
    pub kind: MessageKind,

    /// Content of the message.
    pub content: MessageContent,

    /// Optional message ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Optional name for the sender.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Tool calls made in this message (for ai messages).
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,

    /// Tool call ID this message is responding to (for tool messages).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,

    /// Provider-specific extras.
    #[serde(default)]
    pub additional_kwargs: Map<String, Value>,

    /// Response metadata (timestamps, finish reasons, ...).
    #[serde(default)]
    pub response_metadata: Map<String, Value>,
}

impl Message {
    fn with_kind(kind: MessageKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: MessageContent::Text(content.into()),
            id: None,
            name: None,
            tool_calls: Vec::new(),
            tool_call_id: None,
            additional_kwargs: Map::new(),
            response_metadata: Map::new(),
        }
    }

    /// Create a human message stamped with `response_metadata.created_at`.
    pub fn human(content: impl Into<String>) -> Self {
        let mut message = Self::with_kind(MessageKind::Human, content);
        message.response_metadata.insert(
            "created_at".to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );
        message
    }

    /// Create an ai message.
    pub fn ai(content: impl Into<String>) -> Self {
        Self::with_kind(MessageKind::Ai, content)
    }

    /// Create a streaming ai chunk.
    pub fn ai_chunk(content: impl Into<String>) -> Self {
        Self::with_kind(MessageKind::AiChunk, content)
    }

    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_kind(MessageKind::System, content)
    }

    /// Create a tool response message.
    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        let mut message = Self::with_kind(MessageKind::Tool, content);
        message.tool_call_id = Some(tool_call_id.into());
        message
    }

    /// Set the message ID.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Attach tool calls.
    pub fn with_tool_calls(mut self, tool_calls: Vec<ToolCall>) -> Self {
        self.tool_calls = tool_calls;
        self
    }

    /// Text content of the message.
    pub fn text(&self) -> String {
        self.content.text()
    }

    /// Convert into a JSON value for engine state and raw events.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| {
            serde_json::json!({ "type": self.kind.as_str(), "content": self.text() })
        })
    }
}

/// Kind of a message, serialized under the `type` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    #[serde(rename = "human")]
    Human,
    #[serde(rename = "ai")]
    Ai,
    #[serde(rename = "system")]
    System,
    #[serde(rename = "tool")]
    Tool,
    #[serde(rename = "AIMessageChunk")]
    AiChunk,
}

impl MessageKind {
    /// Wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Human => "human",
            MessageKind::Ai => "ai",
            MessageKind::System => "system",
            MessageKind::Tool => "tool",
            MessageKind::AiChunk => "AIMessageChunk",
        }
    }
}

/// A tool call made by the ai.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub args: Value,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, args: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            args,
        }
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
