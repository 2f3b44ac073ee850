//! Raw engine events and their classified form.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::Message;

/// Stream mode an engine tags each raw event with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamMode {
    /// Full node outputs after a step completes.
    Updates,
    /// Incremental message chunks from a model.
    Messages,
}

impl StreamMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamMode::Updates => "updates",
            StreamMode::Messages => "messages",
        }
    }

    /// Parse a mode tag. Unknown tags yield `None`.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "updates" => Some(StreamMode::Updates),
            "messages" => Some(StreamMode::Messages),
            _ => None,
        }
    }
}

/// An event exactly as the engine emitted it.
///
/// Engines running with subgraphs emit `[namespace, mode, payload]`; older
/// engines emit `[mode, payload]`. Both shapes are accepted downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawEvent(pub Value);

impl RawEvent {
    /// A token delta: `[namespace, "messages", [chunk, metadata]]`.
    pub fn token(namespace: &[String], chunk: &Message, metadata: Value) -> Self {
        Self(Value::Array(vec![
            namespace_value(namespace),
            Value::String(StreamMode::Messages.as_str().to_string()),
            Value::Array(vec![chunk.to_value(), metadata]),
        ]))
    }

    /// A node update: `[namespace, "updates", {node: output}]`.
    pub fn update(namespace: &[String], node: &str, output: Value) -> Self {
        let mut payload = Map::new();
        payload.insert(node.to_string(), output);
        Self(Value::Array(vec![
            namespace_value(namespace),
            Value::String(StreamMode::Updates.as_str().to_string()),
            Value::Object(payload),
        ]))
    }

    /// A two-element event without a namespace.
    pub fn legacy(mode: StreamMode, payload: Value) -> Self {
        Self(Value::Array(vec![
            Value::String(mode.as_str().to_string()),
            payload,
        ]))
    }

    pub fn into_inner(self) -> Value {
        self.0
    }
}

impl From<Value> for RawEvent {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

fn namespace_value(namespace: &[String]) -> Value {
    Value::Array(namespace.iter().cloned().map(Value::String).collect())
}

/// A raw event after classification.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Incremental model output.
    TokenDelta {
        namespace: Vec<String>,
        content: String,
        raw_message: Value,
    },
    /// A node finished a step and produced messages.
    StateUpdate {
        namespace: Vec<String>,
        agent_key: String,
        messages: Vec<Value>,
        tool_calls: Vec<Value>,
    },
    /// Anything that is neither of the above.
    Unclassified { raw: Value },
}

impl StreamEvent {
    /// Short label used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            StreamEvent::TokenDelta { .. } => "token_delta",
            StreamEvent::StateUpdate { .. } => "state_update",
            StreamEvent::Unclassified { .. } => "unclassified",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_token_event_shape() {
        let event = RawEvent::token(&[], &Message::ai_chunk("he"), json!({"node": "echo"}));
        let value = event.into_inner();
        assert_eq!(value[0], json!([]));
        assert_eq!(value[1], "messages");
        assert_eq!(value[2][0]["content"], "he");
        assert_eq!(value[2][1]["node"], "echo");
    }

    #[test]
    fn test_update_event_shape() {
        let event = RawEvent::update(
            &["child:1".to_string()],
            "agent",
            json!({"messages": [{"type": "ai", "content": "x"}]}),
        );
        let value = event.into_inner();
        assert_eq!(value[0], json!(["child:1"]));
        assert_eq!(value[1], "updates");
        assert_eq!(value[2]["agent"]["messages"][0]["content"], "x");
    }

    #[test]
    fn test_legacy_event_shape() {
        let value = RawEvent::legacy(StreamMode::Updates, json!({})).into_inner();
        assert_eq!(value, json!(["updates", {}]));
    }

    #[test]
    fn test_stream_mode_parse() {
        assert_eq!(StreamMode::parse("updates"), Some(StreamMode::Updates));
        assert_eq!(StreamMode::parse("messages"), Some(StreamMode::Messages));
        assert_eq!(StreamMode::parse("values"), None);
    }
}
