//! Wire encoding of classified events.

use serde_json::{json, Value};
use tracing::warn;

use agentwire_protocols::{content_text, MessageKind, OutboundMessage, StreamEvent};

/// Encode a classified event. `Unclassified` has no wire form.
pub fn encode(event: &StreamEvent) -> Option<OutboundMessage> {
    match event {
        StreamEvent::TokenDelta {
            content,
            raw_message,
            ..
        } => {
            let kind = raw_message
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or(MessageKind::AiChunk.as_str());
            Some(OutboundMessage::stream(
                kind,
                content.clone(),
                Vec::new(),
                raw_message.clone(),
            ))
        }
        StreamEvent::StateUpdate {
            messages,
            tool_calls,
            ..
        } => {
            let last = messages.last().unwrap_or(&Value::Null);
            Some(encode_message(last, tool_calls.clone()))
        }
        StreamEvent::Unclassified { .. } => None,
    }
}

fn encode_message(message: &Value, tool_calls: Vec<Value>) -> OutboundMessage {
    if message.is_object() {
        let kind = message
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or(MessageKind::Ai.as_str());
        let content = content_text(message.get("content").unwrap_or(&Value::Null));
        return OutboundMessage::stream(kind, content, tool_calls, message.clone());
    }

    let stringified = match message {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    warn!(
        "Serialization failure: message is not an object, sending fallback payload: {}",
        stringified
    );
    let fallback = json!({"content": stringified, "type": MessageKind::Ai.as_str()});
    OutboundMessage::stream(MessageKind::Ai.as_str(), stringified, tool_calls, fallback)
}
