//! Raw event classification.
//!
//! Raw events are decoded once here by shape alone: arity plus the stream
//! mode tag. Both `[namespace, mode, payload]` and `[mode, payload]` are
//! accepted.

use serde_json::{Map, Value};
use tracing::{debug, info};

use agentwire_protocols::{content_text, RawEvent, StreamEvent, StreamMode, MESSAGES_KEY};

/// Classify a raw engine event.
pub fn classify(raw: &RawEvent) -> StreamEvent {
    let Some((namespace, mode, payload)) = split(&raw.0) else {
        debug!("Unrecognized event shape");
        return unclassified(raw);
    };

    match mode {
        StreamMode::Messages => classify_token(namespace, payload).unwrap_or_else(|| {
            debug!("Messages event without a usable chunk");
            unclassified(raw)
        }),
        StreamMode::Updates => match payload.as_object() {
            Some(nodes) => classify_update(namespace, nodes).unwrap_or_else(|| {
                debug!("Update event without any node messages");
                unclassified(raw)
            }),
            None => {
                debug!("Update event payload is not a mapping");
                unclassified(raw)
            }
        },
    }
}

fn unclassified(raw: &RawEvent) -> StreamEvent {
    StreamEvent::Unclassified { raw: raw.0.clone() }
}

fn split(value: &Value) -> Option<(Vec<String>, StreamMode, &Value)> {
    let items = value.as_array()?;
    match items.as_slice() {
        [namespace, mode, payload] => {
            let namespace = parse_namespace(namespace)?;
            let mode = StreamMode::parse(mode.as_str()?)?;
            Some((namespace, mode, payload))
        }
        [mode, payload] => {
            let mode = StreamMode::parse(mode.as_str()?)?;
            Some((Vec::new(), mode, payload))
        }
        _ => None,
    }
}

fn parse_namespace(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Array(parts) => parts
            .iter()
            .map(|p| p.as_str().map(str::to_string))
            .collect(),
        Value::String(part) => Some(vec![part.clone()]),
        Value::Null => Some(Vec::new()),
        _ => None,
    }
}

fn classify_token(namespace: Vec<String>, payload: &Value) -> Option<StreamEvent> {
    let chunk = match payload {
        Value::Array(items) => items.first()?,
        _ => return None,
    };
    let content = match chunk {
        Value::Object(message) => content_text(message.get("content").unwrap_or(&Value::Null)),
        Value::String(text) => text.clone(),
        _ => return None,
    };
    Some(StreamEvent::TokenDelta {
        namespace,
        content,
        raw_message: chunk.clone(),
    })
}

fn classify_update(namespace: Vec<String>, nodes: &Map<String, Value>) -> Option<StreamEvent> {
    // First node with a non-empty messages list wins; later nodes are not
    // inspected.
    let (agent_key, messages) = nodes.iter().find_map(|(key, output)| {
        let messages = output.get(MESSAGES_KEY)?.as_array()?;
        (!messages.is_empty()).then_some((key, messages))
    })?;

    let last = messages.last()?;
    let tool_calls = extract_tool_calls(last);
    if let Some(first) = tool_calls.first() {
        let (name, args) = describe_tool_call(first);
        info!(agent = %agent_key, tool = %name, args = %args, "Tool call detected");
    }

    Some(StreamEvent::StateUpdate {
        namespace,
        agent_key: agent_key.clone(),
        messages: messages.clone(),
        tool_calls,
    })
}

/// Tool calls on a message: `tool_calls`, else `additional_kwargs.tool_calls`.
pub fn extract_tool_calls(message: &Value) -> Vec<Value> {
    let direct = message.get("tool_calls").and_then(Value::as_array);
    let nested = message
        .get("additional_kwargs")
        .and_then(|kwargs| kwargs.get("tool_calls"))
        .and_then(Value::as_array);

    [direct, nested]
        .into_iter()
        .flatten()
        .find(|calls| !calls.is_empty())
        .cloned()
        .unwrap_or_default()
}

fn describe_tool_call(call: &Value) -> (String, String) {
    let function = call.get("function");
    let name = call
        .get("name")
        .or_else(|| function.and_then(|f| f.get("name")))
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();
    let args = call
        .get("args")
        .or_else(|| function.and_then(|f| f.get("arguments")))
        .map(|a| match a {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .unwrap_or_default();
    (name, args)
}

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod tests;
