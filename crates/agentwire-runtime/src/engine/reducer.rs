//! State merge rules.

use serde_json::{Map, Value};

use agentwire_protocols::{ExecutionState, MESSAGES_KEY};

/// Merge a node's output into the running state.
///
/// `messages` is appended to, with an incoming message replacing an existing
/// one that has the same non-null `id`. Every other key is overwritten.
pub fn merge_state(state: &mut ExecutionState, update: Map<String, Value>) {
    for (key, value) in update {
        if key == MESSAGES_KEY {
            merge_messages(state, value);
        } else {
            state.insert(key, value);
        }
    }
}

fn merge_messages(state: &mut ExecutionState, incoming: Value) {
    let incoming = match incoming {
        Value::Array(incoming) => incoming,
        other => {
            state.insert(MESSAGES_KEY.to_string(), other);
            return;
        }
    };

    let existing = state
        .entry(MESSAGES_KEY.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));

    match existing {
        Value::Array(existing) => {
            for message in incoming {
                let position = message_id(&message)
                    .and_then(|id| existing.iter().position(|m| message_id(m) == Some(id)));
                match position {
                    Some(index) => existing[index] = message,
                    None => existing.push(message),
                }
            }
        }
        other => *other = Value::Array(incoming),
    }
}

fn message_id(message: &Value) -> Option<&str> {
    message.get("id").and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_messages_are_appended() {
        let mut state = object(json!({"messages": [{"type": "human", "content": "hi"}]}));
        merge_state(
            &mut state,
            object(json!({"messages": [{"type": "ai", "content": "hello"}]})),
        );
        assert_eq!(state["messages"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_message_with_same_id_is_replaced() {
        let mut state = object(json!({"messages": [{"id": "m1", "type": "ai", "content": "draft"}]}));
        merge_state(
            &mut state,
            object(json!({"messages": [{"id": "m1", "type": "ai", "content": "final"}]})),
        );
        let messages = state["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["content"], "final");
    }

    #[test]
    fn test_other_keys_overwrite() {
        let mut state = object(json!({"agent_prompt": "a", "messages": []}));
        merge_state(&mut state, object(json!({"agent_prompt": "b"})));
        assert_eq!(state["agent_prompt"], "b");
    }

    #[test]
    fn test_messages_into_empty_state() {
        let mut state = ExecutionState::new();
        merge_state(&mut state, object(json!({"messages": [{"type": "ai", "content": "x"}]})));
        assert_eq!(state["messages"].as_array().unwrap().len(), 1);
    }
}
