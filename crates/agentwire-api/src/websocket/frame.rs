//! Inbound frame parsing.

use serde_json::Value;

/// Reply content for frames that are not a usable JSON object.
pub const INVALID_MESSAGE: &str = "Invalid message received";

/// A parsed client text frame.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundFrame {
    /// Cancel the runs in flight on this connection.
    Cancel,
    /// Heartbeat; answered with a pong.
    Ping,
    /// A run request, still unvalidated.
    Run(Value),
    /// Not JSON, not an object, or an empty object.
    Invalid(String),
}

impl InboundFrame {
    pub fn parse(text: &str) -> Self {
        let value: Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(e) => return Self::Invalid(format!("not JSON: {}", e)),
        };

        let Some(object) = value.as_object() else {
            return Self::Invalid("not a JSON object".to_string());
        };
        if object.is_empty() {
            return Self::Invalid("empty object".to_string());
        }

        match object.get("type").and_then(Value::as_str) {
            Some("cancel") => Self::Cancel,
            Some("ping") => Self::Ping,
            _ => Self::Run(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_control_frames() {
        assert_eq!(InboundFrame::parse(r#"{"type":"cancel"}"#), InboundFrame::Cancel);
        assert_eq!(InboundFrame::parse(r#"{"type":"ping"}"#), InboundFrame::Ping);
    }

    #[test]
    fn test_run_frame() {
        let frame = InboundFrame::parse(r#"{"agent_name":"echo","message":"hi","thread_id":"t1"}"#);
        assert_eq!(
            frame,
            InboundFrame::Run(json!({"agent_name": "echo", "message": "hi", "thread_id": "t1"}))
        );
    }

    #[test]
    fn test_unknown_type_is_a_run_request() {
        let frame = InboundFrame::parse(r#"{"type":"chat","agent_name":"echo"}"#);
        assert!(matches!(frame, InboundFrame::Run(_)));
    }

    #[test]
    fn test_invalid_frames() {
        for text in ["not json", "[1, 2]", "\"hello\"", "42", "{}", "null"] {
            assert!(
                matches!(InboundFrame::parse(text), InboundFrame::Invalid(_)),
                "expected invalid: {text}"
            );
        }
    }
}
