use super::*;
use serde_json::json;

#[test]
fn test_human_message_has_created_at() {
    let msg = Message::human("hi");
    assert_eq!(msg.kind, MessageKind::Human);
    assert_eq!(msg.text(), "hi");
    assert!(msg.response_metadata.contains_key("created_at"));
}

#[test]
fn test_message_serializes_kind_as_type() {
    let value = Message::ai("hello").to_value();
    assert_eq!(value["type"], "ai");
    assert_eq!(value["content"], "hello");
    assert_eq!(value["tool_calls"], json!([]));
}

#[test]
fn test_ai_chunk_kind_name() {
    let value = Message::ai_chunk("he").to_value();
    assert_eq!(value["type"], "AIMessageChunk");
    assert_eq!(MessageKind::AiChunk.as_str(), "AIMessageChunk");
}

#[test]
fn test_tool_message() {
    let msg = Message::tool("call_1", "result");
    assert_eq!(msg.kind, MessageKind::Tool);
    assert_eq!(msg.tool_call_id.as_deref(), Some("call_1"));
}

#[test]
fn test_with_tool_calls_round_trip() {
    let msg = Message::ai("")
        .with_id("run-1")
        .with_tool_calls(vec![ToolCall::new("call_1", "search", json!({"q": "rust"}))]);
    let value = msg.to_value();
    assert_eq!(value["tool_calls"][0]["name"], "search");

    let parsed: Message = serde_json::from_value(value).unwrap();
    assert_eq!(parsed, msg);
}

#[test]
fn test_deserialize_minimal_message() {
    let parsed: Message = serde_json::from_value(json!({"type": "system", "content": "be brief"}))
        .unwrap();
    assert_eq!(parsed.kind, MessageKind::System);
    assert!(parsed.tool_calls.is_empty());
    assert!(parsed.additional_kwargs.is_empty());
}
