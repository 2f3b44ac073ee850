//! Echo workflow: replies with the latest human message.

use async_trait::async_trait;
use serde_json::{json, Value};
use uuid::Uuid;

use agentwire_checkpoint::CheckpointerHandle;
use agentwire_protocols::{
    content_text, EngineError, ExecutionState, Message, MessageKind, MESSAGES_KEY,
};

use crate::engine::{Node, NodeContext, NodeOutput, StepGraph};

/// Catalog locator of the echo workflow.
pub const ECHO_LOCATOR: &str = "workflows/echo:build_workflow";

/// Build the echo graph.
pub fn build_workflow(checkpointer: CheckpointerHandle) -> StepGraph {
    StepGraph::new("echo", checkpointer).add_node(EchoNode)
}

struct EchoNode;

#[async_trait]
impl Node for EchoNode {
    fn name(&self) -> &str {
        "echo"
    }

    async fn run(&self, state: &ExecutionState, ctx: &NodeContext) -> Result<NodeOutput, EngineError> {
        let reply = last_human_text(state)
            .ok_or_else(|| EngineError::InvalidState("no human message to echo".to_string()))?;
        let run_id = format!("run-{}", Uuid::new_v4());

        for piece in reply.split_inclusive(' ') {
            ctx.emit_token(&Message::ai_chunk(piece).with_id(run_id.clone()))
                .await?;
        }

        let mut output = NodeOutput::new();
        output.insert(
            MESSAGES_KEY.to_string(),
            json!([Message::ai(reply).with_id(run_id).to_value()]),
        );
        Ok(output)
    }
}

fn last_human_text(state: &ExecutionState) -> Option<String> {
    state
        .get(MESSAGES_KEY)?
        .as_array()?
        .iter()
        .rev()
        .find(|m| m.get("type").and_then(Value::as_str) == Some(MessageKind::Human.as_str()))
        .map(|m| content_text(m.get("content").unwrap_or(&Value::Null)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentwire_protocols::{ExecutionEngine, RunConfig};
    use futures::StreamExt;

    #[tokio::test]
    async fn test_echo_replies_with_input() {
        let graph = build_workflow(CheckpointerHandle::in_memory(20));
        let mut state = ExecutionState::new();
        state.insert(MESSAGES_KEY.to_string(), json!([Message::human("hi there").to_value()]));

        let events: Vec<_> = graph.stream(state, RunConfig::streaming("t1")).collect().await;
        let values: Vec<Value> = events.into_iter().map(|e| e.unwrap().into_inner()).collect();

        let tokens: String = values
            .iter()
            .filter(|v| v[1] == "messages")
            .filter_map(|v| v[2][0]["content"].as_str())
            .collect();
        assert_eq!(tokens, "hi there");

        let update = values.last().unwrap();
        assert_eq!(update[2]["echo"]["messages"][0]["content"], "hi there");
        assert_eq!(update[2]["echo"]["messages"][0]["type"], "ai");
    }

    #[tokio::test]
    async fn test_echo_without_human_message_fails() {
        let graph = build_workflow(CheckpointerHandle::in_memory(20));
        let events: Vec<_> = graph
            .stream(ExecutionState::new(), RunConfig::streaming("t1"))
            .collect()
            .await;
        assert!(matches!(events.last(), Some(Err(EngineError::InvalidState(_)))));
    }
}
