//! Sequential step graph.
//!
//! Nodes run in registration order against a shared state. Each run holds the
//! thread's lock, loads its latest checkpoint, merges the input, then
//! checkpoints after every node. Events flow through a bounded channel; dropping the returned stream
//! stops the run at its next emit.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

use agentwire_checkpoint::{CheckpointError, CheckpointerHandle};
use agentwire_protocols::{
    EngineError, ExecutionEngine, ExecutionState, Message, RawEvent, RawEventStream, RunConfig,
    StateSnapshot, StreamMode,
};

use super::reducer::merge_state;

const EVENT_BUFFER: usize = 64;

/// Partial state written by one node.
pub type NodeOutput = Map<String, Value>;

/// One step of a graph.
#[async_trait]
pub trait Node: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self, state: &ExecutionState, ctx: &NodeContext) -> Result<NodeOutput, EngineError>;
}

/// Per-step handle a node uses to stream tokens.
pub struct NodeContext {
    node: String,
    namespace: Vec<String>,
    thread_id: String,
    step: u32,
    emit_tokens: bool,
    tx: mpsc::Sender<Result<RawEvent, EngineError>>,
}

impl NodeContext {
    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    pub fn step(&self) -> u32 {
        self.step
    }

    /// Emit an incremental message chunk.
    ///
    /// A no-op when the run did not ask for `messages` mode. Fails with
    /// [`EngineError::Aborted`] once the consumer has gone away.
    pub async fn emit_token(&self, chunk: &Message) -> Result<(), EngineError> {
        if !self.emit_tokens {
            return Ok(());
        }
        let metadata = json!({
            "node": self.node,
            "step": self.step,
            "thread_id": self.thread_id,
        });
        self.tx
            .send(Ok(RawEvent::token(&self.namespace, chunk, metadata)))
            .await
            .map_err(|_| EngineError::Aborted)
    }
}

/// A compiled graph bound to a checkpointer.
pub struct StepGraph {
    name: String,
    nodes: Vec<Arc<dyn Node>>,
    checkpointer: CheckpointerHandle,
}

impl StepGraph {
    pub fn new(name: impl Into<String>, checkpointer: CheckpointerHandle) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            checkpointer,
        }
    }

    /// Append a node. Nodes run in the order they are added.
    pub fn add_node(mut self, node: impl Node + 'static) -> Self {
        self.nodes.push(Arc::new(node));
        self
    }

    pub fn checkpointer(&self) -> &CheckpointerHandle {
        &self.checkpointer
    }

    pub fn node_names(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.name()).collect()
    }
}

#[async_trait]
impl ExecutionEngine for StepGraph {
    fn name(&self) -> &str {
        &self.name
    }

    fn stream(&self, input: ExecutionState, config: RunConfig) -> RawEventStream {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let run = GraphRun {
            graph: self.name.clone(),
            nodes: self.nodes.clone(),
            checkpointer: self.checkpointer.clone(),
            config,
            tx,
        };
        tokio::spawn(run.execute(input));
        Box::pin(ReceiverStream::new(rx))
    }

    async fn get_state(&self, config: &RunConfig) -> Result<Option<StateSnapshot>, EngineError> {
        self.checkpointer
            .manager()
            .snapshot(&config.thread_id)
            .await
            .map_err(checkpoint_error)
    }
}

struct GraphRun {
    graph: String,
    nodes: Vec<Arc<dyn Node>>,
    checkpointer: CheckpointerHandle,
    config: RunConfig,
    tx: mpsc::Sender<Result<RawEvent, EngineError>>,
}

impl GraphRun {
    async fn execute(self, input: ExecutionState) {
        match self.run_steps(input).await {
            Ok(()) => debug!(graph = %self.graph, thread_id = %self.config.thread_id, "Graph run finished"),
            Err(EngineError::Aborted) => {
                debug!(graph = %self.graph, thread_id = %self.config.thread_id, "Graph run abandoned by consumer")
            }
            Err(e) => {
                warn!(graph = %self.graph, "Graph run failed: {}", e);
                let _ = self.tx.send(Err(e)).await;
            }
        }
    }

    async fn run_steps(&self, input: ExecutionState) -> Result<(), EngineError> {
        let manager = self.checkpointer.manager();
        let thread_id = self.config.thread_id.as_str();
        let _thread = manager.lock_thread(thread_id).await;

        let mut state = manager
            .latest(thread_id)
            .await
            .map_err(checkpoint_error)?
            .map(|cp| cp.values)
            .unwrap_or_default();
        merge_state(&mut state, input);
        manager
            .save(thread_id, state.clone(), json!({"source": "input", "graph": self.graph}))
            .await
            .map_err(checkpoint_error)?;

        let emit_updates = self.config.wants(StreamMode::Updates);
        let emit_tokens = self.config.wants(StreamMode::Messages);

        for (index, node) in self.nodes.iter().enumerate() {
            if self.tx.is_closed() {
                return Err(EngineError::Aborted);
            }

            let ctx = NodeContext {
                node: node.name().to_string(),
                namespace: Vec::new(),
                thread_id: thread_id.to_string(),
                step: index as u32 + 1,
                emit_tokens,
                tx: self.tx.clone(),
            };
            let output = node.run(&state, &ctx).await?;

            if emit_updates {
                let event = RawEvent::update(&[], node.name(), Value::Object(output.clone()));
                self.tx
                    .send(Ok(event))
                    .await
                    .map_err(|_| EngineError::Aborted)?;
            }

            merge_state(&mut state, output);
            manager
                .save(
                    thread_id,
                    state.clone(),
                    json!({"source": "loop", "graph": self.graph, "writes": node.name()}),
                )
                .await
                .map_err(checkpoint_error)?;
        }

        Ok(())
    }
}

fn checkpoint_error(err: CheckpointError) -> EngineError {
    EngineError::Checkpoint(err.to_string())
}

#[cfg(test)]
#[path = "graph_tests.rs"]
mod tests;
