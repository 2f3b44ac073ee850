//! Execution engine trait.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::error::EngineError;
use crate::event::{RawEvent, StreamMode};
use crate::types::{ExecutionState, StateSnapshot};

/// Stream of raw events produced by one engine run.
pub type RawEventStream = Pin<Box<dyn Stream<Item = Result<RawEvent, EngineError>> + Send>>;

/// Per-run configuration passed to an engine.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub thread_id: String,
    pub stream_modes: Vec<StreamMode>,
    pub subgraphs: bool,
}

impl RunConfig {
    /// Configuration used for client runs: both modes, subgraphs on.
    pub fn streaming(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            stream_modes: vec![StreamMode::Updates, StreamMode::Messages],
            subgraphs: true,
        }
    }

    /// Configuration for state reads only.
    pub fn for_thread(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            stream_modes: Vec::new(),
            subgraphs: false,
        }
    }

    pub fn wants(&self, mode: StreamMode) -> bool {
        self.stream_modes.contains(&mode)
    }
}

/// A compiled workflow ready to run against a thread.
#[async_trait]
pub trait ExecutionEngine: Send + Sync {
    /// Name the workflow was registered under.
    fn name(&self) -> &str;

    /// Start a run and return its event stream.
    ///
    /// Dropping the stream abandons the run.
    fn stream(&self, input: ExecutionState, config: RunConfig) -> RawEventStream;

    /// Read the latest persisted state of a thread.
    async fn get_state(&self, config: &RunConfig) -> Result<Option<StateSnapshot>, EngineError>;
}
