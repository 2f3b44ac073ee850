//! Session orchestrator.
//!
//! Drives one run request end to end: resolve the workflow, take the
//! connection's lock, drain the engine stream, and forward each event to the
//! client. Failures that prevent a run return before the lock is taken and
//! without writing; the transport reports those itself.

use std::sync::Arc;

use futures::StreamExt;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use agentwire_checkpoint::CheckpointerProvider;
use agentwire_protocols::{
    ChannelError, ConnectionId, DuplexChannel, ExecutionState, OutboundMessage, RunConfig,
    RunRequest,
};

use crate::classifier::classify;
use crate::encoder::encode;
use crate::error::SessionError;
use crate::locks::ConnectionLocks;
use crate::registry::WorkflowRegistry;

/// Counters for a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub thread_id: String,
    pub events_seen: usize,
    pub messages_sent: usize,
}

/// Owns the connection locks and routes run requests to workflows.
pub struct SessionOrchestrator {
    registry: Arc<WorkflowRegistry>,
    checkpointer: Arc<CheckpointerProvider>,
    locks: ConnectionLocks,
    default_agent: String,
}

impl SessionOrchestrator {
    pub fn new(
        registry: Arc<WorkflowRegistry>,
        checkpointer: Arc<CheckpointerProvider>,
        default_agent: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            checkpointer,
            locks: ConnectionLocks::new(),
            default_agent: default_agent.into(),
        }
    }

    pub fn registry(&self) -> &WorkflowRegistry {
        &self.registry
    }

    pub fn checkpointer(&self) -> &CheckpointerProvider {
        &self.checkpointer
    }

    pub fn locks(&self) -> &ConnectionLocks {
        &self.locks
    }

    /// Drop the lock entry of a closed connection.
    pub fn connection_closed(&self, connection: &ConnectionId) {
        if self.locks.remove(connection) {
            debug!(connection_id = %connection, "Removed connection lock");
        }
    }

    /// Parse an inbound frame and run it.
    pub async fn handle_message(
        &self,
        connection: ConnectionId,
        channel: &dyn DuplexChannel,
        frame: Value,
        cancel: &CancellationToken,
    ) -> Result<RunSummary, SessionError> {
        let request = RunRequest::from_value(frame)?;
        self.handle_request(connection, channel, request, cancel).await
    }

    /// Run one request to completion, cancellation or failure.
    pub async fn handle_request(
        &self,
        connection: ConnectionId,
        channel: &dyn DuplexChannel,
        request: RunRequest,
        cancel: &CancellationToken,
    ) -> Result<RunSummary, SessionError> {
        let thread_id = match request.thread_id() {
            Some(id) => id.to_string(),
            None => {
                let id = Uuid::new_v4().to_string();
                info!(connection_id = %connection, thread_id = %id, "No thread id supplied, generated one");
                id
            }
        };

        let span = info_span!(
            "session_run",
            connection_id = %connection,
            agent_name = %request.agent_name(),
            thread_id = %thread_id,
        );

        self.run(connection, channel, request, thread_id, cancel)
            .instrument(span)
            .await
    }

    async fn run(
        &self,
        connection: ConnectionId,
        channel: &dyn DuplexChannel,
        request: RunRequest,
        thread_id: String,
        cancel: &CancellationToken,
    ) -> Result<RunSummary, SessionError> {
        let checkpointer = self.checkpointer.get_or_create().await;
        let engine = self.registry.build(request.agent_name(), checkpointer)?;
        let input = request.initial_state();
        let config = RunConfig::streaming(thread_id.clone());

        let lock = self.locks.lock_for(connection);
        let _guard = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("Cancelled while waiting for connection lock");
                return Err(SessionError::Cancelled);
            }
            guard = lock.lock_owned() => guard,
        };
        debug!("Connection lock acquired");

        let mut summary = RunSummary {
            thread_id,
            events_seen: 0,
            messages_sent: 0,
        };
        let mut stream = engine.stream(input, config);

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(self.cancelled(channel, &summary).await),
                next = stream.next() => next,
            };

            let raw = match next {
                None => break,
                Some(Ok(raw)) => raw,
                Some(Err(e)) => {
                    error!(error = ?e, "Error processing request: {}", e);
                    if channel.is_open() {
                        let message = OutboundMessage::error(format!("Error processing request: {}", e));
                        write(channel, &message).await;
                    }
                    return Err(SessionError::Engine(e));
                }
            };

            summary.events_seen += 1;
            let event = classify(&raw);
            let Some(message) = encode(&event) else {
                debug!(kind = event.label(), "Event has no wire form, skipping");
                continue;
            };

            let sent = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(self.cancelled(channel, &summary).await),
                sent = write(channel, &message) => sent,
            };
            if sent {
                summary.messages_sent += 1;
            }
        }

        info!(
            events_seen = summary.events_seen,
            messages_sent = summary.messages_sent,
            "Run completed"
        );
        Ok(summary)
    }

    async fn cancelled(&self, channel: &dyn DuplexChannel, summary: &RunSummary) -> SessionError {
        info!(
            events_seen = summary.events_seen,
            messages_sent = summary.messages_sent,
            "Run cancelled"
        );
        if channel.is_open() {
            write(channel, &OutboundMessage::cancelled()).await;
        }
        SessionError::Cancelled
    }

    /// Latest persisted state of a thread, or `None` on any failure.
    ///
    /// Uses the default agent only to reach the shared checkpointer; takes no
    /// connection lock.
    pub async fn chat_history(&self, thread_id: &str) -> Option<ExecutionState> {
        let checkpointer = self.checkpointer.get_or_create().await;
        let engine = match self.registry.build(&self.default_agent, checkpointer) {
            Ok(engine) => engine,
            Err(e) => {
                error!(agent = %self.default_agent, "Failed to build engine for chat history: {}", e);
                return None;
            }
        };

        match engine.get_state(&RunConfig::for_thread(thread_id)).await {
            Ok(snapshot) => snapshot.map(|s| s.values),
            Err(e) => {
                error!(thread_id, "Failed to read chat history: {}", e);
                None
            }
        }
    }
}

/// Write a message unless the channel is gone. Returns whether it was sent.
async fn write(channel: &dyn DuplexChannel, message: &OutboundMessage) -> bool {
    if !channel.is_open() {
        debug!("Channel closed, dropping message");
        return false;
    }
    match channel.send(message).await {
        Ok(()) => true,
        Err(ChannelError::Closed) => {
            debug!("Channel closed during write");
            false
        }
        Err(e) => {
            warn!("Failed to write message: {}", e);
            false
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
