//! WebSocket connection handler.
//!
//! Reads client frames and answers control frames inline. Run requests go
//! onto the connection's run queue and execute one after another in arrival
//! order. Writes go through a single sender task so the socket sink has one
//! owner.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use agentwire_protocols::{ConnectionId, DuplexChannel, OutboundMessage};

use crate::state::AppState;

use super::channel::WsChannel;
use super::frame::{InboundFrame, INVALID_MESSAGE};
use super::tracker::RunTracker;

const OUTBOUND_BUFFER: usize = 100;

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection = ConnectionId::new();
    info!(connection_id = %connection, "WebSocket connected");
    state.connection_opened();

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<OutboundMessage>(OUTBOUND_BUFFER);
    let channel = WsChannel::new(tx);
    let runs = RunTracker::new();

    let sender_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let json = match msg.to_json() {
                Ok(json) => json,
                Err(e) => {
                    warn!("Failed to serialize outbound message: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Text(text)) => {
                handle_frame(&state, connection, &channel, &runs, text.as_str()).await;
            }
            Ok(Message::Close(_)) => {
                info!(connection_id = %connection, "WebSocket closed by peer");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                warn!(connection_id = %connection, "WebSocket error: {}", e);
                break;
            }
        }
    }

    // Peer is gone: no further writes, cancel and drain the runs, then drop the lock entry.
    channel.close();
    runs.shutdown().await;
    state.orchestrator.connection_closed(&connection);
    state.connection_closed();
    sender_task.abort();
    info!(connection_id = %connection, "WebSocket disconnected");
}

/// Dispatch one client text frame.
pub(crate) async fn handle_frame(
    state: &Arc<AppState>,
    connection: ConnectionId,
    channel: &WsChannel,
    runs: &RunTracker,
    text: &str,
) {
    match InboundFrame::parse(text) {
        InboundFrame::Invalid(reason) => {
            warn!(connection_id = %connection, "Invalid frame: {}", reason);
            reply(channel, OutboundMessage::error(INVALID_MESSAGE)).await;
        }
        InboundFrame::Ping => reply(channel, OutboundMessage::pong()).await,
        InboundFrame::Cancel => {
            info!(connection_id = %connection, in_flight = runs.in_flight(), "Cancel requested");
            runs.cancel_runs();
        }
        InboundFrame::Run(frame) => {
            state.increment_requests();
            let orchestrator = state.orchestrator.clone();
            let channel = channel.clone();
            let cancel = runs.child_token();

            let queued = runs.enqueue(async move {
                match orchestrator
                    .handle_message(connection, &channel, frame, &cancel)
                    .await
                {
                    Ok(summary) => {
                        debug!(thread_id = %summary.thread_id, "Run finished");
                    }
                    Err(e) if e.prevented_start() => {
                        warn!(connection_id = %connection, "Run rejected: {}", e);
                        reply(&channel, OutboundMessage::error(e.to_string())).await;
                    }
                    Err(e) => {
                        debug!(connection_id = %connection, "Run ended: {}", e);
                    }
                }
            });
            if !queued {
                debug!(connection_id = %connection, "Connection closing, run request dropped");
            }
        }
    }
}

async fn reply(channel: &WsChannel, message: OutboundMessage) {
    if !channel.is_open() {
        return;
    }
    if let Err(e) = channel.send(&message).await {
        debug!("Failed to reply: {}", e);
    }
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
