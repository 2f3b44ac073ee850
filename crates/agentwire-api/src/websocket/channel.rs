//! WebSocket duplex channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use agentwire_protocols::{ChannelError, DuplexChannel, OutboundMessage};

/// Outbound half of one WebSocket connection.
///
/// Messages are queued to the connection's sender task. Clones share the
/// queue and the open flag.
#[derive(Clone)]
pub struct WsChannel {
    tx: mpsc::Sender<OutboundMessage>,
    open: Arc<AtomicBool>,
}

impl WsChannel {
    pub fn new(tx: mpsc::Sender<OutboundMessage>) -> Self {
        Self {
            tx,
            open: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Mark the peer as gone. Later writes fail with `Closed`.
    pub fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl DuplexChannel for WsChannel {
    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst) && !self.tx.is_closed()
    }

    async fn send(&self, message: &OutboundMessage) -> Result<(), ChannelError> {
        if !self.is_open() {
            return Err(ChannelError::Closed);
        }
        self.tx
            .send(message.clone())
            .await
            .map_err(|_| ChannelError::Closed)
    }
}

#[cfg(test)]
#[path = "channel_tests.rs"]
mod tests;
