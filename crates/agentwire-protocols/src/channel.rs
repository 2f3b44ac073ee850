//! Duplex channel abstraction.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ChannelError;
use crate::wire::OutboundMessage;

/// Identity of one client connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bidirectional message channel to one client.
///
/// The orchestrator only writes; reading is the transport's job.
#[async_trait]
pub trait DuplexChannel: Send + Sync {
    /// Whether the client side is still connected.
    fn is_open(&self) -> bool;

    /// Write one message to the client.
    async fn send(&self, message: &OutboundMessage) -> Result<(), ChannelError>;
}
