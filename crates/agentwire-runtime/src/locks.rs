//! Per-connection request serialization.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use agentwire_protocols::ConnectionId;

/// One fair lock per connection.
///
/// Requests on the same connection run one at a time in arrival order;
/// requests on different connections never contend.
#[derive(Default)]
pub struct ConnectionLocks {
    locks: DashMap<ConnectionId, Arc<Mutex<()>>>,
}

impl ConnectionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock for a connection, created on first reference.
    pub fn lock_for(&self, connection: ConnectionId) -> Arc<Mutex<()>> {
        self.locks.entry(connection).or_default().clone()
    }

    /// Wait for the connection's lock. Released when the guard drops.
    pub async fn acquire(&self, connection: ConnectionId) -> OwnedMutexGuard<()> {
        self.lock_for(connection).lock_owned().await
    }

    /// Forget a connection. Runs still holding its lock are unaffected.
    pub fn remove(&self, connection: &ConnectionId) -> bool {
        self.locks.remove(connection).is_some()
    }

    pub fn contains(&self, connection: &ConnectionId) -> bool {
        self.locks.contains_key(connection)
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
