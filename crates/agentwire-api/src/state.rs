//! Application state.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use agentwire_runtime::SessionOrchestrator;

/// Application state shared across handlers.
pub struct AppState {
    pub orchestrator: Arc<SessionOrchestrator>,
    start_time: Instant,
    request_count: AtomicU64,
    active_connections: AtomicUsize,
}

impl AppState {
    pub fn new(orchestrator: Arc<SessionOrchestrator>) -> Self {
        Self {
            orchestrator,
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
            active_connections: AtomicUsize::new(0),
        }
    }

    /// Get uptime.
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Run requests received over all connections.
    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    pub fn increment_requests(&self) {
        self.request_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::Relaxed)
    }

    pub(crate) fn connection_opened(&self) {
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }
}
