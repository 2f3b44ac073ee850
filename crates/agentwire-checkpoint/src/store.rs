//! Checkpoint storage.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use agentwire_protocols::ExecutionState;

use crate::checkpoint::Checkpoint;
use crate::error::CheckpointError;

/// Checkpoint storage trait.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Short backend name for logs.
    fn backend(&self) -> &'static str;

    /// Create tables or other backing structures. Idempotent.
    async fn setup(&self) -> Result<(), CheckpointError>;

    /// Persist a checkpoint.
    async fn put(&self, checkpoint: &Checkpoint) -> Result<(), CheckpointError>;

    /// Persist a new checkpoint at the thread's next step.
    ///
    /// Picking the step and inserting the row is one operation, so concurrent
    /// writers on the same thread never share a step.
    async fn append(
        &self,
        thread_id: &str,
        values: ExecutionState,
        metadata: Value,
    ) -> Result<Checkpoint, CheckpointError>;

    /// Get the checkpoint with the highest step for a thread.
    async fn get_latest(&self, thread_id: &str) -> Result<Option<Checkpoint>, CheckpointError>;

    /// List all checkpoints for a thread (ordered by step, oldest first).
    async fn list(&self, thread_id: &str) -> Result<Vec<Checkpoint>, CheckpointError>;

    /// Delete a checkpoint.
    async fn delete(&self, id: &Uuid) -> Result<(), CheckpointError>;

    /// Delete all checkpoints for a thread.
    async fn delete_thread(&self, thread_id: &str) -> Result<(), CheckpointError>;
}

/// In-memory checkpoint store. State is lost on restart.
pub struct MemoryCheckpointStore {
    checkpoints: RwLock<HashMap<Uuid, Checkpoint>>,
}

impl MemoryCheckpointStore {
    /// Create a new memory store.
    pub fn new() -> Self {
        Self {
            checkpoints: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryCheckpointStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpointStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn setup(&self) -> Result<(), CheckpointError> {
        Ok(())
    }

    async fn put(&self, checkpoint: &Checkpoint) -> Result<(), CheckpointError> {
        let mut store = self.checkpoints.write().await;
        store.insert(checkpoint.id, checkpoint.clone());
        Ok(())
    }

    async fn append(
        &self,
        thread_id: &str,
        values: ExecutionState,
        metadata: Value,
    ) -> Result<Checkpoint, CheckpointError> {
        let mut store = self.checkpoints.write().await;
        let step = store
            .values()
            .filter(|cp| cp.thread_id == thread_id)
            .map(|cp| cp.step + 1)
            .max()
            .unwrap_or(0);
        let checkpoint = Checkpoint::new(thread_id, step, values).with_metadata(metadata);
        store.insert(checkpoint.id, checkpoint.clone());
        Ok(checkpoint)
    }

    async fn get_latest(&self, thread_id: &str) -> Result<Option<Checkpoint>, CheckpointError> {
        let store = self.checkpoints.read().await;
        let latest = store
            .values()
            .filter(|cp| cp.thread_id == thread_id)
            .max_by_key(|cp| (cp.step, cp.created_at))
            .cloned();
        Ok(latest)
    }

    async fn list(&self, thread_id: &str) -> Result<Vec<Checkpoint>, CheckpointError> {
        let store = self.checkpoints.read().await;
        let mut checkpoints: Vec<_> = store
            .values()
            .filter(|cp| cp.thread_id == thread_id)
            .cloned()
            .collect();
        checkpoints.sort_by_key(|cp| (cp.step, cp.created_at));
        Ok(checkpoints)
    }

    async fn delete(&self, id: &Uuid) -> Result<(), CheckpointError> {
        let mut store = self.checkpoints.write().await;
        store.remove(id);
        Ok(())
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<(), CheckpointError> {
        let mut store = self.checkpoints.write().await;
        store.retain(|_, cp| cp.thread_id != thread_id);
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
