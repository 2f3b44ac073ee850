//! Checkpoint data structures and retention manager.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;
use uuid::Uuid;

use agentwire_protocols::{ExecutionState, StateSnapshot};

use crate::error::CheckpointError;
use crate::store::CheckpointStore;

/// A persisted snapshot of one thread's execution state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Unique checkpoint ID.
    pub id: Uuid,
    /// Thread this checkpoint belongs to.
    pub thread_id: String,
    /// Monotonic step counter within the thread.
    pub step: u32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Execution state values.
    pub values: ExecutionState,
    /// Free-form metadata (writing node, agent name, ...).
    pub metadata: Value,
}

impl Checkpoint {
    /// Create a new checkpoint.
    pub fn new(thread_id: impl Into<String>, step: u32, values: ExecutionState) -> Self {
        Self {
            id: Uuid::new_v4(),
            thread_id: thread_id.into(),
            step,
            created_at: Utc::now(),
            values,
            metadata: Value::Null,
        }
    }

    /// Add metadata.
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// View as a state snapshot.
    pub fn to_snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            values: self.values.clone(),
            step: self.step,
            created_at: self.created_at,
        }
    }
}

type ThreadLocks = Arc<DashMap<String, Arc<Mutex<()>>>>;

/// Exclusive hold on one thread's state. Released on drop.
pub struct ThreadGuard {
    thread_id: String,
    locks: ThreadLocks,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for ThreadGuard {
    fn drop(&mut self) {
        self.guard.take();
        // Only the map still references the mutex when nobody holds or awaits it.
        self.locks
            .remove_if(&self.thread_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

/// Writes checkpoints and enforces per-thread retention.
pub struct CheckpointManager {
    store: Arc<dyn CheckpointStore>,
    max_per_thread: usize,
    thread_locks: ThreadLocks,
}

impl CheckpointManager {
    /// Create a manager keeping at most `max_per_thread` checkpoints per
    /// thread. 0 keeps everything.
    pub fn new(store: Arc<dyn CheckpointStore>, max_per_thread: usize) -> Self {
        Self {
            store,
            max_per_thread,
            thread_locks: Arc::new(DashMap::new()),
        }
    }

    /// Wait for exclusive use of a thread.
    ///
    /// A run that reads the latest state, extends it and saves it back holds
    /// this for its whole length, so concurrent runs on one thread queue up
    /// instead of overwriting each other.
    pub async fn lock_thread(&self, thread_id: &str) -> ThreadGuard {
        let lock = self
            .thread_locks
            .entry(thread_id.to_string())
            .or_default()
            .clone();
        let guard = lock.lock_owned().await;
        ThreadGuard {
            thread_id: thread_id.to_string(),
            locks: self.thread_locks.clone(),
            guard: Some(guard),
        }
    }

    /// Backend name of the underlying store.
    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    /// Save the next checkpoint for a thread.
    pub async fn save(
        &self,
        thread_id: &str,
        values: ExecutionState,
        metadata: Value,
    ) -> Result<Checkpoint, CheckpointError> {
        let checkpoint = self.store.append(thread_id, values, metadata).await?;

        self.cleanup(thread_id).await?;

        Ok(checkpoint)
    }

    /// Get the latest checkpoint for a thread.
    pub async fn latest(&self, thread_id: &str) -> Result<Option<Checkpoint>, CheckpointError> {
        self.store.get_latest(thread_id).await
    }

    /// Latest state of a thread as a snapshot.
    pub async fn snapshot(&self, thread_id: &str) -> Result<Option<StateSnapshot>, CheckpointError> {
        Ok(self.latest(thread_id).await?.map(|cp| cp.to_snapshot()))
    }

    /// List checkpoints for a thread, oldest first.
    pub async fn list(&self, thread_id: &str) -> Result<Vec<Checkpoint>, CheckpointError> {
        self.store.list(thread_id).await
    }

    /// Delete every checkpoint of a thread.
    pub async fn delete_thread(&self, thread_id: &str) -> Result<(), CheckpointError> {
        self.store.delete_thread(thread_id).await
    }

    async fn cleanup(&self, thread_id: &str) -> Result<(), CheckpointError> {
        if self.max_per_thread == 0 {
            return Ok(());
        }
        let checkpoints = self.store.list(thread_id).await?;

        if checkpoints.len() > self.max_per_thread {
            let to_delete = checkpoints.len() - self.max_per_thread;
            for checkpoint in checkpoints.iter().take(to_delete) {
                self.store.delete(&checkpoint.id).await?;
            }
            debug!(thread_id, pruned = to_delete, "Pruned old checkpoints");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::SqliteCheckpointStore;
    use crate::store::MemoryCheckpointStore;
    use serde_json::json;
    use std::time::Duration;
    use tokio::task::JoinSet;
    use tokio::time::timeout;

    fn state(text: &str) -> ExecutionState {
        let mut values = ExecutionState::new();
        values.insert("messages".to_string(), json!([{"type": "human", "content": text}]));
        values
    }

    #[test]
    fn test_checkpoint_new() {
        let cp = Checkpoint::new("thread1", 3, state("hi"));
        assert_eq!(cp.thread_id, "thread1");
        assert_eq!(cp.step, 3);
        assert_eq!(cp.metadata, Value::Null);
        assert_eq!(cp.to_snapshot().messages().len(), 1);
    }

    #[tokio::test]
    async fn test_save_increments_step() {
        let manager = CheckpointManager::new(Arc::new(MemoryCheckpointStore::new()), 20);

        let first = manager.save("thread1", state("a"), Value::Null).await.unwrap();
        let second = manager.save("thread1", state("b"), Value::Null).await.unwrap();
        let other = manager.save("thread2", state("c"), Value::Null).await.unwrap();

        assert_eq!(first.step, 0);
        assert_eq!(second.step, 1);
        assert_eq!(other.step, 0);

        let latest = manager.latest("thread1").await.unwrap().unwrap();
        assert_eq!(latest.id, second.id);
    }

    #[tokio::test]
    async fn test_retention_prunes_oldest() {
        let manager = CheckpointManager::new(Arc::new(MemoryCheckpointStore::new()), 2);
        for text in ["a", "b", "c", "d"] {
            manager.save("thread1", state(text), Value::Null).await.unwrap();
        }

        let remaining = manager.list("thread1").await.unwrap();
        assert_eq!(remaining.len(), 2);
        assert_eq!(remaining[0].step, 2);
        assert_eq!(remaining[1].step, 3);
    }

    #[tokio::test]
    async fn test_zero_retention_keeps_everything() {
        let manager = CheckpointManager::new(Arc::new(MemoryCheckpointStore::new()), 0);
        for text in ["a", "b", "c"] {
            manager.save("thread1", state(text), Value::Null).await.unwrap();
        }
        assert_eq!(manager.list("thread1").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_concurrent_saves_get_distinct_steps() {
        let store = SqliteCheckpointStore::in_memory().await.unwrap();
        store.setup().await.unwrap();
        let manager = Arc::new(CheckpointManager::new(Arc::new(store), 0));

        let mut tasks = JoinSet::new();
        for i in 0..8 {
            let manager = manager.clone();
            tasks.spawn(async move {
                manager
                    .save("thread1", state(&format!("m{i}")), Value::Null)
                    .await
                    .unwrap()
                    .step
            });
        }
        let mut steps = Vec::new();
        while let Some(step) = tasks.join_next().await {
            steps.push(step.unwrap());
        }
        steps.sort();

        assert_eq!(steps, (0..8).collect::<Vec<u32>>());
        assert_eq!(manager.list("thread1").await.unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_lock_thread_serializes_holders() {
        let manager = Arc::new(CheckpointManager::new(Arc::new(MemoryCheckpointStore::new()), 20));
        let first = manager.lock_thread("thread1").await;

        let waiter = {
            let manager = manager.clone();
            tokio::spawn(async move {
                let _guard = manager.lock_thread("thread1").await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        // Other threads are not affected.
        let other = timeout(Duration::from_secs(1), manager.lock_thread("thread2"))
            .await
            .unwrap();
        drop(other);

        drop(first);
        timeout(Duration::from_secs(1), waiter).await.unwrap().unwrap();
        assert!(manager.thread_locks.is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_missing_thread() {
        let manager = CheckpointManager::new(Arc::new(MemoryCheckpointStore::new()), 20);
        assert!(manager.snapshot("nope").await.unwrap().is_none());
    }
}
