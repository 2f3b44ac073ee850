    use super::*;
    use crate::sqlite::SqliteCheckpointStore;
    use agentwire_protocols::ExecutionState;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn values(text: &str) -> ExecutionState {
        let mut values = ExecutionState::new();
        values.insert("messages".to_string(), json!([{"type": "ai", "content": text}]));
        values.insert("api_token".to_string(), json!("t"));
        values
    }

    async fn exercise_store(store: Arc<dyn CheckpointStore>) {
        store.setup().await.unwrap();
        // Setup is idempotent
        store.setup().await.unwrap();

        for step in [1, 5, 3] {
            let cp = Checkpoint::new("thread1", step, values(&format!("step {step}")));
            store.put(&cp).await.unwrap();
        }
        store
            .put(&Checkpoint::new("thread2", 9, values("other")))
            .await
            .unwrap();

        let latest = store.get_latest("thread1").await.unwrap().unwrap();
        assert_eq!(latest.step, 5);
        assert_eq!(latest.values["messages"][0]["content"], "step 5");
        assert_eq!(latest.values["api_token"], "t");

        let list = store.list("thread1").await.unwrap();
        let steps: Vec<u32> = list.iter().map(|cp| cp.step).collect();
        assert_eq!(steps, vec![1, 3, 5]);

        store.delete(&list[0].id).await.unwrap();
        assert_eq!(store.list("thread1").await.unwrap().len(), 2);

        store.delete_thread("thread1").await.unwrap();
        assert!(store.get_latest("thread1").await.unwrap().is_none());
        assert!(store.get_latest("thread2").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_memory_store() {
        exercise_store(Arc::new(MemoryCheckpointStore::new())).await;
    }

    #[tokio::test]
    async fn test_sqlite_in_memory_store() {
        let store = SqliteCheckpointStore::in_memory().await.unwrap();
        exercise_store(Arc::new(store)).await;
    }

    #[tokio::test]
    async fn test_sqlite_file_store() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("checkpoints.db");
        let store = SqliteCheckpointStore::open(&path).await.unwrap();
        exercise_store(Arc::new(store)).await;
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_sqlite_persists_across_connections() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("checkpoints.db");

        let cp = Checkpoint::new("thread1", 0, values("hello"))
            .with_metadata(json!({"source": "echo"}));
        {
            let store = SqliteCheckpointStore::open(&path).await.unwrap();
            store.setup().await.unwrap();
            store.put(&cp).await.unwrap();
        }

        let store = SqliteCheckpointStore::open(&path).await.unwrap();
        store.setup().await.unwrap();
        let loaded = store.get_latest("thread1").await.unwrap().unwrap();
        assert_eq!(loaded.id, cp.id);
        assert_eq!(loaded.values, cp.values);
        assert_eq!(loaded.metadata["source"], "echo");
    }

    #[tokio::test]
    async fn test_memory_store_empty_thread() {
        let store = MemoryCheckpointStore::new();
        assert!(store.get_latest("missing").await.unwrap().is_none());
        assert!(store.list("missing").await.unwrap().is_empty());
    }
