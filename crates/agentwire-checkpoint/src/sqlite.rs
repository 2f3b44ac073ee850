//! SQLite checkpoint store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use serde_json::Value;
use std::path::Path;
use tokio_rusqlite::Connection;
use uuid::Uuid;

use agentwire_protocols::ExecutionState;

use crate::checkpoint::Checkpoint;
use crate::error::CheckpointError;
use crate::schema::init_schema;
use crate::store::CheckpointStore;

const SELECT_COLUMNS: &str =
    "SELECT id, thread_id, step, created_at, checkpoint_values, metadata FROM checkpoints";

/// Durable checkpoint store backed by a SQLite database.
pub struct SqliteCheckpointStore {
    conn: Connection,
}

impl SqliteCheckpointStore {
    /// Open a database in memory. Contents live as long as the store.
    pub async fn in_memory() -> Result<Self, CheckpointError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| CheckpointError::Connection(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Open (or create) a database file.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, CheckpointError> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(path)
            .await
            .map_err(|e| CheckpointError::Connection(e.to_string()))?;
        Ok(Self { conn })
    }
}

/// Row as stored; decoded outside the connection thread.
struct CheckpointRow {
    id: String,
    thread_id: String,
    step: i64,
    created_at: String,
    values: String,
    metadata: String,
}

impl CheckpointRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            thread_id: row.get(1)?,
            step: row.get(2)?,
            created_at: row.get(3)?,
            values: row.get(4)?,
            metadata: row.get(5)?,
        })
    }

    fn into_checkpoint(self) -> Result<Checkpoint, CheckpointError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| CheckpointError::Serialization(format!("bad id {}: {}", self.id, e)))?;
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| CheckpointError::Serialization(e.to_string()))?;
        let step = u32::try_from(self.step)
            .map_err(|_| CheckpointError::Serialization(format!("bad step {}", self.step)))?;

        Ok(Checkpoint {
            id,
            thread_id: self.thread_id,
            step,
            created_at,
            values: serde_json::from_str(&self.values)?,
            metadata: serde_json::from_str(&self.metadata)?,
        })
    }
}

#[async_trait]
impl CheckpointStore for SqliteCheckpointStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn setup(&self) -> Result<(), CheckpointError> {
        self.conn
            .call(|conn| Ok(init_schema(conn)?))
            .await
            .map_err(|e| CheckpointError::Query(e.to_string()))
    }

    async fn put(&self, checkpoint: &Checkpoint) -> Result<(), CheckpointError> {
        let id = checkpoint.id.to_string();
        let thread_id = checkpoint.thread_id.clone();
        let step = i64::from(checkpoint.step);
        let created_at = checkpoint.created_at.to_rfc3339();
        let values = serde_json::to_string(&checkpoint.values)?;
        let metadata = serde_json::to_string(&checkpoint.metadata)?;

        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT OR REPLACE INTO checkpoints
                     (id, thread_id, step, created_at, checkpoint_values, metadata)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![id, thread_id, step, created_at, values, metadata],
                )?;
                Ok(())
            })
            .await
            .map_err(|e| CheckpointError::Query(e.to_string()))
    }

    async fn append(
        &self,
        thread_id: &str,
        values: ExecutionState,
        metadata: Value,
    ) -> Result<Checkpoint, CheckpointError> {
        let id = Uuid::new_v4();
        let created_at = Utc::now();
        let values_json = serde_json::to_string(&values)?;
        let metadata_json = serde_json::to_string(&metadata)?;
        let row_id = id.to_string();
        let row_thread = thread_id.to_string();
        let row_created = created_at.to_rfc3339();

        let step = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                let step: i64 = tx.query_row(
                    "SELECT COALESCE(MAX(step), -1) + 1 FROM checkpoints WHERE thread_id = ?1",
                    params![row_thread],
                    |row| row.get(0),
                )?;
                tx.execute(
                    "INSERT INTO checkpoints
                     (id, thread_id, step, created_at, checkpoint_values, metadata)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![row_id, row_thread, step, row_created, values_json, metadata_json],
                )?;
                tx.commit()?;
                Ok(step)
            })
            .await
            .map_err(|e| CheckpointError::Query(e.to_string()))?;

        let step = u32::try_from(step)
            .map_err(|_| CheckpointError::Serialization(format!("bad step {}", step)))?;
        Ok(Checkpoint {
            id,
            thread_id: thread_id.to_string(),
            step,
            created_at,
            values,
            metadata,
        })
    }

    async fn get_latest(&self, thread_id: &str) -> Result<Option<Checkpoint>, CheckpointError> {
        let thread_id = thread_id.to_string();
        let row = self
            .conn
            .call(move |conn| {
                let sql = format!(
                    "{SELECT_COLUMNS} WHERE thread_id = ?1 ORDER BY step DESC, created_at DESC LIMIT 1"
                );
                let row = conn
                    .query_row(&sql, params![thread_id], CheckpointRow::from_row)
                    .optional()?;
                Ok(row)
            })
            .await
            .map_err(|e| CheckpointError::Query(e.to_string()))?;

        row.map(CheckpointRow::into_checkpoint).transpose()
    }

    async fn list(&self, thread_id: &str) -> Result<Vec<Checkpoint>, CheckpointError> {
        let thread_id = thread_id.to_string();
        let rows = self
            .conn
            .call(move |conn| {
                let sql = format!("{SELECT_COLUMNS} WHERE thread_id = ?1 ORDER BY step ASC, created_at ASC");
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params![thread_id], CheckpointRow::from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(|e| CheckpointError::Query(e.to_string()))?;

        rows.into_iter().map(CheckpointRow::into_checkpoint).collect()
    }

    async fn delete(&self, id: &Uuid) -> Result<(), CheckpointError> {
        let id = id.to_string();
        self.conn
            .call(move |conn| {
                conn.execute("DELETE FROM checkpoints WHERE id = ?1", params![id])?;
                Ok(())
            })
            .await
            .map_err(|e| CheckpointError::Query(e.to_string()))
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<(), CheckpointError> {
        let thread_id = thread_id.to_string();
        self.conn
            .call(move |conn| {
                conn.execute("DELETE FROM checkpoints WHERE thread_id = ?1", params![thread_id])?;
                Ok(())
            })
            .await
            .map_err(|e| CheckpointError::Query(e.to_string()))
    }
}
