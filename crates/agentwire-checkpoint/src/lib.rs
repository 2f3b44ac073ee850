//! # agentwire Checkpoint
//!
//! Per-thread execution state persistence.
//!
//! ## Features
//!
//! - Durable SQLite store with idempotent schema setup
//! - In-memory fallback when no durable backend is reachable
//! - One shared checkpointer per process
//! - Per-thread retention

pub mod checkpoint;
pub mod error;
pub mod provider;
pub mod schema;
pub mod sqlite;
pub mod store;
pub mod uri;

pub use checkpoint::{Checkpoint, CheckpointManager, ThreadGuard};
pub use error::CheckpointError;
pub use provider::{open_durable, CheckpointerHandle, CheckpointerMode, CheckpointerProvider};
pub use sqlite::SqliteCheckpointStore;
pub use store::{CheckpointStore, MemoryCheckpointStore};
pub use uri::DbUri;
