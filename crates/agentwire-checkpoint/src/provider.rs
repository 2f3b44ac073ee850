//! Process-wide checkpointer.
//!
//! The first caller decides the backend: a durable store when a connection
//! string is configured and reachable, otherwise an in-memory store. Later
//! callers get the cached handle and never retry the durable path.

use std::fmt;
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{info, warn};

use agentwire_config::CheckpointConfig;

use crate::checkpoint::CheckpointManager;
use crate::error::CheckpointError;
use crate::sqlite::SqliteCheckpointStore;
use crate::store::{CheckpointStore, MemoryCheckpointStore};
use crate::uri::DbUri;

/// Which backend a handle persists to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointerMode {
    Durable,
    InMemory,
}

/// Shared handle to the checkpoint manager.
#[derive(Clone)]
pub struct CheckpointerHandle {
    manager: Arc<CheckpointManager>,
    mode: CheckpointerMode,
}

impl CheckpointerHandle {
    fn new(store: Arc<dyn CheckpointStore>, mode: CheckpointerMode, max_per_thread: usize) -> Self {
        Self {
            manager: Arc::new(CheckpointManager::new(store, max_per_thread)),
            mode,
        }
    }

    /// A handle over an already prepared store.
    pub fn with_store(
        store: Arc<dyn CheckpointStore>,
        mode: CheckpointerMode,
        max_per_thread: usize,
    ) -> Self {
        Self::new(store, mode, max_per_thread)
    }

    /// A standalone in-memory handle.
    pub fn in_memory(max_per_thread: usize) -> Self {
        Self::new(
            Arc::new(MemoryCheckpointStore::new()),
            CheckpointerMode::InMemory,
            max_per_thread,
        )
    }

    pub fn mode(&self) -> CheckpointerMode {
        self.mode
    }

    pub fn manager(&self) -> &CheckpointManager {
        &self.manager
    }

    /// Whether both handles point at the same underlying checkpointer.
    pub fn same_instance(&self, other: &CheckpointerHandle) -> bool {
        Arc::ptr_eq(&self.manager, &other.manager)
    }
}

impl fmt::Debug for CheckpointerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckpointerHandle")
            .field("mode", &self.mode)
            .field("backend", &self.manager.backend())
            .finish()
    }
}

enum UriSource {
    Env(String),
    Fixed(Option<String>),
}

/// Lazily creates the single checkpointer handle.
pub struct CheckpointerProvider {
    source: UriSource,
    max_per_thread: usize,
    cell: OnceCell<CheckpointerHandle>,
}

impl CheckpointerProvider {
    /// Read the connection string from the environment variable named in
    /// config, on first use.
    pub fn from_config(config: &CheckpointConfig) -> Self {
        Self {
            source: UriSource::Env(config.db_uri_env.clone()),
            max_per_thread: config.max_checkpoints_per_thread,
            cell: OnceCell::new(),
        }
    }

    /// Use a fixed connection string. `None` means in-memory.
    pub fn with_uri(db_uri: Option<String>, max_per_thread: usize) -> Self {
        Self {
            source: UriSource::Fixed(db_uri),
            max_per_thread,
            cell: OnceCell::new(),
        }
    }

    /// Return the process checkpointer, creating it on first call.
    ///
    /// Never fails: an unreachable durable backend degrades to memory.
    pub async fn get_or_create(&self) -> CheckpointerHandle {
        self.cell.get_or_init(|| self.connect()).await.clone()
    }

    /// The handle, if already created.
    pub fn get(&self) -> Option<&CheckpointerHandle> {
        self.cell.get()
    }

    async fn connect(&self) -> CheckpointerHandle {
        let uri = match &self.source {
            UriSource::Env(var) => std::env::var(var).ok(),
            UriSource::Fixed(uri) => uri.clone(),
        }
        .filter(|uri| !uri.trim().is_empty());

        let Some(uri) = uri else {
            warn!("No checkpoint connection string configured, using in-memory checkpointer");
            return CheckpointerHandle::in_memory(self.max_per_thread);
        };

        match open_durable(&uri).await {
            Ok(store) => {
                info!(backend = store.backend(), "Durable checkpointer ready");
                CheckpointerHandle::new(store, CheckpointerMode::Durable, self.max_per_thread)
            }
            Err(e) => {
                warn!(
                    "Failed to initialize durable checkpointer ({}), falling back to in-memory",
                    e
                );
                CheckpointerHandle::in_memory(self.max_per_thread)
            }
        }
    }
}

/// Open the durable store for a connection string and run schema setup.
pub async fn open_durable(uri: &str) -> Result<Arc<dyn CheckpointStore>, CheckpointError> {
    let store = match DbUri::parse(uri) {
        DbUri::SqliteFile(path) => SqliteCheckpointStore::open(path).await?,
        DbUri::SqliteMemory => SqliteCheckpointStore::in_memory().await?,
        DbUri::Unsupported { scheme } => return Err(CheckpointError::UnsupportedBackend(scheme)),
    };
    store.setup().await?;
    Ok(Arc::new(store))
}
