//! Store wiring from configuration.
//!
//! Picks the collection backend, applies the configured deadline and keeps
//! hold of the shared database connection so it can be closed at shutdown.

use std::sync::Arc;

use configs::{AppConfig, StorageBackend};
use models::db::SharedConnection;
use tracing::info;

use crate::storage::{local::LocalTodoCollection, seaorm::SeaOrmTodoCollection};
use crate::todos::{DynResourceStore, ResourceStore, TodoCollection};

pub struct StoreRuntime {
    pub store: DynResourceStore,
    connection: Option<Arc<SharedConnection>>,
}

impl StoreRuntime {
    /// Build the store for `cfg`. The database is not contacted until the first operation.
    pub async fn open(cfg: &AppConfig) -> anyhow::Result<Self> {
        let mut connection = None;
        let collection: Arc<dyn TodoCollection> = match cfg.storage.backend {
            StorageBackend::Postgres => {
                let conn = Arc::new(SharedConnection::new(cfg.database.clone()));
                connection = Some(Arc::clone(&conn));
                Arc::new(SeaOrmTodoCollection::new(conn))
            }
            StorageBackend::File => Arc::new(LocalTodoCollection::open(&cfg.storage.file_path).await?),
            StorageBackend::Memory => Arc::new(LocalTodoCollection::in_memory()),
        };
        Ok(Self::from_collection(collection, cfg.store.op_timeout(), connection, cfg.storage.backend))
    }

    fn from_collection(
        collection: Arc<dyn TodoCollection>,
        timeout: Option<std::time::Duration>,
        connection: Option<Arc<SharedConnection>>,
        backend: StorageBackend,
    ) -> Self {
        let base = ResourceStore::new(collection);
        let store = match timeout {
            Some(limit) => base.with_timeout(limit),
            None => base,
        };
        info!(?backend, ?timeout, "todo store ready");
        Self { store, connection }
    }

    /// Close the shared database connection, if any. Safe to call more than once.
    pub async fn shutdown(&self) -> anyhow::Result<()> {
        if let Some(conn) = &self.connection {
            conn.shutdown().await?;
        }
        Ok(())
    }
}
