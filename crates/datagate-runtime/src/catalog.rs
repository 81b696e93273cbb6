//! Dataset lifecycle notifications.
//!
//! The provisioning subsystem announces deploys and teardowns over a
//! channel; a single consumer task applies them to the
//! [`EngineRegistry`]. Serializing all notifications through one task
//! means concurrent announcements for different schemas need no
//! per-key locking, and the registry's replace-on-redeploy stays a plain
//! map write.

use std::sync::Arc;

use datagate_engine::Engine;
use datagate_types::SchemaId;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::registry::EngineRegistry;

/// A dataset lifecycle notification.
pub enum CatalogEvent {
    /// A dataset finished provisioning with the given engines.
    Deployed {
        /// The dataset's schema id.
        schema: SchemaId,
        /// One engine per supported language.
        engines: Vec<Arc<dyn Engine>>,
    },
    /// A dataset was torn down.
    Dropped {
        /// The dataset's schema id.
        schema: SchemaId,
    },
}

impl std::fmt::Debug for CatalogEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deployed { schema, engines } => f
                .debug_struct("Deployed")
                .field("schema", schema)
                .field("engines", &engines.len())
                .finish(),
            Self::Dropped { schema } => {
                f.debug_struct("Dropped").field("schema", schema).finish()
            }
        }
    }
}

impl EngineRegistry {
    /// Applies one catalog notification.
    pub fn apply(&self, event: CatalogEvent) {
        match event {
            CatalogEvent::Deployed { schema, engines } => self.on_deploy(&schema, engines),
            CatalogEvent::Dropped { schema } => self.on_drop(&schema),
        }
    }
}

/// Spawns the single consumer task feeding `registry` from `notifications`.
///
/// The task ends when every sender is dropped; the registry keeps its
/// last state.
///
/// # Example
///
/// ```
/// use datagate_engine::testing::StubEngine;
/// use datagate_runtime::{spawn_catalog_listener, CatalogEvent, EngineRegistry};
/// use datagate_types::Language;
/// use std::sync::Arc;
/// use tokio::sync::mpsc;
///
/// # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
/// let registry = Arc::new(EngineRegistry::new());
/// let (tx, rx) = mpsc::channel(8);
/// let listener = spawn_catalog_listener(registry.clone(), rx);
///
/// tx.send(CatalogEvent::Deployed {
///     schema: "default".parse().unwrap(),
///     engines: vec![Arc::new(StubEngine::new(Language::Sql)) as Arc<dyn datagate_engine::Engine>],
/// })
/// .await
/// .unwrap();
///
/// drop(tx);
/// listener.await.unwrap();
/// assert_eq!(registry.len(), 1);
/// # });
/// ```
pub fn spawn_catalog_listener(
    registry: Arc<EngineRegistry>,
    mut notifications: mpsc::Receiver<CatalogEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = notifications.recv().await {
            debug!(event = ?event, "catalog notification");
            registry.apply(event);
        }
        info!("catalog notification channel closed");
    })
}
