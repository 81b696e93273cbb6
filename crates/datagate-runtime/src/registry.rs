//! Dynamic engine registry.

use std::collections::HashMap;
use std::sync::Arc;

use datagate_engine::{Command, Engine, EngineRouter, GatewayError};
use datagate_types::{Language, SchemaId};
use parking_lot::RwLock;
use tracing::{debug, info};

/// Registry lookup key: one deployed engine per (schema, language) pair.
///
/// Equality is structural.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EngineKey {
    /// The deployed dataset.
    pub schema: SchemaId,
    /// The language the engine serves.
    pub language: Language,
}

/// Concurrent map from (schema, language) to the currently deployed
/// engine.
///
/// Mutated by dataset lifecycle notifications, directly via
/// [`on_deploy`](Self::on_deploy)/[`on_drop`](Self::on_drop) or through
/// the [catalog listener](crate::spawn_catalog_listener), and read by
/// every `select`. Reads take a shared lock, so deploys never interrupt
/// an in-flight selection; the map holds `Arc<dyn Engine>` so a selected
/// engine stays usable even if its entry is replaced mid-request.
///
/// The registry never closes engines: replaced or dropped entries are
/// simply forgotten, and tearing the engine down remains the dataset
/// owner's responsibility.
///
/// # Example
///
/// ```
/// use datagate_engine::testing::StubEngine;
/// use datagate_engine::{Command, Engine, EngineRouter};
/// use datagate_runtime::EngineRegistry;
/// use datagate_types::Language;
/// use std::sync::Arc;
///
/// let registry = EngineRegistry::new();
/// let schema = "default".parse().unwrap();
/// let engine: Arc<dyn Engine> = Arc::new(StubEngine::new(Language::Sql));
/// registry.on_deploy(&schema, [engine]);
///
/// let command = Command::builder()
///     .language(Language::Sql)
///     .schema(&schema)
///     .build();
/// assert!(registry.select(&command).is_ok());
/// ```
#[derive(Default)]
pub struct EngineRegistry {
    entries: RwLock<HashMap<EngineKey, Arc<dyn Engine>>>,
}

impl EngineRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs every `(schema, engine.language())` mapping for a newly
    /// deployed dataset, atomically replacing mappings that already
    /// exist for the same key.
    pub fn on_deploy(&self, schema: &SchemaId, engines: impl IntoIterator<Item = Arc<dyn Engine>>) {
        let mut entries = self.entries.write();
        for engine in engines {
            let key = EngineKey {
                schema: schema.clone(),
                language: engine.language(),
            };
            info!(schema = %key.schema, language = %key.language, "engine deployed");
            entries.insert(key, engine);
        }
    }

    /// Removes every mapping of the dropped dataset; subsequent selects
    /// for it fail with schema-not-found.
    pub fn on_drop(&self, schema: &SchemaId) {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|key, _| &key.schema != schema);
        info!(
            schema = %schema,
            removed = before - entries.len(),
            "dataset dropped from registry"
        );
    }

    /// Number of installed (schema, language) mappings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if nothing is deployed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl EngineRouter for EngineRegistry {
    fn select(&self, command: &Command) -> Result<Arc<dyn Engine>, GatewayError> {
        let schema = command.schema()?;
        let language = command.language()?;
        let key = EngineKey {
            schema,
            language,
        };

        let entries = self.entries.read();
        if let Some(engine) = entries.get(&key) {
            debug!(schema = %key.schema, language = %key.language, "engine selected");
            return Ok(engine.clone());
        }
        if entries.keys().any(|candidate| candidate.schema == key.schema) {
            Err(GatewayError::LanguageNotSupported {
                schema: key.schema,
                language: key.language,
            })
        } else {
            Err(GatewayError::SchemaNotFound(key.schema))
        }
    }
}

impl std::fmt::Debug for EngineRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineRegistry")
            .field("entries", &self.len())
            .finish()
    }
}
