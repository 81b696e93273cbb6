//! Fixed engine selection for single-tenant deployments.

use std::collections::HashMap;
use std::sync::Arc;

use datagate_engine::{Command, Engine, EngineRouter, GatewayError};
use datagate_types::Language;
use thiserror::Error;
use tracing::debug;

/// Router over a set of engines resolved once at startup.
///
/// Used when multi-tenancy is disabled: the gateway serves a single
/// dataset, so routing only dispatches on language and ignores the
/// command's schema. Construction rejects ambiguous sets (two engines
/// declaring the same language) before any request can be routed.
///
/// # Example
///
/// ```
/// use datagate_engine::testing::StubEngine;
/// use datagate_engine::{Command, Engine, EngineRouter};
/// use datagate_runtime::FixedSelection;
/// use datagate_types::Language;
/// use std::sync::Arc;
///
/// let selection = FixedSelection::from_engines([
///     Arc::new(StubEngine::new(Language::Sql)) as Arc<dyn Engine>,
///     Arc::new(StubEngine::new(Language::Sparql)) as Arc<dyn Engine>,
/// ])
/// .unwrap();
///
/// let command = Command::builder()
///     .language(Language::Sparql)
///     .schema_name("default")
///     .build();
/// assert!(selection.select(&command).is_ok());
/// ```
pub struct FixedSelection {
    engines: HashMap<Language, Arc<dyn Engine>>,
}

impl FixedSelection {
    /// Indexes the given engines by language.
    ///
    /// # Errors
    ///
    /// Fails with [`AmbiguousSelection`] if two engines declare the same
    /// language.
    pub fn from_engines(
        engines: impl IntoIterator<Item = Arc<dyn Engine>>,
    ) -> Result<Self, AmbiguousSelection> {
        let mut index: HashMap<Language, Arc<dyn Engine>> = HashMap::new();
        for engine in engines {
            let language = engine.language();
            if index.insert(language, engine).is_some() {
                return Err(AmbiguousSelection(language));
            }
        }
        Ok(Self { engines: index })
    }

    /// The languages this selection can route.
    #[must_use]
    pub fn languages(&self) -> Vec<Language> {
        self.engines.keys().copied().collect()
    }
}

impl EngineRouter for FixedSelection {
    fn select(&self, command: &Command) -> Result<Arc<dyn Engine>, GatewayError> {
        let language = command.language()?;
        match self.engines.get(&language) {
            Some(engine) => {
                debug!(language = %language, "engine selected from fixed set");
                Ok(engine.clone())
            }
            None => Err(GatewayError::LanguageNotSupported {
                schema: command.schema()?,
                language,
            }),
        }
    }
}

impl std::fmt::Debug for FixedSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixedSelection")
            .field("languages", &self.languages())
            .finish()
    }
}

/// Two engines in a fixed set declared the same language; routing would
/// be ambiguous. Raised at construction, before any request is served.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("two engines declare language '{0}', routing would be ambiguous")]
pub struct AmbiguousSelection(pub Language);

#[cfg(test)]
mod tests {
    use datagate_engine::testing::StubEngine;

    use super::*;

    fn engine(language: Language) -> Arc<dyn Engine> {
        Arc::new(StubEngine::new(language))
    }

    fn command(language: Language) -> Command {
        Command::builder()
            .language(language)
            .schema_name("default")
            .build()
    }

    #[test]
    fn duplicate_language_fails_at_construction() {
        let result =
            FixedSelection::from_engines([engine(Language::Sql), engine(Language::Sql)]);
        assert_eq!(result.err(), Some(AmbiguousSelection(Language::Sql)));
    }

    #[test]
    fn selects_by_language() {
        let sql = engine(Language::Sql);
        let selection =
            FixedSelection::from_engines([sql.clone(), engine(Language::Sparql)]).unwrap();

        let selected = selection.select(&command(Language::Sql)).unwrap();
        assert!(Arc::ptr_eq(&selected, &sql));
    }

    #[test]
    fn unknown_language_is_not_supported() {
        let selection = FixedSelection::from_engines([engine(Language::Sql)]).unwrap();
        assert!(matches!(
            selection.select(&command(Language::Sparql)),
            Err(GatewayError::LanguageNotSupported {
                language: Language::Sparql,
                ..
            })
        ));
    }

    #[test]
    fn empty_selection_supports_nothing() {
        let selection = FixedSelection::from_engines(Vec::<Arc<dyn Engine>>::new()).unwrap();
        assert!(selection.languages().is_empty());
        assert!(selection.select(&command(Language::Sql)).is_err());
    }
}
