//! Query language tags.

use serde::{Deserialize, Serialize};

/// The payload language of a command.
///
/// Routing treats the language as an opaque tag: an engine declares the
/// one language it serves, and the router matches commands against the
/// deployed engines. Unrecognized spellings map to [`Language::Unknown`]
/// instead of failing, so a request for an unsupported protocol surfaces
/// as a routing error (with context) rather than a parse error.
///
/// # Example
///
/// ```
/// use datagate_types::Language;
///
/// assert_eq!(Language::parse("SQL"), Language::Sql);
/// assert_eq!(Language::parse("sparql"), Language::Sparql);
/// assert_eq!(Language::parse("graphql"), Language::Unknown);
/// assert_eq!(Language::Sql.to_string(), "sql");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Relational queries and updates.
    Sql,
    /// Triple-store queries and updates.
    Sparql,
    /// Anything the gateway does not recognize.
    Unknown,
}

impl Language {
    /// Parses a language tag, case-insensitively.
    ///
    /// Never fails; unrecognized input yields [`Language::Unknown`].
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "sql" => Self::Sql,
            "sparql" => Self::Sparql,
            _ => Self::Unknown,
        }
    }

    /// Returns the canonical lowercase name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sql => "sql",
            Self::Sparql => "sparql",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
