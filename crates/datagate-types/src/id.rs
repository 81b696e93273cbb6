//! Identifier types for the gateway.
//!
//! [`SchemaId`] names a deployed dataset; [`Correlation`] ties together
//! all events recorded for a single request.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::error::ErrorCode;

/// Identifier of a deployed dataset.
///
/// Schema ids are case-insensitive; construction normalizes them to
/// lowercase so `"Public"` and `"public"` address the same dataset.
/// A valid id is non-empty and consists of ASCII alphanumerics, `-` and
/// `_` only, keeping it safe for use in URLs and log output.
///
/// # Example
///
/// ```
/// use datagate_types::SchemaId;
///
/// let id: SchemaId = "Warehouse".parse().unwrap();
/// assert_eq!(id.as_str(), "warehouse");
/// assert_eq!(id, "warehouse".parse().unwrap());
///
/// assert!("".parse::<SchemaId>().is_err());
/// assert!("no spaces".parse::<SchemaId>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaId(String);

impl SchemaId {
    /// Parses and normalizes a schema id.
    ///
    /// # Errors
    ///
    /// Fails if the input is empty or contains characters other than
    /// ASCII alphanumerics, `-` and `_`.
    pub fn parse(raw: &str) -> Result<Self, InvalidSchemaId> {
        if raw.is_empty() {
            return Err(InvalidSchemaId::Empty);
        }
        if !raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(InvalidSchemaId::IllegalCharacter(raw.to_string()));
        }
        Ok(Self(raw.to_ascii_lowercase()))
    }

    /// Returns the normalized id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for SchemaId {
    type Err = InvalidSchemaId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for SchemaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rejected schema id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidSchemaId {
    /// The id was empty.
    #[error("schema id must not be empty")]
    Empty,

    /// The id contained a character outside `[A-Za-z0-9_-]`.
    #[error("schema id '{0}' contains illegal characters")]
    IllegalCharacter(String),
}

impl ErrorCode for InvalidSchemaId {
    fn code(&self) -> &'static str {
        match self {
            Self::Empty => "SCHEMA_ID_EMPTY",
            Self::IllegalCharacter(_) => "SCHEMA_ID_ILLEGAL_CHARACTER",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}

/// Correlation id shared by all events of a single request.
///
/// # Example
///
/// ```
/// use datagate_types::Correlation;
///
/// let one = Correlation::new();
/// let two = Correlation::new();
/// assert_ne!(one, two);
/// assert!(one.to_string().starts_with("corr:"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Correlation(Uuid);

#[allow(clippy::new_without_default)] // a fresh correlation is an explicit act, see EventReporter
impl Correlation {
    /// Creates a new random correlation id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner UUID.
    #[must_use]
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for Correlation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "corr:{}", self.0)
    }
}
