//! Media type value type.
//!
//! Engines declare the media type of their serialized results, and
//! commands carry the client's accepted types in preference order. Only
//! the selected type crosses the gateway boundary; content negotiation
//! itself happens in the transport layer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A `type/subtype` media type pair.
///
/// Parameters (e.g. `;charset=utf-8`) are not modelled; the gateway only
/// matches on the essence. `*` is allowed in either position for the
/// wildcard forms used in `Accept` headers.
///
/// # Example
///
/// ```
/// use datagate_types::MediaType;
///
/// let json = MediaType::new("application", "json");
/// let any_app: MediaType = "application/*".parse().unwrap();
///
/// assert!(json.compatible(&any_app));
/// assert!(any_app.compatible(&json));
/// assert_eq!(json.to_string(), "application/json");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MediaType {
    kind: String,
    subtype: String,
}

impl MediaType {
    /// Creates a media type from its two components, normalized to
    /// lowercase.
    #[must_use]
    pub fn new(kind: impl Into<String>, subtype: impl Into<String>) -> Self {
        Self {
            kind: kind.into().to_ascii_lowercase(),
            subtype: subtype.into().to_ascii_lowercase(),
        }
    }

    /// The wildcard media type `*/*`.
    #[must_use]
    pub fn any() -> Self {
        Self::new("*", "*")
    }

    /// Parses a `type/subtype` string.
    ///
    /// # Errors
    ///
    /// Fails unless the input is exactly two non-empty components
    /// separated by a single `/`.
    pub fn parse(raw: &str) -> Result<Self, InvalidMediaType> {
        let mut parts = raw.splitn(2, '/');
        match (parts.next(), parts.next()) {
            (Some(kind), Some(subtype)) if !kind.is_empty() && !subtype.is_empty() => {
                // strip any parameter section, the gateway matches on essence only
                let subtype = subtype.split(';').next().unwrap_or(subtype).trim();
                if subtype.is_empty() {
                    return Err(InvalidMediaType(raw.to_string()));
                }
                Ok(Self::new(kind, subtype))
            }
            _ => Err(InvalidMediaType(raw.to_string())),
        }
    }

    /// The primary type, e.g. `application`.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The subtype, e.g. `sparql-results+json`.
    #[must_use]
    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    /// Checks compatibility, honoring `*` wildcards on either side.
    #[must_use]
    pub fn compatible(&self, other: &Self) -> bool {
        fn matches(a: &str, b: &str) -> bool {
            a == "*" || b == "*" || a == b
        }
        matches(&self.kind, &other.kind) && matches(&self.subtype, &other.subtype)
    }
}

impl std::str::FromStr for MediaType {
    type Err = InvalidMediaType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.kind, self.subtype)
    }
}

impl TryFrom<String> for MediaType {
    type Error = InvalidMediaType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MediaType> for String {
    fn from(value: MediaType) -> Self {
        value.to_string()
    }
}

/// Rejected media type string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a valid type/subtype media type")]
pub struct InvalidMediaType(pub String);
