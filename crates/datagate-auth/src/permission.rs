//! Permission set.

use serde::{Deserialize, Serialize};

/// An operation class an invocation can require.
///
/// The set is closed: engines map each prepared invocation to exactly one
/// permission, and roles grant subsets of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Inspect dataset metadata and definitions.
    AccessMetadata,
    /// Run read-only queries.
    InvokeQuery,
    /// Run mutating updates.
    InvokeUpdate,
}

impl Permission {
    /// Returns the stable snake_case name used in logs and wire formats.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::AccessMetadata => "access_metadata",
            Self::InvokeQuery => "invoke_query",
            Self::InvokeUpdate => "invoke_update",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_name() {
        assert_eq!(Permission::InvokeQuery.to_string(), "invoke_query");
        assert_eq!(Permission::AccessMetadata.name(), "access_metadata");
    }

    #[test]
    fn serde_uses_snake_case() {
        assert_eq!(
            serde_json::to_string(&Permission::InvokeUpdate).unwrap(),
            "\"invoke_update\""
        );
    }
}
