//! Principal (request owner) identity.
//!
//! A [`Principal`] records *who* issued a command, separate from what
//! they are allowed to do. Permission checking lives in `datagate-auth`;
//! this type is pure identity so engine implementations can depend on it
//! without pulling in authorization logic.

use serde::{Deserialize, Serialize};

/// The identity of the client that issued a command.
///
/// Requests arriving without credentials (or before any access control is
/// configured) carry the [`Anonymous`](Self::Anonymous) sentinel instead
/// of an absent value, so every command has an owner and audit logs never
/// have to special-case a missing one.
///
/// Equality is structural: two named principals are the same actor iff
/// their names match.
///
/// # Example
///
/// ```
/// use datagate_types::Principal;
///
/// let admin = Principal::named("admin");
/// assert_eq!(admin.name_or("anonymous"), "admin");
/// assert!(!admin.is_anonymous());
///
/// let nobody = Principal::anonymous();
/// assert!(nobody.is_anonymous());
/// assert_eq!(nobody.name_or("anonymous"), "anonymous");
/// assert_eq!(nobody.to_string(), "anonymous");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Principal {
    /// An authenticated client, identified by name.
    Named(String),
    /// The sentinel for requests without a known identity.
    Anonymous,
}

impl Principal {
    /// Creates a named principal.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Returns the anonymous sentinel.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::Anonymous
    }

    /// Returns `true` for the anonymous sentinel.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }

    /// Returns the principal's name, or the given fallback when
    /// anonymous.
    #[must_use]
    pub fn name_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self {
            Self::Named(name) => name,
            Self::Anonymous => fallback,
        }
    }

    /// Returns this principal, or the given fallback when anonymous.
    #[must_use]
    pub fn or_if_anonymous(self, fallback: Self) -> Self {
        if self.is_anonymous() {
            fallback
        } else {
            self
        }
    }
}

impl Default for Principal {
    /// Defaults to the anonymous sentinel.
    fn default() -> Self {
        Self::Anonymous
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name_or("anonymous"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_principal() {
        let principal = Principal::named("alice");
        assert!(!principal.is_anonymous());
        assert_eq!(principal.name_or("fallback"), "alice");
        assert_eq!(principal.to_string(), "alice");
    }

    #[test]
    fn anonymous_sentinel() {
        let principal = Principal::anonymous();
        assert!(principal.is_anonymous());
        assert_eq!(principal.name_or("fallback"), "fallback");
        assert_eq!(principal.to_string(), "anonymous");
    }

    #[test]
    fn fallback_combinator() {
        let fallback = Principal::named("service");
        assert_eq!(
            Principal::anonymous().or_if_anonymous(fallback.clone()),
            fallback
        );
        let named = Principal::named("bob");
        assert_eq!(named.clone().or_if_anonymous(fallback), named);
    }

    #[test]
    fn structural_equality() {
        assert_eq!(Principal::named("x"), Principal::named("x"));
        assert_ne!(Principal::named("x"), Principal::named("y"));
        assert_ne!(Principal::named("anonymous"), Principal::anonymous());
    }
}
