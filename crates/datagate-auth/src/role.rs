//! Role set and its permission grants.

use serde::{Deserialize, Serialize};

use crate::permission::Permission;

/// A grant bundle assigned to a class of clients.
///
/// | Role | Grants |
/// |------|--------|
/// | `None` | nothing |
/// | `Read` | metadata + queries |
/// | `Full` | metadata + queries + updates |
/// | `Admin` | everything `Full` grants |
///
/// # Example
///
/// ```
/// use datagate_auth::{Permission, Role};
///
/// assert!(Role::Read.grants(Permission::InvokeQuery));
/// assert!(!Role::Read.grants(Permission::InvokeUpdate));
/// assert!(Role::Full.grants(Permission::InvokeUpdate));
/// assert_eq!(Role::None.permissions(), &[]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// No access at all.
    None,
    /// Read-only access.
    Read,
    /// Read and write access.
    Full,
    /// Full access plus administrative operations.
    Admin,
}

impl Role {
    /// The permissions this role expands to.
    #[must_use]
    pub fn permissions(&self) -> &'static [Permission] {
        match self {
            Self::None => &[],
            Self::Read => &[Permission::AccessMetadata, Permission::InvokeQuery],
            Self::Full | Self::Admin => &[
                Permission::AccessMetadata,
                Permission::InvokeQuery,
                Permission::InvokeUpdate,
            ],
        }
    }

    /// Returns `true` if this role grants the given permission.
    #[must_use]
    pub fn grants(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }

    /// Returns the lowercase role name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Read => "read",
            Self::Full => "full",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "read" => Ok(Self::Read),
            "full" => Ok(Self::Full),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_is_read_only() {
        assert!(Role::Read.grants(Permission::AccessMetadata));
        assert!(Role::Read.grants(Permission::InvokeQuery));
        assert!(!Role::Read.grants(Permission::InvokeUpdate));
    }

    #[test]
    fn full_and_admin_grant_updates() {
        assert!(Role::Full.grants(Permission::InvokeUpdate));
        assert!(Role::Admin.grants(Permission::InvokeUpdate));
    }

    #[test]
    fn none_grants_nothing() {
        assert!(Role::None.permissions().is_empty());
        assert!(!Role::None.grants(Permission::AccessMetadata));
    }

    #[test]
    fn parse_round_trip() {
        for role in [Role::None, Role::Read, Role::Full, Role::Admin] {
            assert_eq!(role.name().parse::<Role>().unwrap(), role);
        }
        assert!("root".parse::<Role>().is_err());
    }
}
