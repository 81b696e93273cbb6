//! Authorization contract and bundled policies.

use datagate_types::Principal;

use crate::error::AccessDenied;
use crate::permission::Permission;
use crate::role::Role;

/// Decides whether a principal may perform an operation.
///
/// The gateway consults the authorizer after an invocation is prepared
/// (so the required permission is known) and strictly before it executes:
/// an unauthorized command never reaches an engine.
///
/// # Audit logging
///
/// Implementations log every decision (allowed at `debug`, denied at
/// `warn`) so access decisions can be reconstructed from the log alone.
pub trait Authorizer: Send + Sync {
    /// Checks that `principal` holds `required`.
    ///
    /// # Errors
    ///
    /// Returns [`AccessDenied`] naming the principal and the missing
    /// permission.
    fn check(&self, principal: &Principal, required: Permission) -> Result<(), AccessDenied>;
}

/// Grants every principal the permissions of one fixed role.
///
/// Used when the gateway runs without per-client credentials: the
/// deployment decides how much the (effectively anonymous) public may do.
///
/// # Example
///
/// ```
/// use datagate_auth::{Authorizer, GrantedAuthorizer, Permission, Role};
/// use datagate_types::Principal;
///
/// let read_only = GrantedAuthorizer::with_role(Role::Read);
/// let anyone = Principal::anonymous();
///
/// assert!(read_only.check(&anyone, Permission::InvokeQuery).is_ok());
/// assert!(read_only.check(&anyone, Permission::InvokeUpdate).is_err());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct GrantedAuthorizer {
    role: Role,
}

impl GrantedAuthorizer {
    /// Creates an authorizer granting the permissions of `role`.
    #[must_use]
    pub fn with_role(role: Role) -> Self {
        Self { role }
    }

    /// The role every principal is granted.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }
}

impl Authorizer for GrantedAuthorizer {
    fn check(&self, principal: &Principal, required: Permission) -> Result<(), AccessDenied> {
        if self.role.grants(required) {
            tracing::debug!(
                principal = %principal,
                required = %required,
                role = %self.role,
                "authorized"
            );
            Ok(())
        } else {
            tracing::warn!(
                principal = %principal,
                required = %required,
                role = %self.role,
                "access denied"
            );
            Err(AccessDenied {
                principal: principal.clone(),
                required,
            })
        }
    }
}

/// Allows everything; for tests and fully trusted deployments.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermitAll;

impl Authorizer for PermitAll {
    fn check(&self, principal: &Principal, required: Permission) -> Result<(), AccessDenied> {
        tracing::debug!(principal = %principal, required = %required, "authorized (permit-all)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn granted_authorizer_follows_role() {
        let authorizer = GrantedAuthorizer::with_role(Role::Read);
        let client = Principal::named("alice");

        assert!(authorizer.check(&client, Permission::InvokeQuery).is_ok());
        let denied = authorizer
            .check(&client, Permission::InvokeUpdate)
            .unwrap_err();
        assert_eq!(denied.required, Permission::InvokeUpdate);
        assert_eq!(denied.principal, client);
    }

    #[test]
    fn none_role_denies_everything() {
        let authorizer = GrantedAuthorizer::with_role(Role::None);
        let anyone = Principal::anonymous();
        assert!(authorizer
            .check(&anyone, Permission::AccessMetadata)
            .is_err());
    }

    #[test]
    fn permit_all_always_allows() {
        let authorizer = PermitAll;
        assert!(authorizer
            .check(&Principal::anonymous(), Permission::InvokeUpdate)
            .is_ok());
    }
}
