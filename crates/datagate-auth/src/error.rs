//! Authorization errors.

use datagate_types::{ErrorCode, Principal};
use thiserror::Error;

use crate::permission::Permission;

/// The principal does not hold the permission an invocation requires.
///
/// Carried as a value through the pipeline, so it is `Clone` and keeps
/// only what the transport needs to render a forbidden response: who was
/// denied and which permission was missing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{principal}' lacks permission '{required}'")]
pub struct AccessDenied {
    /// Who was denied.
    pub principal: Principal,
    /// The permission the invocation required.
    pub required: Permission,
}

impl ErrorCode for AccessDenied {
    fn code(&self) -> &'static str {
        "ACCESS_DENIED"
    }

    fn is_recoverable(&self) -> bool {
        // retrying cannot grant a missing permission
        false
    }
}
