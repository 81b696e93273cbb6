//! Authorization primitives for the datagate query gateway.
//!
//! This crate sits beside `datagate-event` in the dependency graph and
//! defines *what may be done by whom*, without knowing anything about
//! engines or transports:
//!
//! ```text
//! datagate-types  (SchemaId, Principal)
//!     ↑               ↑
//! datagate-event   datagate-auth  ◄── THIS CRATE
//! (Event, Emitter) (Permission, Role, Authorizer)
//!     ↑               ↑
//!     datagate-engine (Invocation::requires → Permission)
//!           ↑
//!     datagate-runtime (checks before every execution)
//! ```
//!
//! # Model
//!
//! [`Permission`] is the closed set of operations an invocation can
//! require. [`Role`] is the closed set of grant bundles a deployment
//! assigns to clients; each role expands to a static permission set.
//! The [`Authorizer`] decides whether the principal behind a command
//! holds the permission its prepared invocation requires, always
//! *before* the invocation executes.
//!
//! # Example
//!
//! ```
//! use datagate_auth::{Authorizer, GrantedAuthorizer, Permission, Role};
//! use datagate_types::Principal;
//!
//! let authorizer = GrantedAuthorizer::with_role(Role::Read);
//! let client = Principal::named("alice");
//!
//! assert!(authorizer.check(&client, Permission::InvokeQuery).is_ok());
//! assert!(authorizer.check(&client, Permission::InvokeUpdate).is_err());
//! ```

mod authorizer;
mod error;
mod permission;
mod role;

pub use authorizer::{Authorizer, GrantedAuthorizer, PermitAll};
pub use error::AccessDenied;
pub use permission::Permission;
pub use role::Role;

// Re-export for implementor convenience
pub use datagate_types::Principal;
