//! Core types for the datagate query gateway.
//!
//! This crate provides the foundational value types shared by every layer
//! of the gateway.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Contract Layer                            │
//! │  (stable, safe for engine implementations to depend on)     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  datagate-types  : SchemaId, Language, MediaType,  ◄── HERE │
//! │                    Principal, Correlation, Timeout          │
//! │  datagate-event  : Event, Subject, Emitter                  │
//! │  datagate-auth   : Permission, Role, Authorizer             │
//! │  datagate-engine : Command, Engine, Invocation, Connector   │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Runtime Layer                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  datagate-runtime : registry, router, invoker, bridge       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Identifier Design
//!
//! A request targets a dataset ([`SchemaId`]) in a payload [`Language`],
//! on behalf of a [`Principal`]. All events recorded for one request share
//! a [`Correlation`] id, which is UUID-based so it stays unique across
//! processes without coordination.
//!
//! # Example
//!
//! ```
//! use datagate_types::{Correlation, Language, MediaType, Principal, SchemaId};
//!
//! let schema: SchemaId = "Public".parse().unwrap();
//! assert_eq!(schema.as_str(), "public"); // normalized
//!
//! let language = Language::parse("sparql");
//! assert_eq!(language, Language::Sparql);
//!
//! let accept = MediaType::new("application", "sparql-results+json");
//! assert_eq!(accept.to_string(), "application/sparql-results+json");
//!
//! let owner = Principal::anonymous();
//! assert!(owner.is_anonymous());
//!
//! let correlation = Correlation::new();
//! println!("correlating as {correlation}");
//! ```

mod error;
mod id;
mod language;
mod media;
mod principal;
mod timeout;

pub use error::{assert_error_code, assert_error_codes, ErrorCode};
pub use id::{Correlation, InvalidSchemaId, SchemaId};
pub use language::Language;
pub use media::{InvalidMediaType, MediaType};
pub use principal::Principal;
pub use timeout::Timeout;
