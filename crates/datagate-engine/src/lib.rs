//! Contracts of the datagate query gateway.
//!
//! This crate defines everything an execution backend or a transport
//! layer needs to interoperate with the gateway, and nothing of the
//! runtime that wires them together:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Contract Layer (THIS CRATE)               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Command / CommandBuilder : immutable request descriptor    │
//! │  Engine / Invocation      : backend capability contract     │
//! │  EngineRouter             : (schema, language) → Engine     │
//! │  Connector / Submission   : accept(Command) → lazy outcome  │
//! │  StreamedResults          : write-once result handle        │
//! │  GatewayError             : one taxonomy across all layers  │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓ implemented / driven by
//! ┌─────────────────────────────────────────────────────────────┐
//! │  datagate-runtime : registry, invoker, events, bridge       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Request shape
//!
//! A transport builds a [`Command`] (or an invalid one carrying the
//! parse failure), hands it to a [`Connector`], subscribes to the
//! returned [`Submission`] and awaits at most one [`StreamedResults`].
//! Cancellation (timeout, disconnect) travels back through the
//! [`SubscriptionHandle`] and reaches the engine as a [`CancelToken`]
//! it polls during `execute`/`write`.

mod command;
mod connector;
mod contract;
mod error;
mod results;
pub mod testing;

pub use command::{Command, CommandBuilder, Properties, KEY_LANGUAGE, KEY_SCHEMA};
pub use connector::{Connector, Outcome, Submission, Subscription, SubscriptionHandle};
pub use contract::{CancelToken, Engine, EngineRouter, Invocation};
pub use error::GatewayError;
pub use results::StreamedResults;
