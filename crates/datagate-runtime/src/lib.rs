//! Runtime of the datagate query gateway.
//!
//! This crate wires the contracts of `datagate-engine` into a working
//! pipeline: dynamic routing, background execution, lifecycle events and
//! the cancellation bridge towards the transport layer.
//!
//! # Request flow
//!
//! ```text
//! transport                      runtime                       engines
//!    │  Command                     │                             │
//!    │ ───────────► EventfulConnector ── received ─► Emitter      │
//!    │                 │                                          │
//!    │              ReactiveInvoker (on subscribe, on worker)     │
//!    │                 │  registry.select ──────────────────────► │
//!    │                 │  engine.prepare ───────────────────────► │
//!    │                 │  authorizer.check                        │
//!    │                 │  invocation.execute ───────────────────► │
//!    │   StreamedResults ◄─ executed event                        │
//!    │ ◄───────────────│                                          │
//!    │  write() on the transport thread ── completed/failed       │
//!    │                                                            │
//!    │  timeout │ disconnect │ completion                         │
//!    │ ────────────► AsyncListener ──► cancel, exactly once ────► │
//! ```
//!
//! # Modules
//!
//! - [`EngineRegistry`] / [`FixedSelection`]: resolve a command to the
//!   engine that should serve it, dynamically from deploy/undeploy
//!   notifications, or from a set fixed at startup.
//! - [`spawn_catalog_listener`]: the single consumer task feeding the
//!   registry from the dataset lifecycle channel.
//! - [`ReactiveInvoker`]: select → prepare → authorize → execute on the
//!   [`Scheduler`], yielding an at-most-one-result subscription.
//! - [`EventfulConnector`]: decorator adding the
//!   received/executed/completed/failed/rejected event sequence.
//! - [`AsyncListener`] / [`deliver`]: unify completion, disconnect and
//!   timeout into a single cancellation, resuming the transport's
//!   [`SuspendedResponse`].
//! - [`GatewaySettings`]: serde-backed runtime configuration.

mod bridge;
mod catalog;
mod config;
mod eventful;
mod execute;
mod fixed;
mod invoker;
mod registry;
mod scheduler;

pub use bridge::{deliver, AsyncListener, SuspendedResponse};
pub use catalog::{spawn_catalog_listener, CatalogEvent};
pub use config::{GatewaySettings, SettingsError};
pub use eventful::EventfulConnector;
pub use execute::{AbortHandle, Execution, Phase};
pub use fixed::{AmbiguousSelection, FixedSelection};
pub use invoker::ReactiveInvoker;
pub use registry::{EngineKey, EngineRegistry};
pub use scheduler::Scheduler;
