//! Lifecycle events for the datagate query gateway.
//!
//! Every request travelling through the gateway produces a small stream
//! of [`Event`]s consumed by an observability sink:
//!
//! ```text
//!                    ┌──────────────────────┐
//!   Command ───────► │  EventfulConnector   │ ───► results
//!                    │  (datagate-runtime)  │
//!                    └──────────┬───────────┘
//!                               │ Event { subject, correlation, .. }
//!                               ▼
//!                    ┌──────────────────────┐
//!                    │   Emitter (trait)    │
//!                    ├──────────────────────┤
//!                    │ TracingEmitter       │  → structured log
//!                    │ BroadcastEmitter     │  → live observers
//!                    │ NullEmitter          │  → discarded
//!                    └──────────────────────┘
//! ```
//!
//! # Ordering guarantees
//!
//! For one request, [`Subject::Received`] precedes everything else,
//! [`Subject::Executed`] precedes [`Subject::Completed`], and exactly one
//! terminal subject (`Completed`, `Failed` or `Rejected`) closes the
//! stream. Events of concurrent requests interleave freely; the shared
//! [`Correlation`](datagate_types::Correlation) id is what groups them.
//!
//! # Emission is best-effort
//!
//! An [`Emitter`] must never fail the request it reports on: emission is
//! non-blocking and errors inside a sink are swallowed (or logged) by the
//! sink itself.

mod emitter;
mod event;
mod report;
pub mod testing;

pub use emitter::{BroadcastEmitter, Emitter, NullEmitter, TracingEmitter};
pub use event::{Event, Subject};
pub use report::EventReporter;
