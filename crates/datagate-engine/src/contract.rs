//! Engine and invocation contracts.
//!
//! An [`Engine`] is a pluggable backend serving one query language for
//! one dataset; [`Engine::prepare`] turns a [`Command`] into a
//! single-use [`Invocation`]. The runtime drives every invocation
//! through the same life cycle:
//!
//! ```text
//! prepare ──► execute ──► write ──► close
//!                │           │
//!                └── cancel ─┘   (cooperative, via CancelToken)
//! ```
//!
//! `execute` and `write` are blocking calls; the runtime schedules them
//! on a background worker, never on the transport thread. Both receive a
//! [`CancelToken`] and must poll it during long-running work so a
//! concurrent cancellation terminates them with
//! [`GatewayError::Cancelled`] instead of letting them run to
//! completion unobserved.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use datagate_auth::Permission;
use datagate_types::{Language, MediaType};

use crate::command::Command;
use crate::error::GatewayError;

/// Cooperative cancellation signal for one invocation.
///
/// The runtime creates the token, hands it to
/// [`Invocation::execute`]/[`Invocation::write`], and cancels it when the
/// request is unsubscribed. Cancelling is idempotent and safe from any
/// thread; it is a signal, not a guarantee of immediate termination:
/// engines decide how often they poll.
///
/// # Example
///
/// ```
/// use datagate_engine::CancelToken;
///
/// let token = CancelToken::new();
/// let observer = token.clone();
///
/// assert!(!observer.is_cancelled());
/// token.cancel();
/// token.cancel(); // idempotent
/// assert!(observer.is_cancelled());
/// assert!(observer.bail_if_cancelled().is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a fresh, uncancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals cancellation to every clone of this token.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Returns `true` once any clone has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Polling helper for engine inner loops.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Cancelled`] once the token is cancelled.
    pub fn bail_if_cancelled(&self) -> Result<(), GatewayError> {
        if self.is_cancelled() {
            Err(GatewayError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// A pluggable execution backend for one query language.
///
/// Engines are long-lived: one instance serves all requests of its
/// language for as long as its dataset stays deployed. They are owned by
/// the dataset lifecycle collaborator; the routing registry holds
/// references but never closes them.
pub trait Engine: Send + Sync {
    /// The one language this engine serves.
    fn language(&self) -> Language;

    /// Validates engine-specific requirements of `command` and binds a
    /// fresh invocation to it.
    ///
    /// Must fail fast on usage errors (e.g. both `query` and `update`
    /// present) *without* allocating execution resources.
    ///
    /// # Errors
    ///
    /// [`GatewayError::InvalidCommand`] for usage errors; any other kind
    /// for backend failures.
    fn prepare(&self, command: &Command) -> Result<Box<dyn Invocation>, GatewayError>;

    /// Releases engine-owned resources (e.g. pooled connections) on
    /// dataset teardown. Called by the dataset owner, not the registry.
    fn close(&self) {}
}

/// Single-use execution handle bound to one command.
///
/// # Life cycle
///
/// `execute` then `write` are each called at most once, in that order,
/// from a worker thread the caller chooses; calling them out of order is
/// a defect in the caller, and implementations are entitled to panic.
/// [`close`](Self::close) runs on every exit path (success, failure or
/// cancellation) exactly once, releasing per-invocation resources
/// (cursors, buffers). The runtime enforces all of this; engine authors
/// only implement the four operations.
pub trait Invocation: Send {
    /// The permission a client needs to run this invocation.
    fn requires(&self) -> Permission;

    /// The media type [`write`](Self::write) will produce.
    fn produces(&self) -> MediaType;

    /// Performs the work. May block; must poll `cancel` during long
    /// operations and return [`GatewayError::Cancelled`] when signalled.
    ///
    /// # Errors
    ///
    /// Usage errors the backend detects map to
    /// [`GatewayError::InvalidCommand`]; everything else to
    /// [`GatewayError::Execution`].
    fn execute(&mut self, cancel: &CancelToken) -> Result<(), GatewayError>;

    /// Serializes the captured results into `sink`. Only valid after a
    /// successful [`execute`](Self::execute).
    ///
    /// # Errors
    ///
    /// As for [`execute`](Self::execute); additionally any I/O failure
    /// of the sink, reported as [`GatewayError::Execution`].
    fn write(&mut self, sink: &mut dyn Write, cancel: &CancelToken) -> Result<(), GatewayError>;

    /// Releases per-invocation resources.
    fn close(&mut self) {}
}

/// Resolves the engine that should serve a command.
///
/// Implemented by the dynamic registry (multi-tenant mode) and by the
/// fixed startup selection (single-tenant mode).
pub trait EngineRouter: Send + Sync {
    /// Selects the engine deployed for the command's (schema, language)
    /// pair.
    ///
    /// # Errors
    ///
    /// [`GatewayError::SchemaNotFound`] when no dataset with that schema
    /// is deployed at all; [`GatewayError::LanguageNotSupported`] when
    /// the dataset exists but not for the requested language.
    fn select(&self, command: &Command) -> Result<Arc<dyn Engine>, GatewayError>;
}
