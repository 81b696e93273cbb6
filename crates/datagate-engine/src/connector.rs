//! Connector contract and the single-shot subscription model.
//!
//! [`Connector::accept`] yields a [`Submission`]: a lazy, at-most-one
//! result asynchronous outcome. Nothing runs until the transport
//! subscribes; subscribing consumes the submission, so a request cannot
//! be started twice. The subscriber awaits exactly one of:
//!
//! - one [`StreamedResults`] (written later, on the transport's thread),
//! - an empty completion,
//! - a terminal [`GatewayError`].
//!
//! ```text
//! transport            connector              worker
//!    │  accept(cmd)        │                    │
//!    │ ───────────────────►│                    │
//!    │   Submission (lazy) │                    │
//!    │ ◄───────────────────│                    │
//!    │  subscribe()        │   spawn            │
//!    │ ────────────────────┼───────────────────►│ select/prepare/
//!    │      Subscription   │                    │ authorize/execute
//!    │  outcome().await    │                    │
//!    │ ◄──────────────────────────────────────  │ oneshot
//!    │                     │                    │
//!    │  handle().unsubscribe()   cancels in-flight work, once
//! ```
//!
//! Decorators wrap submissions with [`Submission::map`], observing or
//! replacing the outcome without changing when work starts.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;

use crate::command::Command;
use crate::error::GatewayError;
use crate::results::StreamedResults;

/// Terminal outcome of a submission: at most one result, or an error.
pub type Outcome = Result<Option<StreamedResults>, GatewayError>;

/// The gateway's request-acceptance contract.
pub trait Connector: Send + Sync {
    /// Accepts a command, returning its lazy outcome.
    ///
    /// Implementations must not start work here; pre-failed commands
    /// surface through a [ready](Submission::ready) submission instead
    /// of a panic or an eager error.
    fn accept(&self, command: Command) -> Submission;
}

type Transform = Box<dyn FnOnce(Outcome) -> Outcome + Send>;

enum Kind {
    Ready(Outcome),
    Deferred(Box<dyn FnOnce() -> Subscription + Send>),
}

/// A lazily started, at-most-one-result operation.
pub struct Submission {
    kind: Kind,
    transform: Option<Transform>,
}

impl Submission {
    /// Wraps an outcome that is already known; no work is scheduled on
    /// subscription. Used for invalid commands.
    #[must_use]
    pub fn ready(outcome: Outcome) -> Self {
        Self {
            kind: Kind::Ready(outcome),
            transform: None,
        }
    }

    /// Shorthand for a pre-failed submission.
    #[must_use]
    pub fn failed(error: GatewayError) -> Self {
        Self::ready(Err(error))
    }

    /// Wraps a start function invoked on subscription; `start` schedules
    /// the work and returns the live subscription.
    #[must_use]
    pub fn deferred(start: impl FnOnce() -> Subscription + Send + 'static) -> Self {
        Self {
            kind: Kind::Deferred(Box::new(start)),
            transform: None,
        }
    }

    /// Composes a transformation over the eventual outcome.
    ///
    /// Transforms run on the subscriber's task, after the outcome is
    /// known and before it is handed to the caller: the decorator's
    /// window for "immediately before yielding" side effects. Later maps
    /// wrap earlier ones.
    #[must_use]
    pub fn map(mut self, f: impl FnOnce(Outcome) -> Outcome + Send + 'static) -> Self {
        self.transform = Some(match self.transform.take() {
            Some(inner) => Box::new(move |outcome| f(inner(outcome))),
            None => Box::new(f),
        });
        self
    }

    /// Starts the operation. Consuming `self` makes a second
    /// subscription unrepresentable.
    #[must_use]
    pub fn subscribe(self) -> Subscription {
        let mut subscription = match self.kind {
            Kind::Ready(outcome) => Subscription::settled(outcome),
            Kind::Deferred(start) => start(),
        };
        subscription.push_transform(self.transform);
        subscription
    }
}

enum Source {
    Settled(Outcome),
    Pending(oneshot::Receiver<Outcome>),
}

/// A started operation whose outcome can be awaited once.
pub struct Subscription {
    source: Source,
    transform: Option<Transform>,
    handle: SubscriptionHandle,
}

impl Subscription {
    /// Creates a subscription fed by a worker through `rx`, cancellable
    /// through `handle`.
    #[must_use]
    pub fn new(rx: oneshot::Receiver<Outcome>, handle: SubscriptionHandle) -> Self {
        Self {
            source: Source::Pending(rx),
            transform: None,
            handle,
        }
    }

    /// Creates an already-settled subscription.
    #[must_use]
    pub fn settled(outcome: Outcome) -> Self {
        Self {
            source: Source::Settled(outcome),
            transform: None,
            handle: SubscriptionHandle::detached(),
        }
    }

    /// Returns the cancellation handle; clones share one release guard.
    #[must_use]
    pub fn handle(&self) -> SubscriptionHandle {
        self.handle.clone()
    }

    fn push_transform(&mut self, outer: Option<Transform>) {
        if let Some(f) = outer {
            self.transform = Some(match self.transform.take() {
                Some(inner) => Box::new(move |outcome| f(inner(outcome))),
                None => f,
            });
        }
    }

    /// Awaits the terminal outcome.
    ///
    /// A worker that disappears without reporting (panic) surfaces as
    /// [`GatewayError::Internal`] unless the subscription was
    /// unsubscribed, in which case it surfaces as
    /// [`GatewayError::Cancelled`].
    pub async fn outcome(self) -> Outcome {
        let raw = match self.source {
            Source::Settled(outcome) => outcome,
            Source::Pending(rx) => match rx.await {
                Ok(outcome) => outcome,
                Err(_) if self.handle.is_unsubscribed() => Err(GatewayError::Cancelled),
                Err(_) => Err(GatewayError::Internal(
                    "execution ended without reporting an outcome".into(),
                )),
            },
        };
        match self.transform {
            Some(f) => f(raw),
            None => raw,
        }
    }
}

struct HandleState {
    released: AtomicBool,
    on_unsubscribe: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

/// Cancellation side of a [`Subscription`].
///
/// All clones share one release guard: whichever caller (timeout,
/// disconnect or completion) unsubscribes first runs the cancellation
/// action; every later call is a no-op. The guard is a compare-and-set,
/// so concurrent signals cannot double-cancel.
///
/// # Example
///
/// ```
/// use datagate_engine::SubscriptionHandle;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// let cancelled = Arc::new(AtomicUsize::new(0));
/// let counter = cancelled.clone();
/// let handle = SubscriptionHandle::new(move || {
///     counter.fetch_add(1, Ordering::SeqCst);
/// });
///
/// handle.clone().unsubscribe();
/// handle.unsubscribe(); // no-op
/// assert_eq!(cancelled.load(Ordering::SeqCst), 1);
/// ```
#[derive(Clone)]
pub struct SubscriptionHandle {
    state: Arc<HandleState>,
}

impl SubscriptionHandle {
    /// Creates a handle running `action` on the first unsubscribe.
    #[must_use]
    pub fn new(action: impl FnOnce() + Send + 'static) -> Self {
        Self {
            state: Arc::new(HandleState {
                released: AtomicBool::new(false),
                on_unsubscribe: Mutex::new(Some(Box::new(action))),
            }),
        }
    }

    /// Creates a handle with nothing to cancel (settled subscriptions).
    #[must_use]
    pub fn detached() -> Self {
        Self {
            state: Arc::new(HandleState {
                released: AtomicBool::new(false),
                on_unsubscribe: Mutex::new(None),
            }),
        }
    }

    /// Releases the subscription, running the cancellation action if
    /// this is the first call across all clones.
    pub fn unsubscribe(&self) {
        if self
            .state
            .released
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            let action = self
                .state
                .on_unsubscribe
                .lock()
                .expect("unsubscribe lock poisoned")
                .take();
            if let Some(action) = action {
                action();
            }
        }
    }

    /// Returns `true` once any clone has unsubscribed.
    #[must_use]
    pub fn is_unsubscribed(&self) -> bool {
        self.state.released.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("unsubscribed", &self.is_unsubscribed())
            .finish()
    }
}
