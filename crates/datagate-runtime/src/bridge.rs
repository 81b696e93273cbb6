//! Transport cancellation bridge.
//!
//! The transport layer suspends its response while the gateway works and
//! resumes it later from another thread. Three signals can end that
//! window (normal completion, client disconnect, deadline expiry) and
//! whichever fires first must release the underlying subscription
//! exactly once. [`AsyncListener`] unifies them:
//!
//! ```text
//!        completion ──┐
//!        disconnect ──┼──► AsyncListener ──► unsubscribe (once)
//!        timeout ─────┘         │
//!                               └─► resume_error(Timeout)  (timeout only)
//! ```
//!
//! [`deliver`] drives the common case end to end: await the outcome,
//! resume the response with the result / no-content / error, racing the
//! configured deadline.

use std::time::Duration;

use datagate_engine::{GatewayError, Outcome, StreamedResults, Subscription, SubscriptionHandle};
use datagate_types::Timeout;
use tracing::{debug, warn};

/// The transport's suspended-response primitive, as the gateway sees it.
///
/// Implementations wrap whatever async-response object the HTTP layer
/// provides. Each `resume_*` returns `false` when the response was
/// already resumed, in which case the call had no effect.
pub trait SuspendedResponse: Send + Sync {
    /// Resumes with a result handle; the transport calls
    /// [`StreamedResults::write`] on its own thread.
    fn resume(&self, results: StreamedResults) -> bool;

    /// Resumes with an empty success.
    fn resume_no_content(&self) -> bool;

    /// Resumes with a terminal error.
    fn resume_error(&self, error: GatewayError) -> bool;

    /// Returns `true` once the response has been resumed.
    fn is_resumed(&self) -> bool;
}

/// Ties a subscription's lifetime to the transport response lifecycle.
///
/// Register one listener per request as the completion, disconnect and
/// timeout callback of the transport's async-response primitive. All
/// three paths funnel into one release guard (the
/// [`SubscriptionHandle`]'s compare-and-set), so concurrent signals
/// cannot cancel twice and a signal arriving after normal completion is
/// a no-op.
///
/// # Example
///
/// ```
/// use datagate_engine::SubscriptionHandle;
/// use datagate_runtime::AsyncListener;
///
/// let listener = AsyncListener::clean_up(SubscriptionHandle::new(|| {
///     // cancel in-flight work
/// }));
/// listener.on_disconnect();
/// listener.on_complete(); // no-op, already released
/// assert!(listener.is_released());
/// ```
pub struct AsyncListener {
    subscription: SubscriptionHandle,
}

impl AsyncListener {
    /// Creates a listener releasing `subscription` on the first signal.
    #[must_use]
    pub fn clean_up(subscription: SubscriptionHandle) -> Self {
        Self { subscription }
    }

    /// Completion callback: the response was fully processed.
    pub fn on_complete(&self) {
        self.release();
    }

    /// Disconnect callback: the client went away.
    pub fn on_disconnect(&self) {
        debug!("client disconnected before completion");
        self.release();
    }

    /// Timeout handler: resumes the response with a
    /// service-unavailable-class error, then releases.
    pub fn on_timeout(&self, response: &dyn SuspendedResponse) {
        warn!("request timed out before completion");
        if !response.resume_error(GatewayError::Timeout) {
            debug!("timeout raced completion, response already resumed");
        }
        self.release();
    }

    /// Returns `true` once any signal has released the subscription.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.subscription.is_unsubscribed()
    }

    fn release(&self) {
        self.subscription.unsubscribe();
    }
}

/// Awaits `subscription` and resumes `response` with its outcome,
/// honoring `timeout`.
///
/// On success the transport receives the single result handle (or a
/// no-content resume for an empty completion); errors resume the
/// response unchanged. If the deadline elapses first the response is
/// resumed with [`GatewayError::Timeout`] and the in-flight work is
/// cancelled. An undefined timeout waits indefinitely.
pub async fn deliver(subscription: Subscription, response: &dyn SuspendedResponse, timeout: Timeout) {
    let listener = AsyncListener::clean_up(subscription.handle());
    match timeout {
        t if t.is_defined() => {
            let deadline = t.get_or(Duration::ZERO);
            let mut outcome = Box::pin(subscription.outcome());
            tokio::select! {
                outcome = &mut outcome => {
                    resume_with(outcome, response);
                    listener.on_complete();
                }
                () = tokio::time::sleep(deadline) => {
                    listener.on_timeout(response);
                    // drain off to the side so decorators still observe
                    // the terminal outcome of the cancelled work
                    tokio::spawn(async move {
                        let _ = outcome.await;
                    });
                }
            }
        }
        _ => {
            let outcome = subscription.outcome().await;
            resume_with(outcome, response);
            listener.on_complete();
        }
    }
}

fn resume_with(outcome: Outcome, response: &dyn SuspendedResponse) {
    let resumed = match outcome {
        Ok(Some(results)) => response.resume(results),
        Ok(None) => response.resume_no_content(),
        Err(error) => response.resume_error(error),
    };
    if !resumed {
        warn!("could not resume response, already resumed");
    }
}
