//! Emitter contract and the bundled sinks.

use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::event::{Event, Subject};

/// Observability sink for lifecycle events.
///
/// Implementations must be non-blocking and best-effort: a sink that
/// cannot deliver an event drops it (optionally logging the loss) and
/// must never propagate a failure back into request processing.
pub trait Emitter: Send + Sync {
    /// Consumes one event.
    fn emit(&self, event: Event);
}

/// Discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEmitter;

impl Emitter for NullEmitter {
    fn emit(&self, _event: Event) {}
}

/// Writes events to the `tracing` log.
///
/// Terminal failures log at `warn`, everything else at `debug`, matching
/// the usage-error-is-not-a-system-failure reporting policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEmitter;

impl Emitter for TracingEmitter {
    fn emit(&self, event: Event) {
        match event.subject() {
            Subject::Failed => warn!(
                correlation = %event.correlation(),
                elapsed_micros = event.elapsed_micros(),
                context = ?event.context(),
                "request failed"
            ),
            subject => debug!(
                subject = subject.as_str(),
                correlation = %event.correlation(),
                elapsed_micros = event.elapsed_micros(),
                "request event"
            ),
        }
    }
}

/// Fans events out to live observers over a tokio broadcast channel.
///
/// Lossy by design: lagging receivers miss old events but keep receiving
/// new ones, and emitting with no subscribers is a no-op.
///
/// # Example
///
/// ```
/// use datagate_event::{BroadcastEmitter, Emitter, EventReporter, Subject};
/// use std::sync::Arc;
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let emitter = BroadcastEmitter::with_capacity(16);
/// let mut observer = emitter.subscribe();
///
/// let reporter = EventReporter::new(Arc::new(emitter));
/// reporter.event(Subject::Received);
///
/// let seen = observer.recv().await.unwrap();
/// assert_eq!(seen.subject(), Subject::Received);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct BroadcastEmitter {
    tx: broadcast::Sender<Event>,
}

impl BroadcastEmitter {
    /// Creates an emitter buffering up to `capacity` events per receiver.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Registers a new observer.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Number of currently attached observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for BroadcastEmitter {
    fn default() -> Self {
        Self::with_capacity(64)
    }
}

impl Emitter for BroadcastEmitter {
    fn emit(&self, event: Event) {
        // send only fails when no receiver is attached
        let _ = self.tx.send(event);
    }
}
