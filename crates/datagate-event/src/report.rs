//! Per-request event reporting.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use datagate_types::Correlation;

use crate::emitter::Emitter;
use crate::event::{Event, Subject};

/// Builds and emits the events of one request.
///
/// A reporter is created when a command is first observed; it draws a
/// fresh [`Correlation`] id and remembers the start instant, then stamps
/// both onto every event it emits. Cloning a reporter shares the
/// correlation and clock, so the same request can be reported from
/// multiple stages (acceptance, execution, streaming).
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use datagate_event::{EventReporter, NullEmitter, Subject};
///
/// let reporter = EventReporter::new(Arc::new(NullEmitter));
/// reporter.event(Subject::Received);
/// reporter.event_with(
///     Subject::Rejected,
///     [("message".to_string(), "unknown dataset".to_string())],
/// );
/// ```
#[derive(Clone)]
pub struct EventReporter {
    emitter: Arc<dyn Emitter>,
    correlation: Correlation,
    started: Instant,
}

impl EventReporter {
    /// Creates a reporter for a new request with a fresh correlation id.
    #[must_use]
    pub fn new(emitter: Arc<dyn Emitter>) -> Self {
        Self {
            emitter,
            correlation: Correlation::new(),
            started: Instant::now(),
        }
    }

    /// The correlation id stamped onto every event of this request.
    #[must_use]
    pub fn correlation(&self) -> Correlation {
        self.correlation
    }

    /// Emits an event without contextual properties.
    pub fn event(&self, subject: Subject) {
        self.event_with(subject, std::iter::empty());
    }

    /// Emits an event carrying the given contextual properties.
    pub fn event_with(
        &self,
        subject: Subject,
        context: impl IntoIterator<Item = (String, String)>,
    ) {
        let elapsed = self.started.elapsed().as_micros().min(u128::from(u64::MAX)) as u64;
        let context: BTreeMap<String, String> = context.into_iter().collect();
        self.emitter
            .emit(Event::new(subject, self.correlation, elapsed, context));
    }
}

impl std::fmt::Debug for EventReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventReporter")
            .field("correlation", &self.correlation)
            .finish_non_exhaustive()
    }
}
