//! Test doubles for event consumers.
//!
//! Shared by the unit tests in this crate and the integration suites of
//! `datagate-runtime`, which assert on exact emitted event sequences.

use std::sync::Mutex;

use crate::emitter::Emitter;
use crate::event::{Event, Subject};

/// Emitter that records every event for later inspection.
///
/// # Example
///
/// ```
/// use datagate_event::testing::CollectingEmitter;
/// use datagate_event::{Emitter, EventReporter, Subject};
/// use std::sync::Arc;
///
/// let sink = Arc::new(CollectingEmitter::default());
/// EventReporter::new(sink.clone()).event(Subject::Received);
///
/// assert_eq!(sink.subjects(), vec![Subject::Received]);
/// ```
#[derive(Debug, Default)]
pub struct CollectingEmitter {
    events: Mutex<Vec<Event>>,
}

impl CollectingEmitter {
    /// Returns a copy of all recorded events, in emission order.
    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().expect("emitter lock poisoned").clone()
    }

    /// Returns only the subjects, in emission order.
    #[must_use]
    pub fn subjects(&self) -> Vec<Subject> {
        self.events().iter().map(Event::subject).collect()
    }

    /// Drops all recorded events.
    pub fn clear(&self) {
        self.events.lock().expect("emitter lock poisoned").clear();
    }
}

impl Emitter for CollectingEmitter {
    fn emit(&self, event: Event) {
        self.events.lock().expect("emitter lock poisoned").push(event);
    }
}
