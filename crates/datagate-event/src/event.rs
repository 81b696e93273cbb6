//! Event objects.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use datagate_types::Correlation;
use serde::Serialize;

/// The closed vocabulary of request lifecycle subjects.
///
/// | Subject | Meaning |
/// |---------|---------|
/// | `Received` | a command arrived at the gateway |
/// | `Accepted` | a command passed preparation (emitted by layers that observe it) |
/// | `Executed` | execution finished, a result is about to be yielded |
/// | `Completed` | result serialization finished successfully |
/// | `Failed` | a system-class failure ended the request |
/// | `Rejected` | a client-caused error ended the request |
///
/// `Completed`, `Failed` and `Rejected` are terminal and mutually
/// exclusive for a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    /// A command arrived.
    Received,
    /// A command was prepared for execution.
    Accepted,
    /// Execution finished; results are ready to stream.
    Executed,
    /// Result serialization finished successfully.
    Completed,
    /// The request failed.
    Failed,
    /// The request was rejected as client-caused.
    Rejected,
}

impl Subject {
    /// Returns the lowercase subject keyword.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Accepted => "accepted",
            Self::Executed => "executed",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Rejected => "rejected",
        }
    }

    /// Returns `true` for terminal subjects.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Rejected)
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded lifecycle notification.
///
/// Events are immutable once created: the emitting layer stamps subject,
/// correlation, wall-clock timestamp, elapsed time since the request
/// started and any contextual key/value pairs at construction, and sinks
/// only read them.
///
/// `subject`, `correlation`, `timestamp` and `elapsed_micros` are
/// reserved; contextual properties live in `context` and cannot shadow
/// them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    subject: Subject,
    correlation: Correlation,
    timestamp: DateTime<Utc>,
    elapsed_micros: u64,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    context: BTreeMap<String, String>,
}

impl Event {
    /// Creates an event; used by [`EventReporter`](crate::EventReporter),
    /// which supplies the correlation and elapsed time of the request.
    #[must_use]
    pub fn new(
        subject: Subject,
        correlation: Correlation,
        elapsed_micros: u64,
        context: BTreeMap<String, String>,
    ) -> Self {
        Self {
            subject,
            correlation,
            timestamp: Utc::now(),
            elapsed_micros,
            context,
        }
    }

    /// The lifecycle keyword of this event.
    #[must_use]
    pub fn subject(&self) -> Subject {
        self.subject
    }

    /// The id shared by all events of the originating request.
    #[must_use]
    pub fn correlation(&self) -> Correlation {
        self.correlation
    }

    /// Wall-clock time the event was recorded.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Microseconds elapsed since the request was first observed.
    #[must_use]
    pub fn elapsed_micros(&self) -> u64 {
        self.elapsed_micros
    }

    /// Contextual properties attached by the emitting layer.
    #[must_use]
    pub fn context(&self) -> &BTreeMap<String, String> {
        &self.context
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}] +{}us", self.subject, self.correlation, self.elapsed_micros)
    }
}
