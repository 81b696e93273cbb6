//! Invocation execution state machine.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

use datagate_engine::{CancelToken, GatewayError, Invocation, StreamedResults};
use tracing::debug;

/// Life-cycle phase of one execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Phase {
    /// Created, not yet running.
    Pending = 0,
    /// The invocation's `execute` is running.
    Executing = 1,
    /// Results were produced; serialization pending or in progress.
    Streaming = 2,
    /// Serialization finished successfully.
    Complete = 3,
    /// Cancelled before completing.
    Aborted = 4,
}

impl Phase {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Pending,
            1 => Self::Executing,
            2 => Self::Streaming,
            3 => Self::Complete,
            _ => Self::Aborted,
        }
    }
}

struct Shared {
    phase: AtomicU8,
    cancel: CancelToken,
}

impl Shared {
    fn transition(&self, from: Phase, to: Phase) -> bool {
        self.phase
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn phase(&self) -> Phase {
        Phase::from_u8(self.phase.load(Ordering::Acquire))
    }
}

/// Drives one [`Invocation`] through execute → stream → close.
///
/// The execution owns the invocation for the duration of the request
/// and guarantees it is released on **every** exit path exactly once:
///
/// - `execute` fails → closed before the error propagates;
/// - aborted before or during `execute` → closed, outcome is
///   [`GatewayError::Cancelled`];
/// - results produced → ownership moves into the [`StreamedResults`],
///   which closes after `write` (success or failure) or on
///   drop-without-write.
///
/// Phase changes are atomic compare-and-set transitions, so a
/// cancellation racing completion resolves to exactly one winner; the
/// cooperative [`CancelToken`] is signalled at most once, when the
/// abort wins against [`Phase::Executing`].
///
/// `run` consumes the execution, so a second run of the same request is
/// unrepresentable.
pub struct Execution {
    shared: Arc<Shared>,
}

impl Execution {
    /// Creates an idle execution.
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                phase: AtomicU8::new(Phase::Pending as u8),
                cancel: CancelToken::new(),
            }),
        }
    }

    /// Handle through which the subscription cancels this execution.
    #[must_use]
    pub fn abort_handle(&self) -> AbortHandle {
        AbortHandle {
            shared: self.shared.clone(),
        }
    }

    /// The token handed to the invocation's blocking calls.
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.shared.cancel.clone()
    }

    /// Current phase; for monitoring and tests.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.shared.phase()
    }

    /// Executes the invocation on the calling (worker) thread and wraps
    /// its results.
    ///
    /// # Errors
    ///
    /// Propagates the invocation's failure unchanged in kind, or
    /// [`GatewayError::Cancelled`] when aborted first. The invocation is
    /// closed before any error returns.
    pub fn run(self, mut invocation: Box<dyn Invocation>) -> Result<StreamedResults, GatewayError> {
        let shared = self.shared;
        if !shared.transition(Phase::Pending, Phase::Executing) {
            debug!("execution aborted before it started");
            invocation.close();
            return Err(GatewayError::Cancelled);
        }

        if let Err(error) = invocation.execute(&shared.cancel) {
            invocation.close();
            return Err(error);
        }

        if !shared.transition(Phase::Executing, Phase::Streaming) {
            // cancelled after execute returned but before results were emitted
            invocation.close();
            return Err(GatewayError::Cancelled);
        }

        let media_type = invocation.produces();
        let slot = Arc::new(Mutex::new(Some(invocation)));

        let write_shared = shared.clone();
        let write_slot = slot.clone();
        let abandon_shared = shared;
        let abandon_slot = slot;

        let results = StreamedResults::new(media_type, move |sink| {
            let mut invocation = write_slot
                .lock()
                .expect("invocation slot poisoned")
                .take()
                .expect("invocation present until first write");
            let result = invocation.write(sink, &write_shared.cancel);
            if result.is_ok() {
                write_shared.transition(Phase::Streaming, Phase::Complete);
            }
            invocation.close();
            result
        })
        .on_abandon(move || {
            if abandon_shared.transition(Phase::Streaming, Phase::Aborted) {
                abandon_shared.cancel.cancel();
            }
            if let Some(mut invocation) = abandon_slot
                .lock()
                .expect("invocation slot poisoned")
                .take()
            {
                invocation.close();
            }
        });
        Ok(results)
    }
}

impl Default for Execution {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Execution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Execution")
            .field("phase", &self.phase())
            .finish()
    }
}

/// Cancels an in-flight execution from the subscription side.
///
/// Aborting is a no-op once results have been emitted; from then on the
/// [`StreamedResults`] handle owns the invocation's life cycle.
#[derive(Clone)]
pub struct AbortHandle {
    shared: Arc<Shared>,
}

impl AbortHandle {
    /// Cancels the execution if it has not yet produced results.
    ///
    /// Signals the [`CancelToken`] only when an `execute` call is
    /// actually in flight.
    pub fn abort(&self) {
        loop {
            match self.shared.phase() {
                Phase::Pending => {
                    if self.shared.transition(Phase::Pending, Phase::Aborted) {
                        debug!("execution aborted before starting");
                        return;
                    }
                }
                Phase::Executing => {
                    if self.shared.transition(Phase::Executing, Phase::Aborted) {
                        debug!("execution aborted mid-flight");
                        self.shared.cancel.cancel();
                        return;
                    }
                }
                Phase::Streaming | Phase::Complete | Phase::Aborted => return,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use datagate_engine::testing::StubEngine;
    use datagate_engine::{Command, Engine};
    use datagate_types::Language;

    use super::*;

    fn prepared(engine: &StubEngine) -> Box<dyn Invocation> {
        engine.prepare(&Command::builder().build()).unwrap()
    }

    #[test]
    fn successful_run_streams_and_closes_once() {
        let engine = StubEngine::new(Language::Sql).payload(b"rows".to_vec());
        let recorder = engine.recorder();

        let execution = Execution::new();
        let results = execution.run(prepared(&engine)).unwrap();

        let mut sink = Vec::new();
        results.write(&mut sink).unwrap();

        assert_eq!(sink, b"rows");
        assert_eq!(recorder.executed(), 1);
        assert_eq!(recorder.written(), 1);
        assert_eq!(recorder.closed(), 1);
    }

    #[test]
    fn execute_failure_closes_and_propagates_kind() {
        let engine = StubEngine::new(Language::Sql)
            .fail_execute(GatewayError::Execution("backend down".into()));
        let recorder = engine.recorder();

        let outcome = Execution::new().run(prepared(&engine));
        assert_eq!(outcome.err(), Some(GatewayError::Execution("backend down".into())));
        assert_eq!(recorder.closed(), 1);
        assert_eq!(recorder.written(), 0);
    }

    #[test]
    fn abort_before_start_never_executes() {
        let engine = StubEngine::new(Language::Sql);
        let recorder = engine.recorder();

        let execution = Execution::new();
        execution.abort_handle().abort();
        let outcome = execution.run(prepared(&engine));

        assert_eq!(outcome.err(), Some(GatewayError::Cancelled));
        assert_eq!(recorder.executed(), 0);
        assert_eq!(recorder.closed(), 1);
    }

    #[test]
    fn abort_during_execute_signals_the_token() {
        let engine = StubEngine::new(Language::Sql).block_until_cancelled();
        let recorder = engine.recorder();

        let execution = Execution::new();
        let abort = execution.abort_handle();
        let worker = std::thread::spawn(move || execution.run(prepared(&engine)));

        std::thread::sleep(std::time::Duration::from_millis(20));
        abort.abort();

        let outcome = worker.join().unwrap();
        assert_eq!(outcome.err(), Some(GatewayError::Cancelled));
        assert!(recorder.cancel_observed());
        assert_eq!(recorder.closed(), 1);
    }

    #[test]
    fn abort_after_streaming_is_a_no_op() {
        let engine = StubEngine::new(Language::Sql);
        let recorder = engine.recorder();

        let execution = Execution::new();
        let abort = execution.abort_handle();
        let results = execution.run(prepared(&engine)).unwrap();
        abort.abort();

        // still writable, the abort no longer owns the life cycle
        let mut sink = Vec::new();
        results.write(&mut sink).unwrap();
        assert_eq!(recorder.written(), 1);
        assert_eq!(recorder.closed(), 1);
    }

    #[test]
    fn dropping_unwritten_results_cancels_and_closes() {
        let engine = StubEngine::new(Language::Sql);
        let recorder = engine.recorder();

        let execution = Execution::new();
        let token = execution.cancel_token();
        let results = execution.run(prepared(&engine)).unwrap();
        drop(results);

        assert!(token.is_cancelled());
        assert_eq!(recorder.closed(), 1);
        assert_eq!(recorder.written(), 0);
    }

    #[test]
    fn write_failure_still_closes_exactly_once() {
        let engine = StubEngine::new(Language::Sql)
            .fail_write(GatewayError::Execution("sink broke".into()));
        let recorder = engine.recorder();

        let results = Execution::new().run(prepared(&engine)).unwrap();
        let mut sink = Vec::new();
        assert!(results.write(&mut sink).is_err());
        assert_eq!(recorder.closed(), 1);
    }

    #[test]
    fn phases_progress_through_the_life_cycle() {
        let engine = StubEngine::new(Language::Sql);
        let execution = Execution::new();
        assert_eq!(execution.phase(), Phase::Pending);

        let abort = execution.abort_handle();
        let results = execution.run(prepared(&engine)).unwrap();
        let mut sink = Vec::new();
        results.write(&mut sink).unwrap();
        // write completed; the abort handle observes the terminal phase
        abort.abort();
    }
}
