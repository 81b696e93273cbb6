//! Event-emitting connector decorator.

use std::sync::Arc;

use datagate_engine::{Command, Connector, GatewayError, Submission};
use datagate_event::{Emitter, EventReporter, Subject};
use datagate_types::ErrorCode;

/// Decorates a [`Connector`] with lifecycle event emission.
///
/// The decorated connector's outcomes and errors pass through untouched;
/// only side-effecting emission is added:
///
/// - `received`: immediately when `accept` is called;
/// - `executed`: immediately before the result handle is yielded to the
///   subscriber;
/// - `completed`: after the result's `write` finishes successfully;
/// - `failed`: on a terminal error, or when `write` itself fails
///   (failure during writing is never reported as `completed`);
/// - `rejected`: instead of `failed` when the terminal error is
///   client-caused (bad command, unknown dataset, missing permission).
///
/// Per request, exactly one of `{completed, failed}` follows a yielded
/// result, and exactly one terminal event follows `received` when no
/// result is ever produced.
///
/// # Example
///
/// ```no_run
/// use datagate_event::TracingEmitter;
/// use datagate_runtime::EventfulConnector;
/// use std::sync::Arc;
/// # let inner: Arc<dyn datagate_engine::Connector> = unimplemented!();
///
/// let connector = EventfulConnector::around(Arc::new(TracingEmitter), inner);
/// ```
pub struct EventfulConnector {
    delegate: Arc<dyn Connector>,
    emitter: Arc<dyn Emitter>,
}

impl EventfulConnector {
    /// Wraps `delegate`, reporting every request to `emitter`.
    #[must_use]
    pub fn around(emitter: Arc<dyn Emitter>, delegate: Arc<dyn Connector>) -> Self {
        Self { delegate, emitter }
    }
}

impl Connector for EventfulConnector {
    fn accept(&self, command: Command) -> Submission {
        let reporter = EventReporter::new(self.emitter.clone());
        reporter.event_with(Subject::Received, command_context(&command));

        let tail = reporter;
        self.delegate.accept(command).map(move |outcome| match outcome {
            Ok(Some(results)) => {
                tail.event(Subject::Executed);
                let on_write = tail;
                Ok(Some(results.inspect(move |result| match result {
                    Ok(()) => on_write.event(Subject::Completed),
                    Err(error) => {
                        on_write.event_with(Subject::Failed, error_context(error));
                    }
                })))
            }
            Ok(None) => Ok(None),
            Err(error) => {
                let subject = if error.is_rejection() {
                    Subject::Rejected
                } else {
                    Subject::Failed
                };
                tail.event_with(subject, error_context(&error));
                Err(error)
            }
        })
    }
}

fn command_context(command: &Command) -> Vec<(String, String)> {
    let mut context: Vec<(String, String)> = command
        .properties()
        .iter()
        .map(|(key, values)| (key.clone(), values.join(",")))
        .collect();
    if !command.acceptable().is_empty() {
        let accepted = command
            .acceptable()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        context.push(("accepted".to_string(), accepted));
    }
    context.push(("owner".to_string(), command.owner().to_string()));
    context
}

fn error_context(error: &GatewayError) -> Vec<(String, String)> {
    vec![
        ("message".to_string(), error.to_string()),
        ("code".to_string(), error.code().to_string()),
    ]
}
