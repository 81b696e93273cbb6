//! Command invocation pipeline.

use std::sync::Arc;

use datagate_auth::Authorizer;
use datagate_engine::{
    Command, Connector, EngineRouter, Outcome, Submission, Subscription, SubscriptionHandle,
};
use tokio::sync::oneshot;
use tracing::debug;

use crate::execute::Execution;
use crate::scheduler::Scheduler;

/// Routes, authorizes and executes commands on a background scheduler.
///
/// The [`Connector`] implementation at the core of the gateway. For each
/// accepted command it runs, lazily, on subscription, never on the
/// accepting thread:
///
/// 1. surface an invalid command's captured error immediately;
/// 2. `router.select(command)`: find the deployed engine;
/// 3. `engine.prepare(command)`: bind an invocation;
/// 4. `authorizer.check(owner, invocation.requires())`: strictly before
///    execution;
/// 5. `invocation.execute()`: then yield one
///    [`StreamedResults`](datagate_engine::StreamedResults).
///
/// Failures of steps 2–5 propagate unchanged in kind; this layer never
/// reclassifies engine or authorization errors. Unsubscribing an
/// in-flight request cancels the invocation exactly once and releases
/// its resources.
///
/// The caller's `tracing` span is captured when the command is accepted,
/// so worker-side log lines keep the request's context.
pub struct ReactiveInvoker {
    router: Arc<dyn EngineRouter>,
    authorizer: Arc<dyn Authorizer>,
    scheduler: Scheduler,
}

impl ReactiveInvoker {
    /// Wires the pipeline from its collaborators.
    #[must_use]
    pub fn new(
        router: Arc<dyn EngineRouter>,
        authorizer: Arc<dyn Authorizer>,
        scheduler: Scheduler,
    ) -> Self {
        Self {
            router,
            authorizer,
            scheduler,
        }
    }
}

impl Connector for ReactiveInvoker {
    fn accept(&self, command: Command) -> Submission {
        debug!(command = %command, "received command");
        if let Err(cause) = command.ensure_valid() {
            debug!(cause = %cause, "rejecting invalid command");
            return Submission::failed(cause);
        }

        // capture the request context before crossing to the worker
        let span = tracing::Span::current();
        let router = self.router.clone();
        let authorizer = self.authorizer.clone();
        let scheduler = self.scheduler.clone();

        Submission::deferred(move || {
            let (tx, rx) = oneshot::channel::<Outcome>();
            let execution = Execution::new();
            let abort = execution.abort_handle();

            scheduler.execute(move || {
                let _entered = span.entered();
                let outcome = invoke(&*router, &*authorizer, &command, execution);
                if let Err(unclaimed) = tx.send(outcome) {
                    // subscriber went away; dropping an unwritten result
                    // cancels and releases the invocation
                    debug!(settled = unclaimed.is_ok(), "outcome had no subscriber");
                }
            });

            Subscription::new(rx, SubscriptionHandle::new(move || abort.abort()))
        })
    }
}

fn invoke(
    router: &dyn EngineRouter,
    authorizer: &dyn Authorizer,
    command: &Command,
    execution: Execution,
) -> Outcome {
    let engine = router.select(command)?;
    let invocation = engine.prepare(command)?;
    debug!(produces = %invocation.produces(), "prepared invocation");
    authorizer.check(command.owner(), invocation.requires())?;
    execution.run(invocation).map(Some)
}
