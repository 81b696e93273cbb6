//! Background worker scheduling.

use std::sync::Arc;

use tokio::runtime::{Builder, Handle, Runtime};
use tracing::debug;

/// Runs blocking engine work off the transport thread.
///
/// Engine `execute`/`write` calls may block on I/O for a long time, so
/// the invoker never runs them where a command was accepted. A scheduler
/// either owns a [dedicated](Self::dedicated) runtime with a bounded
/// worker pool, or [borrows](Self::attached) an existing runtime's
/// blocking pool (useful in tests).
///
/// Cloning is cheap; clones share the same pool.
///
/// # Example
///
/// ```
/// use datagate_runtime::Scheduler;
/// use std::sync::mpsc;
///
/// let scheduler = Scheduler::dedicated(2).unwrap();
/// let (tx, rx) = mpsc::channel();
/// scheduler.execute(move || tx.send(21 * 2).unwrap());
/// assert_eq!(rx.recv().unwrap(), 42);
/// ```
#[derive(Clone)]
pub struct Scheduler {
    handle: Handle,
    // keeps a dedicated runtime alive for as long as any clone exists
    owned: Option<Arc<OwnedRuntime>>,
}

struct OwnedRuntime(Option<Runtime>);

impl Drop for OwnedRuntime {
    fn drop(&mut self) {
        if let Some(runtime) = self.0.take() {
            // safe to drop from async contexts, unlike Runtime's own Drop
            runtime.shutdown_background();
        }
    }
}

impl Scheduler {
    /// Builds a scheduler owning its runtime, with at most
    /// `worker_threads` concurrent executions.
    ///
    /// # Errors
    ///
    /// Propagates runtime construction failure.
    pub fn dedicated(worker_threads: usize) -> std::io::Result<Self> {
        let threads = worker_threads.max(1);
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(threads)
            .thread_name("datagate-worker")
            .enable_time()
            .build()?;
        debug!(worker_threads = threads, "dedicated worker scheduler started");
        Ok(Self {
            handle: runtime.handle().clone(),
            owned: Some(Arc::new(OwnedRuntime(Some(runtime)))),
        })
    }

    /// Borrows an existing runtime's blocking pool.
    #[must_use]
    pub fn attached(handle: Handle) -> Self {
        Self {
            handle,
            owned: None,
        }
    }

    /// Attaches to the runtime of the calling context.
    ///
    /// # Panics
    ///
    /// Panics outside a tokio runtime, like [`Handle::current`].
    #[must_use]
    pub fn current() -> Self {
        Self::attached(Handle::current())
    }

    /// Schedules a blocking job on the worker pool.
    pub fn execute(&self, job: impl FnOnce() + Send + 'static) {
        self.handle.spawn_blocking(job);
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("dedicated", &self.owned.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::time::Duration;

    use super::*;

    #[test]
    fn dedicated_scheduler_runs_jobs() {
        let scheduler = Scheduler::dedicated(1).unwrap();
        let (tx, rx) = mpsc::channel();
        scheduler.execute(move || tx.send("done").unwrap());
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), "done");
    }

    #[test]
    fn clones_share_the_pool() {
        let scheduler = Scheduler::dedicated(2).unwrap();
        let clone = scheduler.clone();
        let (tx, rx) = mpsc::channel();
        let tx2 = tx.clone();
        scheduler.execute(move || tx.send(1).unwrap());
        clone.execute(move || tx2.send(2).unwrap());

        let mut seen: Vec<i32> = (0..2)
            .map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap())
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, [1, 2]);
    }

    #[tokio::test]
    async fn attached_scheduler_uses_the_ambient_runtime() {
        let scheduler = Scheduler::current();
        let (tx, rx) = mpsc::channel();
        scheduler.execute(move || tx.send(()).unwrap());
        tokio::task::spawn_blocking(move || rx.recv_timeout(Duration::from_secs(5)).unwrap())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn dedicated_scheduler_can_be_dropped_in_async_context() {
        let scheduler = Scheduler::dedicated(1).unwrap();
        let (tx, rx) = mpsc::channel();
        scheduler.execute(move || tx.send(()).unwrap());
        tokio::task::spawn_blocking(move || rx.recv_timeout(Duration::from_secs(5)).unwrap())
            .await
            .unwrap();
        drop(scheduler); // must not panic
    }
}
