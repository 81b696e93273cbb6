//! Configurable engine and invocation doubles.
//!
//! Shared by the unit tests of this crate and the routing/orchestration
//! suites in `datagate-runtime`. A [`StubEngine`] is scripted at
//! construction (where to fail, whether to block until cancelled) and
//! exposes a [`Recorder`] so tests can assert which contract operations
//! ran and how often.

use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use datagate_auth::Permission;
use datagate_types::{Language, MediaType};

use crate::command::Command;
use crate::contract::{CancelToken, Engine, Invocation};
use crate::error::GatewayError;

/// Call counts recorded by a [`StubEngine`] and its invocations.
#[derive(Debug, Default)]
pub struct Recorder {
    prepared: AtomicUsize,
    executed: AtomicUsize,
    written: AtomicUsize,
    closed: AtomicUsize,
    cancel_observed: AtomicBool,
}

impl Recorder {
    /// Number of `prepare` calls on the engine.
    #[must_use]
    pub fn prepared(&self) -> usize {
        self.prepared.load(Ordering::SeqCst)
    }

    /// Number of `execute` calls across all invocations.
    #[must_use]
    pub fn executed(&self) -> usize {
        self.executed.load(Ordering::SeqCst)
    }

    /// Number of `write` calls across all invocations.
    #[must_use]
    pub fn written(&self) -> usize {
        self.written.load(Ordering::SeqCst)
    }

    /// Number of `close` calls across all invocations.
    #[must_use]
    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    /// Whether any invocation observed its token cancelled.
    #[must_use]
    pub fn cancel_observed(&self) -> bool {
        self.cancel_observed.load(Ordering::SeqCst)
    }
}

/// Scripted [`Engine`] double.
///
/// # Example
///
/// ```
/// use datagate_engine::testing::StubEngine;
/// use datagate_engine::{CancelToken, Command, Engine, Invocation};
/// use datagate_types::Language;
///
/// let engine = StubEngine::new(Language::Sql).payload(b"a,b\n".to_vec());
/// let command = Command::builder().build();
///
/// let mut invocation = engine.prepare(&command).unwrap();
/// assert_eq!(engine.recorder().prepared(), 1);
///
/// let token = CancelToken::new();
/// invocation.execute(&token).unwrap();
/// let mut sink = Vec::new();
/// invocation.write(&mut sink, &token).unwrap();
/// assert_eq!(sink, b"a,b\n");
/// ```
pub struct StubEngine {
    language: Language,
    requires: Permission,
    produces: MediaType,
    payload: Vec<u8>,
    fail_prepare: Option<GatewayError>,
    fail_execute: Option<GatewayError>,
    fail_write: Option<GatewayError>,
    block_until_cancelled: bool,
    recorder: Arc<Recorder>,
}

impl StubEngine {
    /// Creates a well-behaved engine for `language`: read permission,
    /// `application/json` results, `b"ok"` payload.
    #[must_use]
    pub fn new(language: Language) -> Self {
        Self {
            language,
            requires: Permission::InvokeQuery,
            produces: MediaType::new("application", "json"),
            payload: b"ok".to_vec(),
            fail_prepare: None,
            fail_execute: None,
            fail_write: None,
            block_until_cancelled: false,
            recorder: Arc::new(Recorder::default()),
        }
    }

    /// Sets the permission prepared invocations require.
    #[must_use]
    pub fn requires(mut self, permission: Permission) -> Self {
        self.requires = permission;
        self
    }

    /// Sets the declared result media type.
    #[must_use]
    pub fn produces(mut self, media: MediaType) -> Self {
        self.produces = media;
        self
    }

    /// Sets the bytes `write` emits.
    #[must_use]
    pub fn payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    /// Makes `prepare` fail with `error`.
    #[must_use]
    pub fn fail_prepare(mut self, error: GatewayError) -> Self {
        self.fail_prepare = Some(error);
        self
    }

    /// Makes `execute` fail with `error`.
    #[must_use]
    pub fn fail_execute(mut self, error: GatewayError) -> Self {
        self.fail_execute = Some(error);
        self
    }

    /// Makes `write` fail with `error`.
    #[must_use]
    pub fn fail_write(mut self, error: GatewayError) -> Self {
        self.fail_write = Some(error);
        self
    }

    /// Makes `execute` spin (polling its token) until cancelled, then
    /// return [`GatewayError::Cancelled`]. A safety limit of five
    /// seconds keeps a missed cancellation from hanging the test run.
    #[must_use]
    pub fn block_until_cancelled(mut self) -> Self {
        self.block_until_cancelled = true;
        self
    }

    /// The shared call recorder.
    #[must_use]
    pub fn recorder(&self) -> Arc<Recorder> {
        self.recorder.clone()
    }
}

impl Engine for StubEngine {
    fn language(&self) -> Language {
        self.language
    }

    fn prepare(&self, _command: &Command) -> Result<Box<dyn Invocation>, GatewayError> {
        self.recorder.prepared.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.fail_prepare {
            return Err(error.clone());
        }
        Ok(Box::new(StubInvocation {
            requires: self.requires,
            produces: self.produces.clone(),
            payload: self.payload.clone(),
            fail_execute: self.fail_execute.clone(),
            fail_write: self.fail_write.clone(),
            block_until_cancelled: self.block_until_cancelled,
            recorder: self.recorder.clone(),
        }))
    }
}

struct StubInvocation {
    requires: Permission,
    produces: MediaType,
    payload: Vec<u8>,
    fail_execute: Option<GatewayError>,
    fail_write: Option<GatewayError>,
    block_until_cancelled: bool,
    recorder: Arc<Recorder>,
}

impl Invocation for StubInvocation {
    fn requires(&self) -> Permission {
        self.requires
    }

    fn produces(&self) -> MediaType {
        self.produces.clone()
    }

    fn execute(&mut self, cancel: &CancelToken) -> Result<(), GatewayError> {
        self.recorder.executed.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.fail_execute.take() {
            return Err(error);
        }
        if self.block_until_cancelled {
            let started = std::time::Instant::now();
            while started.elapsed() < Duration::from_secs(5) {
                if cancel.is_cancelled() {
                    self.recorder.cancel_observed.store(true, Ordering::SeqCst);
                    return Err(GatewayError::Cancelled);
                }
                std::thread::sleep(Duration::from_millis(2));
            }
            return Err(GatewayError::Execution("cancellation never arrived".into()));
        }
        cancel.bail_if_cancelled()
    }

    fn write(&mut self, sink: &mut dyn Write, cancel: &CancelToken) -> Result<(), GatewayError> {
        self.recorder.written.fetch_add(1, Ordering::SeqCst);
        cancel.bail_if_cancelled()?;
        if let Some(error) = self.fail_write.take() {
            return Err(error);
        }
        sink.write_all(&self.payload)
            .map_err(|e| GatewayError::Execution(e.to_string()))
    }

    fn close(&mut self) {
        self.recorder.closed.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command() -> Command {
        Command::builder().build()
    }

    #[test]
    fn happy_path_records_each_step() {
        let engine = StubEngine::new(Language::Sparql);
        let recorder = engine.recorder();
        let token = CancelToken::new();

        let mut invocation = engine.prepare(&command()).unwrap();
        invocation.execute(&token).unwrap();
        let mut sink = Vec::new();
        invocation.write(&mut sink, &token).unwrap();
        invocation.close();

        assert_eq!(recorder.prepared(), 1);
        assert_eq!(recorder.executed(), 1);
        assert_eq!(recorder.written(), 1);
        assert_eq!(recorder.closed(), 1);
        assert_eq!(sink, b"ok");
    }

    #[test]
    fn scripted_failures_surface_unchanged() {
        let engine = StubEngine::new(Language::Sql)
            .fail_prepare(GatewayError::InvalidCommand("no query".into()));
        assert_eq!(
            engine.prepare(&command()).err(),
            Some(GatewayError::InvalidCommand("no query".into()))
        );

        let engine = StubEngine::new(Language::Sql)
            .fail_execute(GatewayError::Execution("backend down".into()));
        let mut invocation = engine.prepare(&command()).unwrap();
        assert!(invocation.execute(&CancelToken::new()).is_err());
    }

    #[test]
    fn blocking_execute_reacts_to_cancellation() {
        let engine = StubEngine::new(Language::Sql).block_until_cancelled();
        let recorder = engine.recorder();
        let mut invocation = engine.prepare(&command()).unwrap();

        let token = CancelToken::new();
        let remote = token.clone();
        let canceller = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            remote.cancel();
        });

        assert_eq!(invocation.execute(&token), Err(GatewayError::Cancelled));
        canceller.join().unwrap();
        assert!(recorder.cancel_observed());
    }
}
