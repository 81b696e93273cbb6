//! Write-once result handle.

use std::io::Write;

use datagate_types::MediaType;

use crate::error::GatewayError;

/// Deferred serialization closure carried by [`StreamedResults`].
pub type WriteOp = Box<dyn FnOnce(&mut dyn Write) -> Result<(), GatewayError> + Send>;

type Observer = Box<dyn FnOnce(&Result<(), GatewayError>) + Send>;

/// Pairs a media type with a single deferred write operation.
///
/// The transport layer receives one `StreamedResults` per successful
/// request and calls [`write`](Self::write) on whatever thread owns the
/// response, decoupling "do the work" (already done on the worker) from
/// "send the bytes". `write` consumes the handle, so calling it twice is
/// unrepresentable.
///
/// Dropping an unconsumed handle runs its abandon hook (cancelling and
/// releasing the underlying invocation) and notifies observers with a
/// cancellation outcome, so a client that disconnects between execution
/// and streaming still releases every resource and still produces a
/// terminal event.
///
/// # Example
///
/// ```
/// use datagate_engine::StreamedResults;
/// use datagate_types::MediaType;
/// # use std::io::Write;
///
/// let results = StreamedResults::new(MediaType::new("text", "csv"), |sink| {
///     sink.write_all(b"a,b\n1,2\n")
///         .map_err(|e| datagate_engine::GatewayError::Execution(e.to_string()))
/// });
///
/// let mut buffer = Vec::new();
/// results.write(&mut buffer).unwrap();
/// assert_eq!(buffer, b"a,b\n1,2\n");
/// ```
pub struct StreamedResults {
    media_type: MediaType,
    write_op: Option<WriteOp>,
    observers: Vec<Observer>,
    abandon: Option<Box<dyn FnOnce() + Send>>,
}

impl StreamedResults {
    /// Creates a result handle around a deferred write operation.
    #[must_use]
    pub fn new(
        media_type: MediaType,
        write: impl FnOnce(&mut dyn Write) -> Result<(), GatewayError> + Send + 'static,
    ) -> Self {
        Self {
            media_type,
            write_op: Some(Box::new(write)),
            observers: Vec::new(),
            abandon: None,
        }
    }

    /// The media type the write operation will produce.
    #[must_use]
    pub fn media_type(&self) -> &MediaType {
        &self.media_type
    }

    /// Registers a hook that runs if the handle is dropped without being
    /// written, the disconnect-before-streaming path. Used by the
    /// execution layer to cancel and release the invocation.
    #[must_use]
    pub fn on_abandon(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        debug_assert!(self.abandon.is_none(), "abandon hook already set");
        self.abandon = Some(Box::new(hook));
        self
    }

    /// Registers an observer of the write outcome.
    ///
    /// Observers run exactly once: after [`write`](Self::write) with its
    /// result, or on drop-without-write with a
    /// [`GatewayError::Cancelled`] outcome. Registration order is
    /// preserved.
    #[must_use]
    pub fn inspect(
        mut self,
        observer: impl FnOnce(&Result<(), GatewayError>) + Send + 'static,
    ) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    /// Serializes the results into `sink`, consuming the handle.
    ///
    /// # Errors
    ///
    /// Propagates the write operation's failure unchanged, after
    /// notifying observers.
    pub fn write(mut self, sink: &mut dyn Write) -> Result<(), GatewayError> {
        let op = self
            .write_op
            .take()
            .expect("write operation present until first write");
        self.abandon = None; // the operation itself releases resources
        let result = op(sink);
        for observer in self.observers.drain(..) {
            observer(&result);
        }
        result
    }
}

impl Drop for StreamedResults {
    fn drop(&mut self) {
        if self.write_op.take().is_some() {
            if let Some(hook) = self.abandon.take() {
                hook();
            }
            let outcome = Err(GatewayError::Cancelled);
            for observer in self.observers.drain(..) {
                observer(&outcome);
            }
        }
    }
}

impl std::fmt::Debug for StreamedResults {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamedResults")
            .field("media_type", &self.media_type)
            .field("written", &self.write_op.is_none())
            .finish()
    }
}
