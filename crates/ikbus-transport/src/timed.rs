use std::io::{ErrorKind, Read};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::error::{Result, TransportError};
use crate::traits::{effective_timeout, ByteRead, ByteSource, StreamCloser};

const WORKER_THREAD_NAME: &str = "ikbus-byte-reader";

/// What the worker hands across the slot after each physical read.
#[derive(Debug)]
enum Handoff {
    Byte(u8),
    EndOfStream,
    Failed(std::io::Error),
}

/// Reads single bytes from a blocking stream with a per-call timeout.
///
/// A dedicated worker thread performs the blocking `read()` calls and passes
/// each result through a zero-capacity (rendezvous) channel. The worker can
/// only start its next physical read once the previous result has been taken,
/// so at most one byte is ever read ahead of the caller.
///
/// A read that times out consumes nothing: the byte the worker eventually
/// produces is returned by the next call.
///
/// Always close the source (or drop it) when done. If the stream cannot be
/// closed from outside (no [`StreamCloser`]), a worker blocked in `read()`
/// stays parked until the stream yields, and exits at its next handoff.
pub struct TimedByteSource {
    slot: Option<Receiver<Handoff>>,
    closer: Option<Box<dyn StreamCloser>>,
    worker: Option<JoinHandle<()>>,
    end_of_stream: bool,
    default_timeout: Option<Duration>,
}

impl TimedByteSource {
    /// Wrap a stream. Reads through [`read`](Self::read) wait indefinitely.
    pub fn new<R>(inner: R) -> Result<Self>
    where
        R: Read + Send + 'static,
    {
        Self::spawn(inner, None)
    }

    /// Wrap a stream together with a handle that can close it from this side.
    ///
    /// The closer is invoked by [`close`](Self::close) before the handoff is
    /// torn down, which unblocks a worker parked inside `read()`.
    pub fn with_closer<R, C>(inner: R, closer: C) -> Result<Self>
    where
        R: Read + Send + 'static,
        C: StreamCloser + 'static,
    {
        Self::spawn(inner, Some(Box::new(closer)))
    }

    /// Set the timeout used by [`read`](Self::read).
    pub fn with_default_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.default_timeout = timeout;
        self
    }

    fn spawn<R>(inner: R, closer: Option<Box<dyn StreamCloser>>) -> Result<Self>
    where
        R: Read + Send + 'static,
    {
        let (tx, rx) = mpsc::sync_channel(0);
        let worker = std::thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || pump(inner, tx))
            .map_err(TransportError::Spawn)?;
        debug!("started byte reader worker");

        Ok(Self {
            slot: Some(rx),
            closer,
            worker: Some(worker),
            end_of_stream: false,
            default_timeout: None,
        })
    }

    /// Timeout used by [`read`](Self::read).
    pub fn default_timeout(&self) -> Option<Duration> {
        self.default_timeout
    }

    /// Update the timeout used by [`read`](Self::read).
    pub fn set_default_timeout(&mut self, timeout: Option<Duration>) {
        self.default_timeout = timeout;
    }

    /// Read the next byte using the default timeout.
    pub fn read(&mut self) -> Result<ByteRead> {
        self.read_byte(self.default_timeout)
    }

    /// Read the next byte, waiting at most `timeout`.
    ///
    /// A result that is already waiting in the slot is returned immediately,
    /// regardless of the timeout.
    pub fn read_byte(&mut self, timeout: Option<Duration>) -> Result<ByteRead> {
        let Some(slot) = self.slot.as_ref() else {
            return Err(TransportError::Closed);
        };
        if self.end_of_stream {
            return Ok(ByteRead::EndOfStream);
        }

        let timeout = effective_timeout(timeout);
        let received = match timeout {
            Some(limit) => slot.recv_timeout(limit),
            None => slot.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok(Handoff::Byte(byte)) => Ok(ByteRead::Byte(byte)),
            Ok(Handoff::EndOfStream) => {
                debug!("byte source reached end of stream");
                self.end_of_stream = true;
                Ok(ByteRead::EndOfStream)
            }
            Ok(Handoff::Failed(err)) => {
                self.end_of_stream = true;
                Err(TransportError::Read(err))
            }
            Err(RecvTimeoutError::Timeout) => {
                trace!(?timeout, "byte read timed out");
                Ok(ByteRead::Timeout)
            }
            Err(RecvTimeoutError::Disconnected) => {
                self.end_of_stream = true;
                Err(TransportError::WorkerLost)
            }
        }
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.slot.is_none()
    }

    /// Close the underlying stream, then tear down the handoff.
    ///
    /// Calling this more than once is a no-op. A failure to close the stream
    /// is reported after the worker has been cut loose.
    pub fn close(&mut self) -> Result<()> {
        let Some(slot) = self.slot.take() else {
            return Ok(());
        };

        let closed = match self.closer.take() {
            Some(mut closer) => closer.close(),
            None => Ok(()),
        };

        // Dropping the receiver fails the worker's next send.
        drop(slot);

        if let Some(worker) = self.worker.take() {
            if worker.is_finished() {
                let _ = worker.join();
            } else {
                debug!("byte reader worker still blocked in read; detaching");
            }
        }

        closed.map_err(|err| {
            warn!(error = %err, "failed to close underlying stream");
            TransportError::Close(err)
        })
    }
}

impl ByteSource for TimedByteSource {
    fn read_byte(&mut self, timeout: Option<Duration>) -> Result<ByteRead> {
        TimedByteSource::read_byte(self, timeout)
    }

    fn close(&mut self) -> Result<()> {
        TimedByteSource::close(self)
    }
}

impl Drop for TimedByteSource {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

impl std::fmt::Debug for TimedByteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimedByteSource")
            .field("closed", &self.is_closed())
            .field("end_of_stream", &self.end_of_stream)
            .field("default_timeout", &self.default_timeout)
            .finish()
    }
}

/// Worker loop: one blocking read per handoff.
fn pump<R: Read>(mut inner: R, slot: SyncSender<Handoff>) {
    let mut buf = [0u8; 1];
    loop {
        let handoff = match inner.read(&mut buf) {
            Ok(0) => Handoff::EndOfStream,
            Ok(_) => Handoff::Byte(buf[0]),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => Handoff::Failed(err),
        };
        let last = !matches!(handoff, Handoff::Byte(_));

        if slot.send(handoff).is_err() {
            trace!("handoff slot closed; stopping byte reader worker");
            return;
        }
        if last {
            trace!("byte reader worker finished");
            return;
        }
    }
}
