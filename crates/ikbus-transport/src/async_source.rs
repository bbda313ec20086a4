use std::io::ErrorKind;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::error::{Result, TransportError};
use crate::traits::{effective_timeout, ByteRead};

#[derive(Debug)]
enum Handoff {
    Byte(u8),
    EndOfStream,
    Failed(std::io::Error),
}

/// Async counterpart of [`TimedByteSource`](crate::TimedByteSource).
///
/// A spawned task reads one byte at a time and hands it over a capacity-1
/// channel. The task reserves the slot before each read, so it never reads
/// more than one byte ahead of the caller. Closing cancels the task through a
/// [`CancellationToken`], which also drops any read still pending.
pub struct AsyncTimedByteSource {
    slot: Option<mpsc::Receiver<Handoff>>,
    cancel: CancellationToken,
    worker: Option<JoinHandle<()>>,
    end_of_stream: bool,
}

impl AsyncTimedByteSource {
    /// Wrap an async stream.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new<R>(inner: R) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(1);
        let cancel = CancellationToken::new();
        let worker = tokio::spawn(pump(inner, tx, cancel.clone()));
        debug!("started async byte reader task");

        Self {
            slot: Some(rx),
            cancel,
            worker: Some(worker),
            end_of_stream: false,
        }
    }

    /// Read the next byte, waiting at most `timeout` (`None` or zero waits
    /// indefinitely).
    pub async fn read_byte(&mut self, timeout: Option<Duration>) -> Result<ByteRead> {
        let Some(slot) = self.slot.as_mut() else {
            return Err(TransportError::Closed);
        };
        if self.end_of_stream {
            return Ok(ByteRead::EndOfStream);
        }

        let received = match effective_timeout(timeout) {
            Some(limit) => match tokio::time::timeout(limit, slot.recv()).await {
                Ok(received) => received,
                Err(_) => {
                    trace!(?limit, "byte read timed out");
                    return Ok(ByteRead::Timeout);
                }
            },
            None => slot.recv().await,
        };

        match received {
            Some(Handoff::Byte(byte)) => Ok(ByteRead::Byte(byte)),
            Some(Handoff::EndOfStream) => {
                debug!("async byte source reached end of stream");
                self.end_of_stream = true;
                Ok(ByteRead::EndOfStream)
            }
            Some(Handoff::Failed(err)) => {
                self.end_of_stream = true;
                Err(TransportError::Read(err))
            }
            None => {
                self.end_of_stream = true;
                Err(TransportError::WorkerLost)
            }
        }
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.slot.is_none()
    }

    /// Cancel the reader task and close the handoff. Idempotent.
    pub fn close(&mut self) -> Result<()> {
        let Some(mut slot) = self.slot.take() else {
            return Ok(());
        };
        self.cancel.cancel();
        slot.close();
        if let Some(worker) = self.worker.take() {
            worker.abort();
        }
        Ok(())
    }
}

impl Drop for AsyncTimedByteSource {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

impl std::fmt::Debug for AsyncTimedByteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncTimedByteSource")
            .field("closed", &self.is_closed())
            .field("end_of_stream", &self.end_of_stream)
            .finish()
    }
}

async fn pump<R>(mut inner: R, slot: mpsc::Sender<Handoff>, cancel: CancellationToken)
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; 1];
    loop {
        // Wait for the slot to drain before touching the stream again.
        let permit = tokio::select! {
            _ = cancel.cancelled() => return,
            permit = slot.reserve() => match permit {
                Ok(permit) => permit,
                Err(_) => return,
            },
        };

        let read = tokio::select! {
            _ = cancel.cancelled() => return,
            read = inner.read(&mut buf) => read,
        };
        let handoff = match read {
            Ok(0) => Handoff::EndOfStream,
            Ok(_) => Handoff::Byte(buf[0]),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => Handoff::Failed(err),
        };
        let last = !matches!(handoff, Handoff::Byte(_));

        permit.send(handoff);
        if last {
            trace!("async byte reader task finished");
            return;
        }
    }
}
