use std::time::Duration;

use crate::error::Result;

/// Outcome of a single timed byte read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteRead {
    /// The next byte from the stream.
    Byte(u8),
    /// No byte arrived within the requested window. Nothing was consumed.
    Timeout,
    /// The stream has ended.
    EndOfStream,
}

impl ByteRead {
    /// The byte, if this read produced one.
    pub fn byte(self) -> Option<u8> {
        match self {
            ByteRead::Byte(b) => Some(b),
            _ => None,
        }
    }
}

/// A source of single bytes whose reads can be bounded by a timeout.
///
/// `None` (or a zero duration) waits indefinitely.
pub trait ByteSource {
    /// Read the next byte, waiting at most `timeout`.
    fn read_byte(&mut self, timeout: Option<Duration>) -> Result<ByteRead>;

    /// Release the source. Further reads fail.
    fn close(&mut self) -> Result<()>;
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn read_byte(&mut self, timeout: Option<Duration>) -> Result<ByteRead> {
        (**self).read_byte(timeout)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

/// Handle that can close a stream owned by another thread.
///
/// Closing the stream is what unblocks a worker parked inside `read()`.
pub trait StreamCloser: Send {
    fn close(&mut self) -> std::io::Result<()>;
}

#[cfg(unix)]
impl StreamCloser for std::os::unix::net::UnixStream {
    fn close(&mut self) -> std::io::Result<()> {
        self.shutdown(std::net::Shutdown::Both)
    }
}

impl StreamCloser for std::net::TcpStream {
    fn close(&mut self) -> std::io::Result<()> {
        self.shutdown(std::net::Shutdown::Both)
    }
}

/// Treat `None` and zero as "no deadline".
pub(crate) fn effective_timeout(timeout: Option<Duration>) -> Option<Duration> {
    timeout.filter(|t| !t.is_zero())
}
