use std::io::Read;
use std::time::Duration;

use ikbus_transport::{ByteSource, TimedByteSource};

use crate::codec::ReaderConfig;
use crate::element::StreamElement;
use crate::error::Result;
use crate::resync::{Resync, Step};

/// Reads packets from a live byte source, recovering from corruption.
///
/// Each call to [`read`](Self::read) yields either a valid packet or a run of
/// bytes that could not be part of one, in stream order. Malformed data is
/// never an error; only a failing source is.
///
/// The first byte of a packet is awaited indefinitely. Once a packet has
/// started, a gap longer than [`ReaderConfig::byte_timeout`] abandons it.
pub struct PacketReader<S = TimedByteSource> {
    source: S,
    scanner: Resync,
    config: ReaderConfig,
}

impl<S: ByteSource> PacketReader<S> {
    /// Create a reader with default configuration.
    pub fn new(source: S) -> Self {
        Self::with_config(source, ReaderConfig::default())
    }

    /// Create a reader with explicit configuration.
    pub fn with_config(source: S, config: ReaderConfig) -> Self {
        Self {
            source,
            scanner: Resync::new(config.byte_timeout),
            config,
        }
    }

    /// Read the next stream element (blocking).
    ///
    /// Returns `Ok(None)` once the source has ended and everything buffered
    /// has been returned.
    pub fn read(&mut self) -> Result<Option<StreamElement>> {
        if let Some(element) = self.scanner.begin() {
            return Ok(Some(element));
        }

        loop {
            match self.scanner.poll() {
                Step::Emit(element) => return Ok(Some(element)),
                Step::Exhausted => return Ok(None),
                Step::NeedByte(timeout) => {
                    let read = self.source.read_byte(timeout)?;
                    self.scanner.feed(read);
                }
            }
        }
    }

    /// Close the underlying byte source.
    pub fn close(&mut self) -> Result<()> {
        self.source.close()?;
        Ok(())
    }

    /// Borrow the underlying byte source.
    pub fn get_ref(&self) -> &S {
        &self.source
    }

    /// Mutably borrow the underlying byte source.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Consume the reader and return the byte source. Buffered bytes are lost.
    pub fn into_inner(self) -> S {
        self.source
    }

    /// Update the inter-byte timeout for subsequent reads.
    pub fn set_byte_timeout(&mut self, timeout: Duration) {
        self.config.byte_timeout = timeout;
        self.scanner.set_byte_timeout(timeout);
    }

    /// Current reader configuration.
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }
}

impl PacketReader<TimedByteSource> {
    /// Wrap a blocking stream in a [`TimedByteSource`] and read from it.
    pub fn from_stream<R>(stream: R) -> Result<Self>
    where
        R: Read + Send + 'static,
    {
        Self::from_stream_with_config(stream, ReaderConfig::default())
    }

    /// Like [`from_stream`](Self::from_stream), with explicit configuration.
    pub fn from_stream_with_config<R>(stream: R, config: ReaderConfig) -> Result<Self>
    where
        R: Read + Send + 'static,
    {
        let source = TimedByteSource::new(stream)?;
        Ok(Self::with_config(source, config))
    }
}

impl<S: ByteSource> Iterator for PacketReader<S> {
    type Item = Result<StreamElement>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read().transpose()
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for PacketReader<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PacketReader")
            .field("source", &self.source)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
