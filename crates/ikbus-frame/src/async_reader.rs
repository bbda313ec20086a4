use std::time::Duration;

use ikbus_transport::AsyncTimedByteSource;
use tokio::io::AsyncRead;

use crate::codec::ReaderConfig;
use crate::element::StreamElement;
use crate::error::Result;
use crate::resync::{Resync, Step};

/// Async counterpart of [`PacketReader`](crate::PacketReader).
///
/// Runs the same resynchronization over an [`AsyncTimedByteSource`], so both
/// readers classify a given byte stream identically.
#[derive(Debug)]
pub struct AsyncPacketReader {
    source: AsyncTimedByteSource,
    scanner: Resync,
    config: ReaderConfig,
}

impl AsyncPacketReader {
    /// Wrap an async stream. Must be called from within a Tokio runtime.
    pub fn new<R>(stream: R) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        Self::with_config(stream, ReaderConfig::default())
    }

    /// Wrap an async stream with explicit configuration.
    pub fn with_config<R>(stream: R, config: ReaderConfig) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        Self::from_source(AsyncTimedByteSource::new(stream), config)
    }

    /// Read from an existing byte source.
    pub fn from_source(source: AsyncTimedByteSource, config: ReaderConfig) -> Self {
        Self {
            source,
            scanner: Resync::new(config.byte_timeout),
            config,
        }
    }

    /// Read the next stream element.
    ///
    /// Returns `Ok(None)` once the stream has ended and everything buffered
    /// has been returned.
    pub async fn read(&mut self) -> Result<Option<StreamElement>> {
        if let Some(element) = self.scanner.begin() {
            return Ok(Some(element));
        }

        loop {
            match self.scanner.poll() {
                Step::Emit(element) => return Ok(Some(element)),
                Step::Exhausted => return Ok(None),
                Step::NeedByte(timeout) => {
                    let read = self.source.read_byte(timeout).await?;
                    self.scanner.feed(read);
                }
            }
        }
    }

    /// Stop the background reader task.
    pub fn close(&mut self) -> Result<()> {
        self.source.close()?;
        Ok(())
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
