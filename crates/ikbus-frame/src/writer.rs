use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use tracing::trace;

use crate::codec::{encode_packet, Packet, MAX_PAYLOAD_LEN, MIN_PACKET_LEN};
use crate::error::{FrameError, Result};

/// Encodes packets and writes them to any `Write` sink, one packet per call.
pub struct PacketWriter<W> {
    inner: W,
    buf: BytesMut,
}

impl<W: Write> PacketWriter<W> {
    /// Create a writer over `inner`.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(MAX_PAYLOAD_LEN + MIN_PACKET_LEN),
        }
    }

    /// Write a complete packet and flush (blocking).
    pub fn write_packet(&mut self, packet: &Packet) -> Result<()> {
        self.send(packet.source(), packet.destination(), packet.payload())
    }

    /// Encode and write a packet from its parts.
    pub fn send(&mut self, source: u8, destination: u8, payload: &[u8]) -> Result<()> {
        self.buf.clear();
        encode_packet(source, destination, payload, &mut self.buf)?;

        let mut written = 0usize;
        while written < self.buf.len() {
            match self.inner.write(&self.buf[written..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => written += n,
                Err(err) if retryable(err.kind()) => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
        trace!(source, destination, len = written, "packet written");

        self.flush()
    }

    /// Flush the underlying sink.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if retryable(err.kind()) => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying sink.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Mutably borrow the underlying sink.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Consume the writer and return the sink.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

fn retryable(kind: ErrorKind) -> bool {
    matches!(kind, ErrorKind::Interrupted | ErrorKind::WouldBlock)
}
