use std::time::Duration;

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};
use crate::hex::to_hex;

/// Header: source (1) + length (1) + destination (1) = 3 bytes.
pub const HEADER_SIZE: usize = 3;

/// Smallest wire packet: header + checksum, empty payload.
pub const MIN_PACKET_LEN: usize = HEADER_SIZE + 1;

/// Smallest input accepted by [`decode_packet`].
pub const MIN_DECODE_LEN: usize = MIN_PACKET_LEN + 1;

/// Largest payload the length byte can describe (0xFF - 2).
pub const MAX_PAYLOAD_LEN: usize = u8::MAX as usize - 2;

/// Default gap after which a partially received packet is abandoned.
pub const DEFAULT_BYTE_TIMEOUT: Duration = Duration::from_millis(50);

/// A bus packet: addresses plus payload.
///
/// Length and checksum are not stored; they are derived when the packet is
/// encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Packet {
    source: u8,
    destination: u8,
    payload: Bytes,
}

impl Packet {
    /// Create a packet, rejecting payloads the length byte cannot describe.
    pub fn new(source: u8, destination: u8, payload: impl Into<Bytes>) -> Result<Self> {
        let payload = payload.into();
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(FrameError::PayloadTooLarge {
                size: payload.len(),
                max: MAX_PAYLOAD_LEN,
            });
        }
        Ok(Self {
            source,
            destination,
            payload,
        })
    }

    /// Build from wire bytes whose length and checksum were already checked.
    pub(crate) fn from_verified_wire(wire: &[u8]) -> Self {
        let end = wire.len() - 1;
        Self {
            source: wire[0],
            destination: wire[2],
            payload: Bytes::copy_from_slice(&wire[HEADER_SIZE..end]),
        }
    }

    /// Source node address.
    pub fn source(&self) -> u8 {
        self.source
    }

    /// Destination node address.
    pub fn destination(&self) -> u8 {
        self.destination
    }

    /// The packet contents.
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// The total wire size of this packet (header + payload + checksum).
    pub fn wire_size(&self) -> usize {
        self.payload.len() + MIN_PACKET_LEN
    }

    /// Encode this packet into its wire form.
    pub fn to_wire(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.wire_size());
        put_wire(self.source, self.destination, &self.payload, &mut buf);
        buf.freeze()
    }
}

impl std::fmt::Display for Packet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&to_hex(&self.to_wire()))
    }
}

/// XOR of all bytes. A well-formed packet has a checksum of zero over its
/// entire wire form.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |acc, b| acc ^ b)
}

/// Encode a packet into the wire format.
///
/// Wire format:
/// ```text
/// ┌────────┬───────────┬─────────────┬───────────────┬──────────┐
/// │ Source │ Length    │ Destination │ Payload       │ Checksum │
/// │ (1B)   │ (len + 2) │ (1B)        │ (len bytes)   │ (XOR)    │
/// └────────┴───────────┴─────────────┴───────────────┴──────────┘
/// ```
pub fn encode_packet(source: u8, destination: u8, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD_LEN,
        });
    }
    put_wire(source, destination, payload, dst);
    Ok(())
}

fn put_wire(source: u8, destination: u8, payload: &[u8], dst: &mut BytesMut) {
    let start = dst.len();
    dst.reserve(payload.len() + MIN_PACKET_LEN);
    dst.put_u8(source);
    dst.put_u8((payload.len() + 2) as u8);
    dst.put_u8(destination);
    dst.put_slice(payload);
    let sum = checksum(&dst[start..]);
    dst.put_u8(sum);
}

/// Decode one complete, already delimited packet.
///
/// Fails if the input is shorter than [`MIN_DECODE_LEN`], if the length byte
/// disagrees with the input size, or if the checksum does not match.
pub fn decode_packet(wire: &[u8]) -> Result<Packet> {
    if wire.len() < MIN_DECODE_LEN {
        return Err(FrameError::TooShort {
            len: wire.len(),
            min: MIN_DECODE_LEN,
        });
    }

    let expected = wire[1] as usize + 2;
    if expected != wire.len() {
        return Err(FrameError::LengthMismatch {
            expected,
            actual: wire.len(),
        });
    }

    let (body, tail) = wire.split_at(wire.len() - 1);
    let computed = checksum(body);
    let found = tail[0];
    if computed != found {
        return Err(FrameError::ChecksumMismatch { computed, found });
    }

    Ok(Packet::from_verified_wire(wire))
}

/// Configuration for the packet reader.
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Longest gap tolerated between two bytes of the same packet.
    /// The first byte of a packet is always awaited indefinitely.
    pub byte_timeout: Duration,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            byte_timeout: DEFAULT_BYTE_TIMEOUT,
        }
    }
}
