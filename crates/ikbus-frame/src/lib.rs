//! I/K-bus packet framing.
//!
//! Every packet on the wire has the shape:
//! - 1-byte source address
//! - 1-byte length (payload length + 2)
//! - 1-byte destination address
//! - the payload
//! - 1-byte checksum, chosen so the XOR of the whole packet is zero
//!
//! The bus has no delimiters and collisions corrupt frames, so the
//! [`PacketReader`] recovers packet boundaries from content and byte timing,
//! yielding either valid packets or runs of corrupted bytes.

pub mod codec;
pub mod element;
pub mod error;
pub mod hex;
pub mod reader;
mod resync;
pub mod writer;

#[cfg(feature = "async")]
pub mod async_reader;

pub use codec::{
    checksum, decode_packet, encode_packet, Packet, ReaderConfig, DEFAULT_BYTE_TIMEOUT,
    HEADER_SIZE, MAX_PAYLOAD_LEN, MIN_DECODE_LEN, MIN_PACKET_LEN,
};
pub use element::StreamElement;
pub use error::{FrameError, Result};
pub use hex::{parse_hex, to_hex};
pub use reader::PacketReader;
pub use writer::PacketWriter;

#[cfg(feature = "async")]
pub use async_reader::AsyncPacketReader;
