//! Decode I/K-bus traffic from a live serial link.
//!
//! The bus has no framing of its own: packets are recovered from their
//! length byte, their XOR checksum and the gaps between bytes. Collisions
//! between modules are routine, so corrupted data is reported alongside valid
//! packets instead of as an error.
//!
//! # Crate Structure
//!
//! - [`transport`]: timed single-byte reads over blocking (or async) streams
//! - [`frame`]: packet codec, resynchronizing reader and writer
//! - [`message`]: parser chains, module tables and profiles (behind `message` feature)
//!
//! ```no_run
//! use ikbus::frame::PacketReader;
//!
//! # fn main() -> ikbus::frame::Result<()> {
//! let port = std::fs::File::open("/dev/ttyUSB0")?;
//! let mut reader = PacketReader::from_stream(port)?;
//! while let Some(element) = reader.read()? {
//!     println!("{element}");
//! }
//! # Ok(())
//! # }
//! ```

/// Re-export transport types.
pub mod transport {
    pub use ikbus_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use ikbus_frame::*;
}

/// Re-export message-layer types (requires `message` feature).
#[cfg(feature = "message")]
pub mod message {
    pub use ikbus_message::*;
}
