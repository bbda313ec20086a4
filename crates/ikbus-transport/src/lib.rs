//! Timed byte reads over blocking streams.
//!
//! A live bus link has no out-of-band framing, so the frame reader above this
//! layer needs to know when the line went quiet. Plain [`std::io::Read`]
//! streams offer no per-call deadline, so this crate moves the blocking reads
//! onto a dedicated worker and hands bytes over a single-slot channel that the
//! caller can wait on with a timeout.
//!
//! This is the lowest layer of ikbus. The frame reader builds on the
//! [`ByteSource`] trait provided here.

pub mod error;
pub mod timed;
pub mod traits;

#[cfg(feature = "async")]
pub mod async_source;

pub use error::{Result, TransportError};
pub use timed::TimedByteSource;
pub use traits::{ByteRead, ByteSource, StreamCloser};

#[cfg(feature = "async")]
pub use async_source::AsyncTimedByteSource;
