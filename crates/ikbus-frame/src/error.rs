use ikbus_transport::TransportError;

/// Errors that can occur during packet encoding, decoding and streaming.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// Fewer bytes than the smallest decodable packet.
    #[error("packet too short ({len} bytes, need at least {min})")]
    TooShort { len: usize, min: usize },

    /// The length byte implies a different packet size than was supplied.
    #[error("length byte implies {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// The trailing checksum does not match the XOR of the packet.
    #[error("invalid checksum (computed 0x{computed:02X}, found 0x{found:02X})")]
    ChecksumMismatch { computed: u8, found: u8 },

    /// The payload does not fit in the one-byte length field.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// A hex byte string could not be parsed.
    #[error("invalid hex byte {token:?}")]
    InvalidHex { token: String },

    /// The timed byte source failed.
    #[error("byte source error: {0}")]
    Transport(#[from] TransportError),

    /// An I/O error occurred while writing packets.
    #[error("packet I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The sink stopped accepting bytes mid-packet.
    #[error("connection closed (incomplete packet)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
