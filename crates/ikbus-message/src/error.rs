/// Errors raised by the message layer.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    /// A parser recognized the packet but could not make sense of it.
    #[error("{parser}: {reason}")]
    Parse { parser: String, reason: String },

    /// A module table could not be deserialized.
    #[error("invalid module table: {0}")]
    Json(#[from] serde_json::Error),

    /// Two module descriptors share an address.
    #[error("duplicate module address 0x{0:02X}")]
    DuplicateModule(u8),

    /// A message could not be turned back into a packet.
    #[error(transparent)]
    Frame(#[from] ikbus_frame::FrameError),
}

impl MessageError {
    /// A recognized packet that `parser` could not make sense of.
    pub fn parse(parser: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            parser: parser.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MessageError>;
