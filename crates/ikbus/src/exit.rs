use std::fmt;
use std::io;

use ikbus_frame::FrameError;
use ikbus_message::MessageError;
use ikbus_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const NOT_FOUND: i32 = 51;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound => NOT_FOUND,
        io::ErrorKind::BrokenPipe | io::ErrorKind::UnexpectedEof => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Read(source) | TransportError::Close(source) => io_error(context, source),
        TransportError::Spawn(source) => CliError::new(INTERNAL, format!("{context}: {source}")),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Transport(err) => transport_error(context, err),
        FrameError::Io(source) => io_error(context, source),
        FrameError::ConnectionClosed => CliError::new(FAILURE, format!("{context}: {err}")),
        invalid => CliError::new(DATA_INVALID, format!("{context}: {invalid}")),
    }
}

pub fn message_error(context: &str, err: MessageError) -> CliError {
    match err {
        MessageError::Frame(err) => frame_error(context, err),
        invalid => CliError::new(DATA_INVALID, format!("{context}: {invalid}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_packets_map_to_data_invalid() {
        let err = frame_error(
            "decode failed",
            FrameError::ChecksumMismatch {
                computed: 0x00,
                found: 0x09,
            },
        );
        assert_eq!(err.code, DATA_INVALID);
        assert!(err.to_string().starts_with("decode failed: invalid checksum"));
    }

    #[test]
    fn io_errors_keep_their_kind() {
        let err = frame_error(
            "read failed",
            FrameError::Transport(TransportError::Read(io::Error::from(
                io::ErrorKind::PermissionDenied,
            ))),
        );
        assert_eq!(err.code, PERMISSION_DENIED);

        let err = io_error("open failed", io::Error::from(io::ErrorKind::NotFound));
        assert_eq!(err.code, NOT_FOUND);
    }

    #[test]
    fn closed_source_is_transport_error() {
        let err = frame_error("read failed", FrameError::Transport(TransportError::Closed));
        assert_eq!(err.code, TRANSPORT_ERROR);
    }

    #[test]
    fn module_table_errors_are_data_invalid() {
        let err = message_error("modules", MessageError::DuplicateModule(0x68));
        assert_eq!(err.code, DATA_INVALID);
        assert_eq!(err.to_string(), "modules: duplicate module address 0x68");
    }
}
