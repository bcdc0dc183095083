//! Error types for the WebSocket frame engine.
//!
//! Every error is terminal for the connection that produced it. The variants
//! are grouped by the close status the engine answers with, see
//! [`Error::close_code`].

use thiserror::Error;

use crate::protocol::CloseCode;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while processing a WebSocket connection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// I/O error on the underlying stream.
    #[error("I/O error: {0}")]
    Io(String),

    /// The peer closed the stream between frames.
    #[error("Connection closed by peer")]
    ConnectionClosed,

    /// Structurally invalid frame header.
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    /// Reserved bits set without a negotiated extension.
    #[error("Reserved bits set without negotiated extension")]
    ReservedBitsSet,

    /// Reserved opcode used.
    #[error("Reserved opcode: {0:#x}")]
    ReservedOpcode(u8),

    /// Unmasked frame received from a client.
    #[error("Client frame must be masked")]
    UnmaskedClientFrame,

    /// Control frame with FIN=0.
    #[error("Control frames cannot be fragmented")]
    FragmentedControlFrame,

    /// Control frame payload larger than 125 bytes.
    #[error("Control frame payload too large: {0} bytes (max: 125)")]
    ControlFrameTooLarge(u64),

    /// Continuation frame received outside of a fragmented message.
    #[error("Unexpected continuation frame")]
    UnexpectedContinuation,

    /// New data frame received while a fragmented message is in progress.
    #[error("Expected continuation frame, got {0}")]
    ExpectedContinuation(&'static str),

    /// Invalid UTF-8 in a text message or close reason.
    #[error("Invalid UTF-8 in text payload")]
    InvalidUtf8,

    /// Malformed close frame payload.
    #[error("Invalid close frame: {0}")]
    InvalidCloseFrame(String),

    /// Close code that must not appear on the wire.
    #[error("Invalid close code: {0}")]
    InvalidCloseCode(u16),

    /// Frame payload exceeds the configured maximum.
    #[error("Frame too large: {size} bytes (max: {max})")]
    FrameTooLarge {
        /// Announced payload length.
        size: u64,
        /// Maximum allowed size.
        max: usize,
    },

    /// Reassembled message exceeds the configured maximum.
    #[error("Message too large: {size} bytes (max: {max})")]
    MessageTooLarge {
        /// Accumulated message size.
        size: usize,
        /// Maximum allowed size.
        max: usize,
    },

    /// Too many fragments in a single message.
    #[error("Too many fragments: {count} (max: {max})")]
    TooManyFragments {
        /// Fragment count so far.
        count: usize,
        /// Maximum allowed fragments.
        max: usize,
    },
}

impl Error {
    /// Status code the engine sends before tearing the connection down.
    ///
    /// Returns `None` for stream failures, where no close frame is attempted.
    #[must_use]
    pub const fn close_code(&self) -> Option<CloseCode> {
        match self {
            Error::Io(_) | Error::ConnectionClosed => None,
            Error::InvalidUtf8 => Some(CloseCode::InvalidPayload),
            Error::FrameTooLarge { .. }
            | Error::MessageTooLarge { .. }
            | Error::TooManyFragments { .. } => Some(CloseCode::MessageTooBig),
            Error::InvalidFrame(_)
            | Error::ReservedBitsSet
            | Error::ReservedOpcode(_)
            | Error::UnmaskedClientFrame
            | Error::FragmentedControlFrame
            | Error::ControlFrameTooLarge(_)
            | Error::UnexpectedContinuation
            | Error::ExpectedContinuation(_)
            | Error::InvalidCloseFrame(_)
            | Error::InvalidCloseCode(_) => Some(CloseCode::ProtocolError),
        }
    }

    /// Returns `true` if the transport itself failed.
    #[must_use]
    pub const fn is_stream_error(&self) -> bool {
        matches!(self, Error::Io(_) | Error::ConnectionClosed)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(_: std::str::Utf8Error) -> Self {
        Error::InvalidUtf8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::FrameTooLarge {
            size: 20_000_000,
            max: 16_000_000,
        };
        assert_eq!(
            err.to_string(),
            "Frame too large: 20000000 bytes (max: 16000000)"
        );
        assert_eq!(
            Error::ExpectedContinuation("Text").to_string(),
            "Expected continuation frame, got Text"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe broken");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.is_stream_error());
    }

    #[test]
    fn test_stream_errors_get_no_close_code() {
        assert_eq!(Error::ConnectionClosed.close_code(), None);
        assert_eq!(Error::Io("reset".into()).close_code(), None);
    }

    #[test]
    fn test_close_code_mapping() {
        assert_eq!(
            Error::InvalidUtf8.close_code(),
            Some(CloseCode::InvalidPayload)
        );
        assert_eq!(
            Error::UnexpectedContinuation.close_code(),
            Some(CloseCode::ProtocolError)
        );
        assert_eq!(
            Error::InvalidCloseCode(1006).close_code(),
            Some(CloseCode::ProtocolError)
        );
        assert_eq!(
            Error::ControlFrameTooLarge(126).close_code(),
            Some(CloseCode::ProtocolError)
        );
        assert_eq!(
            Error::FrameTooLarge { size: 10, max: 5 }.close_code(),
            Some(CloseCode::MessageTooBig)
        );
    }

    #[test]
    fn test_error_clone() {
        let err = Error::InvalidUtf8;
        assert_eq!(err.clone(), err);
    }
}
