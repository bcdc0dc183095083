//! Per-connection frame state machine.
//!
//! Tracks whether a fragmented message is in progress and owns the UTF-8
//! validator for the current text message. The session drives it one frame
//! at a time:
//!
//! 1. [`FrameMachine::on_header`] decides where the payload goes
//! 2. [`FrameMachine::on_payload`] sees every unmasked payload chunk
//! 3. [`FrameMachine::end_frame`] runs once the payload is complete
//!
//! Control frames are answered through [`FrameMachine::on_control`] and
//! never touch the fragmentation state.

use crate::error::{Error, Result};
use crate::protocol::{CloseFrame, FrameHeader, OpCode, Utf8Validator, parse_close_payload};

/// Kind of a data message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Text message; payload must be UTF-8.
    Text,
    /// Binary message.
    Binary,
}

impl MessageKind {
    /// Opcode of the first frame of a message of this kind.
    #[must_use]
    pub const fn opcode(self) -> OpCode {
        match self {
            MessageKind::Text => OpCode::Text,
            MessageKind::Binary => OpCode::Binary,
        }
    }
}

/// Fragmentation state of the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fragmentation {
    /// No message in progress.
    #[default]
    Idle,
    /// A non-final data frame was seen; only continuations may follow.
    AwaitingContinuation(MessageKind),
}

/// Where the payload of the current frame goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Text data, validated as UTF-8. `last` marks the final frame of the
    /// message.
    Text {
        /// Final frame of the message.
        last: bool,
    },
    /// Binary data, passed through untouched.
    Binary,
    /// Control frame payload, buffered and handed to
    /// [`FrameMachine::on_control`].
    Control,
}

/// Response to a control frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Answer a ping with a pong carrying the same payload.
    Pong(Vec<u8>),
    /// Nothing to send.
    None,
    /// Complete the close handshake. Carries the peer's close frame, `None`
    /// if it sent an empty payload.
    Close(Option<CloseFrame>),
}

/// Frame-level protocol state for one connection.
#[derive(Debug, Clone, Default)]
pub struct FrameMachine {
    state: Fragmentation,
    utf8: Utf8Validator,
}

impl FrameMachine {
    /// Machine for a fresh connection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current fragmentation state.
    #[must_use]
    pub const fn state(&self) -> Fragmentation {
        self.state
    }

    /// Kind of the message in progress, if any.
    #[must_use]
    pub const fn message_kind(&self) -> Option<MessageKind> {
        match self.state {
            Fragmentation::Idle => None,
            Fragmentation::AwaitingContinuation(kind) => Some(kind),
        }
    }

    /// Advance the state for a validated header and pick the payload route.
    ///
    /// # Errors
    ///
    /// - `Error::UnexpectedContinuation` for a continuation with no message
    ///   in progress
    /// - `Error::ExpectedContinuation` for a new data frame while a message
    ///   is in progress
    pub fn on_header(&mut self, header: &FrameHeader) -> Result<Route> {
        match (header.opcode, self.state) {
            (OpCode::Close | OpCode::Ping | OpCode::Pong, _) => Ok(Route::Control),

            (OpCode::Continuation, Fragmentation::Idle) => Err(Error::UnexpectedContinuation),

            (OpCode::Continuation, Fragmentation::AwaitingContinuation(kind)) => {
                if header.fin {
                    self.state = Fragmentation::Idle;
                }
                Ok(Self::route(kind, header.fin))
            }

            (OpCode::Text | OpCode::Binary, Fragmentation::AwaitingContinuation(_)) => {
                Err(Error::ExpectedContinuation(header.opcode.name()))
            }

            (OpCode::Text | OpCode::Binary, Fragmentation::Idle) => {
                let kind = if header.opcode == OpCode::Text {
                    self.utf8.reset();
                    MessageKind::Text
                } else {
                    MessageKind::Binary
                };
                if !header.fin {
                    self.state = Fragmentation::AwaitingContinuation(kind);
                }
                Ok(Self::route(kind, header.fin))
            }
        }
    }

    const fn route(kind: MessageKind, fin: bool) -> Route {
        match kind {
            MessageKind::Text => Route::Text { last: fin },
            MessageKind::Binary => Route::Binary,
        }
    }

    /// Inspect an unmasked payload chunk.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUtf8` as soon as a text chunk makes the message
    /// ill-formed.
    pub fn on_payload(&mut self, route: Route, chunk: &[u8]) -> Result<()> {
        match route {
            Route::Text { .. } => self.utf8.feed(chunk),
            Route::Binary | Route::Control => Ok(()),
        }
    }

    /// Finish a frame whose payload has been fully read.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUtf8` if the final text frame ends inside a
    /// multi-byte sequence.
    pub fn end_frame(&mut self, route: Route) -> Result<()> {
        match route {
            Route::Text { last: true } => {
                let result = self.utf8.finish();
                self.utf8.reset();
                result
            }
            Route::Text { last: false } | Route::Binary | Route::Control => Ok(()),
        }
    }

    /// Decide the response to a complete, unmasked control frame.
    ///
    /// # Errors
    ///
    /// Returns the close payload error for a malformed close frame.
    pub fn on_control(&mut self, opcode: OpCode, payload: &[u8]) -> Result<Reply> {
        match opcode {
            OpCode::Ping => Ok(Reply::Pong(payload.to_vec())),
            OpCode::Pong => Ok(Reply::None),
            OpCode::Close => {
                let frame = parse_close_payload(payload)?;
                Ok(Reply::Close(frame))
            }
            OpCode::Continuation | OpCode::Text | OpCode::Binary => Err(Error::InvalidFrame(
                format!("{opcode} is not a control opcode"),
            )),
        }
    }
}
