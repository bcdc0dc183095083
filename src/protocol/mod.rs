//! WebSocket protocol core (RFC 6455).
//!
//! Everything in this module is runtime-agnostic: it works on byte slices
//! and leaves I/O to [`crate::codec`].

pub mod close;
pub mod header;
pub mod mask;
pub mod opcode;
pub mod utf8;
pub mod validation;

pub use close::{CloseCode, CloseFrame, close_payload, parse_close_payload};
pub use header::{FrameHeader, MAX_CONTROL_FRAME_PAYLOAD, MAX_HEADER_LEN};
pub use mask::{Cipher, apply_mask, apply_mask_at};
pub use opcode::OpCode;
pub use utf8::{Utf8Validator, validate_utf8};
pub use validation::FrameValidator;
