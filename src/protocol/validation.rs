//! Per-frame header validation (RFC 6455).
//!
//! Applied to every header before any payload byte is read:
//! - Masking rules per RFC 6455 Section 5.1
//! - RSV bits per Section 5.2
//! - Control frame rules per Section 5.5
//! - Frame size limits

use crate::config::Limits;
use crate::error::{Error, Result};
use crate::protocol::header::{FrameHeader, MAX_CONTROL_FRAME_PAYLOAD};

/// Validator for frames arriving from a client.
#[derive(Debug, Clone)]
pub struct FrameValidator {
    /// Size limits for frames.
    limits: Limits,
    /// Whether to accept unmasked frames (non-compliant).
    accept_unmasked_frames: bool,
}

impl FrameValidator {
    /// Create a new frame validator.
    #[must_use]
    pub const fn new(limits: Limits) -> Self {
        Self {
            limits,
            accept_unmasked_frames: false,
        }
    }

    /// Create a validator that accepts unmasked frames (non-RFC compliant).
    ///
    /// This is useful for testing but should not be used in production.
    #[must_use]
    pub const fn with_accept_unmasked(mut self, accept: bool) -> Self {
        self.accept_unmasked_frames = accept;
        self
    }

    /// Validate an incoming frame header.
    ///
    /// # Errors
    ///
    /// - `Error::UnmaskedClientFrame` - client frame without a masking key
    /// - `Error::ReservedBitsSet` - RSV bits set without negotiated extension
    /// - `Error::FragmentedControlFrame` - control frame with FIN=0
    /// - `Error::ControlFrameTooLarge` - control payload over 125 bytes
    /// - `Error::FrameTooLarge` - frame exceeds size limit
    pub fn validate(&self, header: &FrameHeader) -> Result<()> {
        self.validate_masking(header.is_masked())?;
        self.validate_rsv_bits(header.rsv)?;
        if header.opcode.is_control() {
            self.validate_control(header)?;
        }
        self.limits.check_frame_size(header.payload_len)
    }

    fn validate_masking(&self, masked: bool) -> Result<()> {
        if !masked && !self.accept_unmasked_frames {
            return Err(Error::UnmaskedClientFrame);
        }
        Ok(())
    }

    fn validate_rsv_bits(&self, rsv: u8) -> Result<()> {
        if rsv != 0 {
            return Err(Error::ReservedBitsSet);
        }
        Ok(())
    }

    fn validate_control(&self, header: &FrameHeader) -> Result<()> {
        if !header.fin {
            return Err(Error::FragmentedControlFrame);
        }
        if header.payload_len > MAX_CONTROL_FRAME_PAYLOAD {
            return Err(Error::ControlFrameTooLarge(header.payload_len));
        }
        Ok(())
    }
}
