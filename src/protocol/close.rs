//! Close frame status codes and payload validation (RFC 6455 Section 7.4).

use crate::error::{Error, Result};

/// WebSocket close status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CloseCode {
    /// Normal closure (1000).
    #[default]
    Normal,
    /// Going away (1001).
    GoingAway,
    /// Protocol error (1002).
    ProtocolError,
    /// Unsupported data (1003).
    UnsupportedData,
    /// Invalid frame payload data (1007), e.g. non-UTF-8 text.
    InvalidPayload,
    /// Policy violation (1008).
    PolicyViolation,
    /// Message too big (1009).
    MessageTooBig,
    /// Mandatory extension (1010).
    MandatoryExtension,
    /// Internal error (1011).
    InternalError,
    /// Any other numeric code.
    Other(u16),
}

impl CloseCode {
    /// Map a numeric code to its variant.
    #[must_use]
    pub const fn from_u16(code: u16) -> Self {
        match code {
            1000 => CloseCode::Normal,
            1001 => CloseCode::GoingAway,
            1002 => CloseCode::ProtocolError,
            1003 => CloseCode::UnsupportedData,
            1007 => CloseCode::InvalidPayload,
            1008 => CloseCode::PolicyViolation,
            1009 => CloseCode::MessageTooBig,
            1010 => CloseCode::MandatoryExtension,
            1011 => CloseCode::InternalError,
            other => CloseCode::Other(other),
        }
    }

    /// Numeric value of this code.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        match self {
            CloseCode::Normal => 1000,
            CloseCode::GoingAway => 1001,
            CloseCode::ProtocolError => 1002,
            CloseCode::UnsupportedData => 1003,
            CloseCode::InvalidPayload => 1007,
            CloseCode::PolicyViolation => 1008,
            CloseCode::MessageTooBig => 1009,
            CloseCode::MandatoryExtension => 1010,
            CloseCode::InternalError => 1011,
            CloseCode::Other(code) => code,
        }
    }

    /// Whether a peer may put this code in a close frame.
    ///
    /// Allowed: 1000-1003, 1007-1011 and the application ranges 3000-4999.
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        match self.as_u16() {
            1000..=2999 => !self.is_protocol_undefined(),
            3000..=4999 => true,
            _ => false,
        }
    }

    /// Codes inside the 1000-2999 protocol band that RFC 6455 does not
    /// define for use on the wire: 1004-1006 and 1012-2999.
    #[must_use]
    pub const fn is_protocol_undefined(self) -> bool {
        matches!(self.as_u16(), 1004..=1006 | 1012..=2999)
    }
}

impl From<u16> for CloseCode {
    fn from(code: u16) -> Self {
        Self::from_u16(code)
    }
}

impl From<CloseCode> for u16 {
    fn from(code: CloseCode) -> u16 {
        code.as_u16()
    }
}

impl std::fmt::Display for CloseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

/// Decoded close frame payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseFrame {
    /// Status code.
    pub code: CloseCode,
    /// UTF-8 reason, at most 123 bytes on the wire.
    pub reason: String,
}

impl CloseFrame {
    /// Create a close frame payload.
    #[must_use]
    pub fn new(code: CloseCode, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }
}

/// Decode and validate an unmasked close frame payload.
///
/// Returns `Ok(None)` for an empty payload (no status code supplied).
///
/// # Errors
///
/// - `Error::InvalidCloseFrame` for a 1-byte payload or a reason that is
///   not valid UTF-8
/// - `Error::InvalidCloseCode` for codes that must not appear on the wire
pub fn parse_close_payload(payload: &[u8]) -> Result<Option<CloseFrame>> {
    let (code, reason) = match payload {
        [] => return Ok(None),
        [_] => {
            return Err(Error::InvalidCloseFrame(
                "payload of 1 byte cannot hold a status code".into(),
            ));
        }
        [hi, lo, reason @ ..] => (u16::from_be_bytes([*hi, *lo]), reason),
    };

    let code = CloseCode::from_u16(code);
    if !code.is_allowed() {
        return Err(Error::InvalidCloseCode(code.as_u16()));
    }

    let reason = std::str::from_utf8(reason)
        .map_err(|_| Error::InvalidCloseFrame("reason is not valid UTF-8".into()))?;

    Ok(Some(CloseFrame::new(code, reason)))
}

/// Encode a close payload: big-endian code followed by the reason.
#[must_use]
pub fn close_payload(code: Option<CloseCode>, reason: &str) -> Vec<u8> {
    match code {
        Some(code) => {
            let mut payload = Vec::with_capacity(2 + reason.len());
            payload.extend_from_slice(&code.as_u16().to_be_bytes());
            payload.extend_from_slice(reason.as_bytes());
            payload
        }
        None => Vec::new(),
    }
}
