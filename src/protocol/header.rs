//! WebSocket frame header parsing and serialization (RFC 6455 Section 5.2).
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-------+-+-------------+-------------------------------+
//! |F|R|R|R| opcode|M| Payload len |    Extended payload length    |
//! |I|S|S|S|  (4)  |A|     (7)     |             (16/64)           |
//! |N|V|V|V|       |S|             |   (if payload len==126/127)   |
//! | |1|2|3|       |K|             |                               |
//! +-+-+-+-+-------+-+-------------+-------------------------------+
//! |                     Masking key (if MASK set)                 |
//! +---------------------------------------------------------------+
//! ```
//!
//! Only the header is handled here; payload bytes are streamed separately
//! so a frame never has to be held in memory to be decoded.

use bytes::BufMut;
#[cfg(feature = "async-tokio")]
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::{Error, Result};
use crate::protocol::OpCode;

/// Maximum payload size for control frames.
pub const MAX_CONTROL_FRAME_PAYLOAD: u64 = 125;

/// Largest possible encoded header: 2 base + 8 length + 4 mask bytes.
pub const MAX_HEADER_LEN: usize = 14;

/// A decoded frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Final fragment flag.
    pub fin: bool,
    /// RSV1..RSV3 as the low three bits.
    pub rsv: u8,
    /// Frame opcode.
    pub opcode: OpCode,
    /// Masking key, present iff the MASK bit is set.
    pub mask: Option<[u8; 4]>,
    /// Payload length in bytes.
    pub payload_len: u64,
}

impl FrameHeader {
    /// Unmasked header with no reserved bits.
    #[must_use]
    pub const fn new(fin: bool, opcode: OpCode, payload_len: u64) -> Self {
        Self {
            fin,
            rsv: 0,
            opcode,
            mask: None,
            payload_len,
        }
    }

    /// Same header carrying `mask`.
    #[must_use]
    pub const fn with_mask(mut self, mask: Option<[u8; 4]>) -> Self {
        self.mask = mask;
        self
    }

    /// Whether the MASK bit is set.
    #[inline]
    #[must_use]
    pub const fn is_masked(&self) -> bool {
        self.mask.is_some()
    }

    /// Bytes still needed after the two base bytes `b0 b1`.
    #[must_use]
    pub const fn remaining_len(b1: u8) -> usize {
        let ext = match b1 & 0x7F {
            126 => 2,
            127 => 8,
            _ => 0,
        };
        if b1 & 0x80 != 0 { ext + 4 } else { ext }
    }

    /// Parse a header from the start of `buf`.
    ///
    /// Returns `Ok(None)` if `buf` does not yet hold the whole header,
    /// otherwise the header and the number of bytes it occupied.
    ///
    /// # Errors
    ///
    /// - `Error::ReservedOpcode` for opcodes 0x3-0x7 and 0xB-0xF
    /// - `Error::InvalidFrame` if the 64-bit length has its top bit set, or
    ///   if an extended length encodes a value that fits a shorter form
    pub fn parse(buf: &[u8]) -> Result<Option<(Self, usize)>> {
        let [b0, b1, rest @ ..] = buf else {
            return Ok(None);
        };

        let fin = b0 & 0x80 != 0;
        let rsv = (b0 >> 4) & 0x07;
        let opcode = OpCode::from_u8(b0 & 0x0F)?;
        let masked = b1 & 0x80 != 0;

        let header_len = 2 + Self::remaining_len(*b1);
        if buf.len() < header_len {
            return Ok(None);
        }

        let (payload_len, key_at) = match b1 & 0x7F {
            126 => {
                let len = u16::from_be_bytes([rest[0], rest[1]]);
                if len < 126 {
                    return Err(Error::InvalidFrame(format!(
                        "payload length {len} not minimally encoded in 16 bits"
                    )));
                }
                (u64::from(len), 4)
            }
            127 => {
                let mut len = [0u8; 8];
                len.copy_from_slice(&rest[..8]);
                let len = u64::from_be_bytes(len);
                if len >> 63 != 0 {
                    return Err(Error::InvalidFrame(
                        "most significant bit of 64-bit payload length is set".into(),
                    ));
                }
                if len <= 0xFFFF {
                    return Err(Error::InvalidFrame(format!(
                        "payload length {len} not minimally encoded in 64 bits"
                    )));
                }
                (len, 10)
            }
            short => (u64::from(short), 2),
        };

        let mask = masked.then(|| [buf[key_at], buf[key_at + 1], buf[key_at + 2], buf[key_at + 3]]);

        Ok(Some((
            Self {
                fin,
                rsv,
                opcode,
                mask,
                payload_len,
            },
            header_len,
        )))
    }

    /// Number of bytes [`encode`](Self::encode) produces.
    #[must_use]
    pub const fn wire_len(&self) -> usize {
        let ext = if self.payload_len <= 125 {
            0
        } else if self.payload_len <= 0xFFFF {
            2
        } else {
            8
        };
        let mask = if self.mask.is_some() { 4 } else { 0 };
        2 + ext + mask
    }

    /// Serialize the header, using the shortest length encoding.
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        let mut b0 = self.opcode.as_u8() | ((self.rsv & 0x07) << 4);
        if self.fin {
            b0 |= 0x80;
        }
        let mask_bit = if self.mask.is_some() { 0x80 } else { 0x00 };

        buf.put_u8(b0);
        match self.payload_len {
            len @ 0..=125 => buf.put_u8(mask_bit | len as u8),
            len @ 126..=0xFFFF => {
                buf.put_u8(mask_bit | 126);
                buf.put_u16(len as u16);
            }
            len => {
                buf.put_u8(mask_bit | 127);
                buf.put_u64(len);
            }
        }
        if let Some(key) = self.mask {
            buf.put_slice(&key);
        }
    }
}

/// Read exactly one frame header from `reader`.
///
/// # Errors
///
/// - `Error::ConnectionClosed` if the stream ends before the first byte
/// - `Error::Io` if it ends part-way through the header
/// - any error from [`FrameHeader::parse`]
#[cfg(feature = "async-tokio")]
pub async fn read_header<R: AsyncRead + Unpin>(reader: &mut R) -> Result<FrameHeader> {
    let mut buf = [0u8; MAX_HEADER_LEN];

    if reader.read(&mut buf[..1]).await? == 0 {
        return Err(Error::ConnectionClosed);
    }
    reader.read_exact(&mut buf[1..2]).await?;

    let len = 2 + FrameHeader::remaining_len(buf[1]);
    reader.read_exact(&mut buf[2..len]).await?;

    match FrameHeader::parse(&buf[..len])? {
        Some((header, _)) => Ok(header),
        None => Err(Error::InvalidFrame("truncated header".into())),
    }
}
