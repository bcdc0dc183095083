//! Building client frames and decoding what the server sent back.

use wsecho::protocol::{FrameHeader, OpCode, apply_mask};

pub const MASK: [u8; 4] = [0x37, 0xfa, 0x21, 0x3d];

/// A masked client frame.
pub fn client_frame(fin: bool, opcode: OpCode, payload: &[u8]) -> Vec<u8> {
    raw_frame(fin, opcode, payload, Some(MASK))
}

/// A frame with full control over the mask.
pub fn raw_frame(fin: bool, opcode: OpCode, payload: &[u8], mask: Option<[u8; 4]>) -> Vec<u8> {
    let mut buf = Vec::new();
    FrameHeader::new(fin, opcode, payload.len() as u64)
        .with_mask(mask)
        .encode(&mut buf);
    let mut body = payload.to_vec();
    if let Some(key) = mask {
        apply_mask(&mut body, key);
    }
    buf.extend(body);
    buf
}

/// A masked close frame carrying `code` and `reason`.
pub fn close_frame(code: u16, reason: &[u8]) -> Vec<u8> {
    let mut payload = code.to_be_bytes().to_vec();
    payload.extend_from_slice(reason);
    client_frame(true, OpCode::Close, &payload)
}

/// One frame decoded from server output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Received {
    pub fin: bool,
    pub opcode: OpCode,
    pub masked: bool,
    pub payload: Vec<u8>,
}

impl Received {
    pub fn new(fin: bool, opcode: OpCode, payload: &[u8]) -> Self {
        Self {
            fin,
            opcode,
            masked: false,
            payload: payload.to_vec(),
        }
    }

    /// Close status code, if this is a close frame with one.
    pub fn close_code(&self) -> Option<u16> {
        match (self.opcode, self.payload.as_slice()) {
            (OpCode::Close, [hi, lo, ..]) => Some(u16::from_be_bytes([*hi, *lo])),
            _ => None,
        }
    }
}

/// Decode every frame in `bytes`. Panics on trailing garbage.
pub fn decode_all(mut bytes: &[u8]) -> Vec<Received> {
    let mut frames = Vec::new();
    while !bytes.is_empty() {
        let (header, len) = FrameHeader::parse(bytes)
            .expect("valid server header")
            .expect("complete server header");
        let end = len + header.payload_len as usize;
        assert!(end <= bytes.len(), "truncated server frame");
        frames.push(Received {
            fin: header.fin,
            opcode: header.opcode,
            masked: header.is_masked(),
            payload: bytes[len..end].to_vec(),
        });
        bytes = &bytes[end..];
    }
    frames
}
