//! Incremental UTF-8 validation for WebSocket text messages (RFC 3629).
//!
//! Text payloads are validated as they stream in, across read-chunk and
//! fragment boundaries, without buffering the message. The validator is a
//! byte-level state machine: each byte is accepted or rejected the moment it
//! is consumed, so an invalid message fails fast at the first offending
//! byte.

use crate::error::{Error, Result};

/// Incremental UTF-8 validator.
///
/// Carries at most 3 bytes of an unfinished multi-byte sequence between
/// [`feed`](Self::feed) calls.
#[derive(Debug, Clone)]
pub struct Utf8Validator {
    /// Bytes accepted so far in the current message.
    consumed: u64,
    /// Lead and continuation bytes of the sequence in progress.
    partial: [u8; 3],
    partial_len: u8,
    /// Continuation bytes still expected for the sequence in progress.
    needed: u8,
    /// Inclusive range allowed for the next continuation byte.
    lower: u8,
    upper: u8,
}

impl Default for Utf8Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Utf8Validator {
    /// Create a validator at the start of a message.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            consumed: 0,
            partial: [0; 3],
            partial_len: 0,
            needed: 0,
            lower: 0x80,
            upper: 0xBF,
        }
    }

    /// Validate the next chunk of the message.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUtf8` at the first byte that cannot be part of
    /// a well-formed sequence. The validator must be reset before reuse.
    pub fn feed(&mut self, mut bytes: &[u8]) -> Result<()> {
        loop {
            // Finish a sequence left over from a previous chunk byte by byte.
            while self.needed > 0 {
                let Some((&byte, rest)) = bytes.split_first() else {
                    return Ok(());
                };
                self.continuation(byte)?;
                bytes = rest;
            }

            // At a boundary: let the standard library take the long run of
            // complete sequences, then resume byte-wise at the first error.
            match std::str::from_utf8(bytes) {
                Ok(_) => {
                    self.consumed += bytes.len() as u64;
                    return Ok(());
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    self.consumed += valid as u64;
                    // Replay the offending sequence byte-wise so the exact
                    // byte is rejected, or carried if it is only truncated.
                    let rest = &bytes[valid..];
                    self.lead(rest[0])?;
                    bytes = &rest[1..];
                }
            }
        }
    }

    /// Signal the end of the message.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUtf8` if a multi-byte sequence is unfinished.
    pub fn finish(&self) -> Result<()> {
        if self.needed > 0 {
            tracing::trace!(
                consumed = self.consumed,
                pending = ?self.pending(),
                "text message ends inside a UTF-8 sequence"
            );
            return Err(Error::InvalidUtf8);
        }
        Ok(())
    }

    /// Forget all state and start a new message.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Whether a multi-byte sequence is in progress.
    #[must_use]
    pub const fn has_incomplete(&self) -> bool {
        self.needed > 0
    }

    /// Bytes accepted so far in the current message.
    #[must_use]
    pub const fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Bytes of the unfinished sequence.
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.partial[..usize::from(self.partial_len)]
    }

    fn lead(&mut self, byte: u8) -> Result<()> {
        let (needed, lower, upper) = match byte {
            0x00..=0x7F => (0, 0x80, 0xBF),
            0xC2..=0xDF => (1, 0x80, 0xBF),
            // Overlong three-byte forms start E0 80..9F.
            0xE0 => (2, 0xA0, 0xBF),
            0xE1..=0xEC | 0xEE..=0xEF => (2, 0x80, 0xBF),
            // ED A0..BF would encode surrogates.
            0xED => (2, 0x80, 0x9F),
            // Overlong four-byte forms start F0 80..8F.
            0xF0 => (3, 0x90, 0xBF),
            0xF1..=0xF3 => (3, 0x80, 0xBF),
            // F4 90.. is beyond U+10FFFF.
            0xF4 => (3, 0x80, 0x8F),
            _ => return self.reject(byte),
        };

        self.consumed += 1;
        if needed > 0 {
            self.partial[0] = byte;
            self.partial_len = 1;
            self.needed = needed;
            self.lower = lower;
            self.upper = upper;
        }
        Ok(())
    }

    fn continuation(&mut self, byte: u8) -> Result<()> {
        if byte < self.lower || byte > self.upper {
            return self.reject(byte);
        }

        self.consumed += 1;
        self.needed -= 1;
        if self.needed == 0 {
            self.partial_len = 0;
        } else {
            self.partial[usize::from(self.partial_len)] = byte;
            self.partial_len += 1;
        }
        self.lower = 0x80;
        self.upper = 0xBF;
        Ok(())
    }

    fn reject(&self, byte: u8) -> Result<()> {
        tracing::trace!(
            offset = self.consumed,
            byte,
            pending = ?self.pending(),
            "invalid UTF-8"
        );
        Err(Error::InvalidUtf8)
    }
}

/// Validate a complete buffer.
///
/// # Errors
///
/// Returns `Error::InvalidUtf8` if the data is not valid UTF-8.
pub fn validate_utf8(data: &[u8]) -> Result<()> {
    std::str::from_utf8(data)?;
    Ok(())
}
