//! Payload masking (RFC 6455 Section 5.3).
//!
//! `unmask(b[i]) = b[i] ^ key[i % 4]`. The transform is its own inverse, so
//! the same routines mask and unmask.

/// XOR `data` with `key`, starting at key index 0.
#[inline]
pub fn apply_mask(data: &mut [u8], key: [u8; 4]) {
    apply_mask_at(data, key, 0);
}

/// XOR `data` with `key`, treating `data[0]` as payload byte `offset`.
///
/// Processes 4 bytes at a time through a `u32` once the key has been rotated
/// to line up with `offset`.
#[inline]
pub fn apply_mask_at(data: &mut [u8], key: [u8; 4], offset: usize) {
    let shift = offset % 4;
    let aligned = [
        key[shift],
        key[(shift + 1) % 4],
        key[(shift + 2) % 4],
        key[(shift + 3) % 4],
    ];
    let key_word = u32::from_ne_bytes(aligned);

    let mut chunks = data.chunks_exact_mut(4);
    for chunk in &mut chunks {
        let word = u32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) ^ key_word;
        chunk.copy_from_slice(&word.to_ne_bytes());
    }
    for (byte, k) in chunks.into_remainder().iter_mut().zip(aligned) {
        *byte ^= k;
    }
}

/// Streaming unmasker for one frame.
///
/// The key position persists across [`Cipher::apply`] calls, so a payload
/// read in arbitrary chunks unmasks exactly as if it were read at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cipher {
    key: Option<[u8; 4]>,
    position: usize,
}

impl Cipher {
    /// Cipher for a frame masked with `key`, or the identity for `None`.
    #[must_use]
    pub const fn new(key: Option<[u8; 4]>) -> Self {
        Self { key, position: 0 }
    }

    /// Unmask the next chunk of payload in place.
    pub fn apply(&mut self, chunk: &mut [u8]) {
        if let Some(key) = self.key {
            apply_mask_at(chunk, key, self.position);
            self.position = (self.position + chunk.len()) % 4;
        }
    }

    /// Restart at key index 0, optionally with a new key.
    pub fn reset(&mut self, key: Option<[u8; 4]>) {
        self.key = key;
        self.position = 0;
    }
}
