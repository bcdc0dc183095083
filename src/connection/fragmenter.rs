//! Splitting of reassembled messages into outgoing frames.

use crate::protocol::OpCode;

/// One outgoing frame borrowed from a message payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment<'a> {
    /// Final fragment flag.
    pub fin: bool,
    /// Message opcode on the first fragment, `Continuation` afterwards.
    pub opcode: OpCode,
    /// Slice of the message payload.
    pub payload: &'a [u8],
}

/// Iterator that produces frames from a message payload.
///
/// Splits large payloads into multiple frames according to the configured
/// fragment size. First frame uses the message opcode, continuation frames
/// use `OpCode::Continuation`.
#[derive(Debug, Clone)]
pub struct Fragmenter<'a> {
    payload: &'a [u8],
    opcode: OpCode,
    fragment_size: usize,
    offset: usize,
    is_first: bool,
}

impl<'a> Fragmenter<'a> {
    /// Create a new fragmenter for the given payload.
    #[inline]
    #[must_use]
    pub fn new(payload: &'a [u8], opcode: OpCode, fragment_size: usize) -> Self {
        Self {
            payload,
            opcode,
            fragment_size: fragment_size.max(1),
            offset: 0,
            is_first: true,
        }
    }

    /// Check if fragmentation is needed (payload exceeds fragment_size).
    #[inline]
    #[must_use]
    pub fn needs_fragmentation(&self) -> bool {
        self.payload.len() > self.fragment_size
    }

    /// Get remaining bytes to send.
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.payload.len().saturating_sub(self.offset)
    }
}

impl<'a> Iterator for Fragmenter<'a> {
    type Item = Fragment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.payload.len() {
            // An empty message still goes out as one final frame.
            if self.is_first {
                self.is_first = false;
                return Some(Fragment {
                    fin: true,
                    opcode: self.opcode,
                    payload: &[],
                });
            }
            return None;
        }

        let end = self.payload.len().min(self.offset + self.fragment_size);
        let payload = &self.payload[self.offset..end];
        self.offset = end;

        let opcode = if self.is_first {
            self.is_first = false;
            self.opcode
        } else {
            OpCode::Continuation
        };

        Some(Fragment {
            fin: end == self.payload.len(),
            opcode,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_fragmentation_needed() {
        let frag = Fragmenter::new(b"Hello", OpCode::Text, 1024);
        assert!(!frag.needs_fragmentation());

        let frames: Vec<_> = frag.collect();
        assert_eq!(frames.len(), 1);
        assert!(frames[0].fin);
        assert_eq!(frames[0].opcode, OpCode::Text);
        assert_eq!(frames[0].payload, b"Hello");
    }

    #[test]
    fn test_exact_fragmentation() {
        let payload = vec![0xAB; 30];
        let frag = Fragmenter::new(&payload, OpCode::Binary, 10);
        assert!(frag.needs_fragmentation());

        let frames: Vec<_> = frag.collect();
        assert_eq!(frames.len(), 3);

        assert!(!frames[0].fin);
        assert_eq!(frames[0].opcode, OpCode::Binary);
        assert!(!frames[1].fin);
        assert_eq!(frames[1].opcode, OpCode::Continuation);
        assert!(frames[2].fin);
        assert_eq!(frames[2].opcode, OpCode::Continuation);
        assert!(frames.iter().all(|f| f.payload.len() == 10));
    }

    #[test]
    fn test_uneven_fragmentation() {
        let payload = vec![0x01; 25];
        let frames: Vec<_> = Fragmenter::new(&payload, OpCode::Binary, 10).collect();
        let sizes: Vec<_> = frames.iter().map(|f| f.payload.len()).collect();
        assert_eq!(sizes, vec![10, 10, 5]);
        assert!(frames[2].fin);
    }

    #[test]
    fn test_empty_payload_yields_one_frame() {
        let frames: Vec<_> = Fragmenter::new(&[], OpCode::Text, 10).collect();
        assert_eq!(frames.len(), 1);
        assert!(frames[0].fin);
        assert_eq!(frames[0].opcode, OpCode::Text);
        assert!(frames[0].payload.is_empty());
    }

    #[test]
    fn test_zero_fragment_size_is_clamped() {
        let frames: Vec<_> = Fragmenter::new(b"abc", OpCode::Binary, 0).collect();
        assert_eq!(frames.len(), 3);
    }

    #[test]
    fn test_fragments_concatenate_to_payload() {
        let payload: Vec<u8> = (0..=255).collect();
        let mut frag = Fragmenter::new(&payload, OpCode::Binary, 7);
        assert_eq!(frag.remaining(), 256);

        let mut joined = Vec::new();
        for fragment in frag.by_ref() {
            joined.extend_from_slice(fragment.payload);
        }
        assert_eq!(joined, payload);
        assert_eq!(frag.remaining(), 0);
    }
}
