// SPDX-License-Identifier: Apache-2.0

use alloc::vec::Vec;

/// Growable buffer holding received bytes that have not been parsed yet.
///
/// Bytes are appended at the end and consumed from the front. Consumption only moves
/// a cursor; the consumed prefix is dropped by [`compact`](InputBuffer::compact), which
/// the parsers call once per call rather than once per token.
#[derive(Debug, Default)]
pub(crate) struct InputBuffer {
    data: Vec<u8>,
    /// Start of unconsumed data in `data`
    pos: usize,
    /// Bytes dropped by earlier compactions, for absolute offsets
    discarded: usize,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a received chunk.
    pub fn extend(&mut self, chunk: &[u8]) {
        if self.pos > 0 && self.pos == self.data.len() {
            // Everything consumed: reuse the allocation without moving anything.
            self.discarded += self.pos;
            self.data.clear();
            self.pos = 0;
        }
        self.data.extend_from_slice(chunk);
    }

    /// Unconsumed bytes.
    pub fn remaining(&self) -> &[u8] {
        self.data.get(self.pos..).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    pub fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    /// Index of the first `byte` in the unconsumed bytes.
    pub fn find(&self, byte: u8) -> Option<usize> {
        self.remaining().iter().position(|&b| b == byte)
    }

    /// Marks `count` bytes as consumed. Never moves past the end.
    pub fn consume(&mut self, count: usize) {
        self.pos = self.pos.saturating_add(count).min(self.data.len());
    }

    /// Absolute stream offset of the next unconsumed byte.
    pub fn position(&self) -> usize {
        self.discarded + self.pos
    }

    /// Drops the consumed prefix.
    pub fn compact(&mut self) {
        if self.pos == 0 {
            return;
        }
        log::trace!("compacting input buffer: dropping {} bytes", self.pos);
        self.data.drain(..self.pos);
        self.discarded += self.pos;
        self.pos = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consume_and_compact() {
        let mut buffer = InputBuffer::new();
        buffer.extend(b"i12e");
        assert_eq!(buffer.peek(), Some(b'i'));
        assert_eq!(buffer.find(b'e'), Some(3));

        buffer.consume(2);
        assert_eq!(buffer.remaining(), b"2e");
        assert_eq!(buffer.position(), 2);

        buffer.compact();
        assert_eq!(buffer.remaining(), b"2e");
        assert_eq!(buffer.position(), 2);

        buffer.consume(10);
        assert!(buffer.is_empty());
        assert_eq!(buffer.len(), 0);
        assert_eq!(buffer.peek(), None);
        assert_eq!(buffer.position(), 4);
    }

    #[test]
    fn test_extend_after_full_consumption_keeps_offsets() {
        let mut buffer = InputBuffer::new();
        buffer.extend(b"le");
        buffer.consume(2);
        buffer.extend(b"de");
        assert_eq!(buffer.remaining(), b"de");
        assert_eq!(buffer.position(), 2);
        assert_eq!(buffer.find(b'x'), None);
    }
}
