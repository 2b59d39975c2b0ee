// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Runner Agent Contributors

//! Append-only byte log indexed by byte offset.

use parking_lot::Mutex;

/// Readers locate positions by byte offset; writers only append. Internally
/// synchronized — a writer observing offset `X` is guaranteed every byte at
/// offsets `< X` was already accepted.
#[derive(Default)]
pub struct OffsetLog {
    buf: Mutex<Vec<u8>>,
}

impl OffsetLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `bytes`, returning the offset range `[start, end)` they now
    /// occupy.
    pub fn append(&self, bytes: &[u8]) -> (u64, u64) {
        let mut buf = self.buf.lock();
        let start = buf.len() as u64;
        buf.extend_from_slice(bytes);
        (start, buf.len() as u64)
    }

    /// Current length of the log (the next write's start offset).
    pub fn len(&self) -> u64 {
        self.buf.lock().len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes in `[from, len())`. Returns empty if `from >= len()`.
    pub fn tail_from(&self, from: u64) -> Vec<u8> {
        let buf = self.buf.lock();
        let from = from.min(buf.len() as u64) as usize;
        buf[from..].to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_returns_offset_range() {
        let log = OffsetLog::new();
        assert_eq!(log.append(b"abc"), (0, 3));
        assert_eq!(log.append(b"de"), (3, 5));
        assert_eq!(log.len(), 5);
    }

    #[test]
    fn sequential_writes_have_contiguous_offsets() {
        let log = OffsetLog::new();
        let (_, e1) = log.append(b"hello ");
        let (s2, _) = log.append(b"world");
        assert_eq!(e1, s2);
    }

    #[test]
    fn tail_from_returns_bytes_since_offset() {
        let log = OffsetLog::new();
        log.append(b"hello world");
        assert_eq!(log.tail_from(6), b"world");
        assert_eq!(log.tail_from(0), b"hello world");
        assert_eq!(log.tail_from(100), b"");
    }
}
