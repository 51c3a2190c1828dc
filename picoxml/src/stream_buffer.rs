// SPDX-License-Identifier: Apache-2.0

/// Bookkeeping failures of [`StreamBuffer`].
#[derive(Debug, PartialEq)]
pub enum StreamBufferError {
    /// More data was marked filled than the buffer can hold.
    Unexpected,
    /// An advance past the end of the unread data
    InvalidSliceBounds,
}

/// StreamBuffer owns the fixed-capacity input window of a parse session.
///
/// Layout of the borrowed slice:
/// - `buffer[..cursor]` has been consumed and may be discarded by [`compact`]
/// - `buffer[cursor..data_end]` is unread input
/// - `buffer[data_end..]` is free space for the reader to fill
///
/// The cursor only ever moves forward over the input stream. Compaction
/// shifts the unread tail to the front of the slice and records how many
/// bytes were dropped, so `discarded + cursor` is the absolute stream
/// position at all times.
///
/// [`compact`]: StreamBuffer::compact
pub struct StreamBuffer<'a> {
    /// Caller-supplied storage; its length is the capacity
    buffer: &'a mut [u8],
    /// Current read position
    cursor: usize,
    /// One past the last byte delivered by the reader
    data_end: usize,
    /// Bytes dropped from the front by compaction so far
    discarded: usize,
}

impl<'a> StreamBuffer<'a> {
    /// Wraps `buffer` with nothing buffered yet.
    pub fn new(buffer: &'a mut [u8]) -> Self {
        Self {
            buffer,
            cursor: 0,
            data_end: 0,
            discarded: 0,
        }
    }

    /// Total size of the underlying slice
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Unread bytes between the cursor and the end of valid data
    pub fn unread(&self) -> &[u8] {
        self.buffer.get(self.cursor..self.data_end).unwrap_or(&[])
    }

    /// Number of unread bytes
    pub fn remaining_bytes(&self) -> usize {
        self.data_end.saturating_sub(self.cursor)
    }

    /// No unread bytes remain
    pub fn is_empty(&self) -> bool {
        self.cursor >= self.data_end
    }

    /// True when the unread region occupies the whole buffer
    pub fn is_full(&self) -> bool {
        self.cursor == 0 && self.data_end >= self.buffer.len()
    }

    /// Byte `n` positions past the cursor, if buffered
    pub fn peek(&self, n: usize) -> Option<u8> {
        self.unread().get(n).copied()
    }

    /// Move the cursor forward by `n` bytes
    pub fn advance(&mut self, n: usize) -> Result<(), StreamBufferError> {
        if n > self.remaining_bytes() {
            return Err(StreamBufferError::InvalidSliceBounds);
        }
        self.cursor = self.cursor.wrapping_add(n);
        Ok(())
    }

    /// Absolute stream position of the cursor
    pub fn position(&self) -> usize {
        self.discarded.wrapping_add(self.cursor)
    }

    /// Discard consumed bytes by moving the unread tail to the front.
    ///
    /// Returns the number of bytes discarded.
    pub fn compact(&mut self) -> usize {
        let dropped = self.cursor;
        if dropped == 0 {
            return 0;
        }

        let remaining = self.remaining_bytes();
        if remaining > 0 {
            // cursor < data_end <= len, so the source range is in bounds
            self.buffer.copy_within(self.cursor..self.data_end, 0);
        }

        self.cursor = 0;
        self.data_end = remaining;
        self.discarded = self.discarded.wrapping_add(dropped);
        dropped
    }

    /// Free space after the buffered data, or `None` when there is none.
    pub fn fill_slice(&mut self) -> Option<&mut [u8]> {
        if self.data_end >= self.buffer.len() {
            return None;
        }
        self.buffer.get_mut(self.data_end..)
    }

    /// Records that the reader wrote `bytes_read` bytes into [`Self::fill_slice`].
    pub fn mark_filled(&mut self, bytes_read: usize) -> Result<(), StreamBufferError> {
        let new_data_end = self.data_end.wrapping_add(bytes_read);
        if new_data_end > self.buffer.len() {
            return Err(StreamBufferError::Unexpected);
        }
        self.data_end = new_data_end;
        Ok(())
    }
}

/// Offset of the first occurrence of `pattern` in `window[from..]`,
/// relative to the start of `window`.
pub fn find_sequence(window: &[u8], from: usize, pattern: &[u8]) -> Option<usize> {
    let haystack = window.get(from..)?;
    if pattern.is_empty() || haystack.len() < pattern.len() {
        return None;
    }
    haystack
        .windows(pattern.len())
        .position(|candidate| candidate == pattern)
        .map(|pos| pos.wrapping_add(from))
}

/// Offset of the first byte in `window[from..]` matching `pred`, relative to
/// the start of `window`.
pub fn find_byte<F>(window: &[u8], from: usize, pred: F) -> Option<usize>
where
    F: FnMut(&u8) -> bool,
{
    window
        .get(from..)?
        .iter()
        .position(pred)
        .map(|pos| pos.wrapping_add(from))
}

/// Offset of the first non-whitespace byte at or after `from`, or the window
/// length when only whitespace remains.
pub fn skip_whitespace(window: &[u8], from: usize) -> usize {
    find_byte(window, from, |b| !b.is_ascii_whitespace()).unwrap_or(window.len().max(from))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(sb: &mut StreamBuffer<'_>, data: &[u8]) {
        let fill_slice = sb.fill_slice().unwrap();
        fill_slice[..data.len()].copy_from_slice(data);
        sb.mark_filled(data.len()).unwrap();
    }

    #[test]
    fn test_new_stream_buffer() {
        let mut buffer = [0u8; 100];
        let sb = StreamBuffer::new(&mut buffer);

        assert_eq!(sb.cursor, 0);
        assert_eq!(sb.data_end, 0);
        assert_eq!(sb.capacity(), 100);
        assert!(sb.is_empty());
        assert!(!sb.is_full());
    }

    #[test]
    fn test_fill_and_advance() {
        let mut buffer = [0u8; 100];
        let mut sb = StreamBuffer::new(&mut buffer);
        fill(&mut sb, b"hello");

        assert_eq!(sb.remaining_bytes(), 5);
        assert_eq!(sb.peek(0), Some(b'h'));
        sb.advance(1).unwrap();
        assert_eq!(sb.peek(0), Some(b'e'));
        assert_eq!(sb.unread(), b"ello");
        assert_eq!(sb.peek(4), None);
        assert_eq!(sb.position(), 1);
    }

    #[test]
    fn test_advance_past_end_is_rejected() {
        let mut buffer = [0u8; 10];
        let mut sb = StreamBuffer::new(&mut buffer);
        fill(&mut sb, b"abc");

        assert_eq!(sb.advance(4), Err(StreamBufferError::InvalidSliceBounds));
        assert_eq!(sb.remaining_bytes(), 3);
    }

    #[test]
    fn test_buffer_full_scenario() {
        let mut buffer = [0u8; 10];
        let mut sb = StreamBuffer::new(&mut buffer);
        fill(&mut sb, b"0123456789");

        assert!(sb.fill_slice().is_none());
        assert!(sb.is_full());
        assert_eq!(sb.mark_filled(1), Err(StreamBufferError::Unexpected));
    }

    #[test]
    fn test_compact_moves_unread_tail() {
        let mut buffer = [0u8; 10];
        let mut sb = StreamBuffer::new(&mut buffer);
        fill(&mut sb, b"<a>hello");
        sb.advance(3).unwrap();

        assert_eq!(sb.compact(), 3);
        assert_eq!(sb.unread(), b"hello");
        assert_eq!(sb.cursor, 0);
        assert_eq!(sb.position(), 3);
        assert_eq!(sb.fill_slice().map(|s| s.len()), Some(5));

        // Nothing consumed since the last compaction
        assert_eq!(sb.compact(), 0);
        assert_eq!(sb.position(), 3);
    }

    #[test]
    fn test_compact_when_everything_consumed() {
        let mut buffer = [0u8; 8];
        let mut sb = StreamBuffer::new(&mut buffer);
        fill(&mut sb, b"abcdefgh");
        sb.advance(8).unwrap();

        assert_eq!(sb.compact(), 8);
        assert!(sb.is_empty());
        assert_eq!(sb.position(), 8);
        assert_eq!(sb.fill_slice().map(|s| s.len()), Some(8));
    }

    #[test]
    fn test_find_sequence() {
        assert_eq!(find_sequence(b"abc]]>def", 0, b"]]>"), Some(3));
        assert_eq!(find_sequence(b"abc]]>def", 4, b"]]>"), None);
        assert_eq!(find_sequence(b"]]", 0, b"]]>"), None);
        assert_eq!(find_sequence(b"ab", 5, b"]]>"), None);
        assert_eq!(find_sequence(b"--->", 0, b"-->"), Some(1));
    }

    #[test]
    fn test_find_byte_and_skip_whitespace() {
        assert_eq!(find_byte(b"ab<cd", 0, |b| *b == b'<'), Some(2));
        assert_eq!(find_byte(b"ab<cd", 3, |b| *b == b'<'), None);
        assert_eq!(skip_whitespace(b"  \n x", 0), 4);
        assert_eq!(skip_whitespace(b"   ", 1), 3);
        assert_eq!(skip_whitespace(b"x", 0), 0);
    }
}
