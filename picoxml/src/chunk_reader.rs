// SPDX-License-Identifier: Apache-2.0

//! Input sources.
//!
//! The parser pulls bytes through [`Reader`] whenever its buffer drops below
//! the low-water mark. Files, pipes and sockets get a small adapter around
//! their own read call; [`ChunkReader`] serves in-memory documents and can
//! imitate short reads.
//!
//! ```rust
//! use picoxml::{ChunkReader, Event, PushParser, XmlHandler};
//!
//! struct Names(Vec<String>);
//! impl XmlHandler<()> for Names {
//!     fn handle_event(&mut self, event: Event<'_>) -> Result<(), ()> {
//!         if let Event::StartTag { local_name, .. } = event {
//!             self.0.push(local_name.to_string());
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let xml = br#"<unit filename="a.cpp"><expr>x</expr></unit>"#;
//! // At most 4 bytes per read
//! let mut buffer = [0u8; 32];
//! let mut parser = PushParser::new(ChunkReader::new(xml, 4), &mut buffer, Names(Vec::new()));
//! parser.parse::<()>().unwrap();
//! assert_eq!(parser.destroy().0, ["unit", "expr"]);
//! ```

/// A byte source the parser refills its buffer from.
pub trait Reader {
    type Error;

    /// Copies up to `buf.len()` bytes into `buf` and returns how many were
    /// written.
    ///
    /// `Ok(0)` means the stream has ended and is never used for "nothing
    /// available yet". Any shorter count is an ordinary partial read.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

/// Serves a byte slice, handing out at most `max_chunk` bytes per read.
#[derive(Debug, Clone)]
pub struct ChunkReader<'a> {
    remaining: &'a [u8],
    max_chunk: usize,
}

impl<'a> ChunkReader<'a> {
    /// Reads of at most `max_chunk` bytes; zero is treated as one.
    pub fn new(data: &'a [u8], max_chunk: usize) -> Self {
        Self {
            remaining: data,
            max_chunk: max_chunk.max(1),
        }
    }

    /// Reads as much as the destination can hold.
    pub fn full_slice(data: &'a [u8]) -> Self {
        Self::new(data, usize::MAX)
    }
}

impl Reader for ChunkReader<'_> {
    type Error = ();

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ()> {
        let n = self.remaining.len().min(buf.len()).min(self.max_chunk);
        let (chunk, rest) = self.remaining.split_at(n);
        if let Some(dest) = buf.get_mut(..n) {
            dest.copy_from_slice(chunk);
        }
        self.remaining = rest;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(mut reader: ChunkReader<'_>, buf_len: usize) -> std::vec::Vec<std::vec::Vec<u8>> {
        let mut buf = std::vec![0u8; buf_len];
        let mut reads = std::vec::Vec::new();
        loop {
            match reader.read(&mut buf) {
                Ok(0) => return reads,
                Ok(n) => reads.push(buf[..n].to_vec()),
                Err(()) => unreachable!(),
            }
        }
    }

    #[test]
    fn test_full_slice_limited_by_destination() {
        let reads = drain(ChunkReader::full_slice(b"<a>hello</a>"), 5);
        assert_eq!(reads, [&b"<a>he"[..], &b"llo</"[..], &b"a>"[..]]);
    }

    #[test]
    fn test_chunks() {
        let reads = drain(ChunkReader::new(b"<unit/>", 3), 10);
        assert_eq!(reads, [&b"<un"[..], &b"it/"[..], &b">"[..]]);
    }

    #[test]
    fn test_zero_chunk_reads_single_bytes() {
        let reads = drain(ChunkReader::new(b"abc", 0), 10);
        assert_eq!(reads.len(), 3);
    }

    #[test]
    fn test_empty_input_ends_immediately() {
        assert!(drain(ChunkReader::full_slice(b""), 4).is_empty());
        // End of stream is sticky
        let mut reader = ChunkReader::new(b"", 2);
        assert_eq!(reader.read(&mut [0u8; 2]), Ok(0));
        assert_eq!(reader.read(&mut [0u8; 2]), Ok(0));
    }
}
