// SPDX-License-Identifier: Apache-2.0

//! A SAX-style XML push parser over a fixed-capacity refill buffer.

use alloc::string::String;

use log::{debug, trace};

use crate::chunk_reader::Reader;
use crate::parse_error::{ParseError, XmlParseError};
use crate::recognizer::{classify, Next, RECOGNIZER_LOOKAHEAD};
use crate::shared::{Completion, Construct, Event, ParserConfig, UnexpectedState, XmlHandler};
use crate::stream_buffer::{skip_whitespace, StreamBuffer};

/// A SAX-style XML push parser.
///
/// The parser pulls input from a [`Reader`] into the caller's buffer and
/// pushes events to the handler in strict document order. Memory use is
/// bounded by the buffer: consumed bytes are discarded on every refill.
///
/// Any single construct other than character data and comments must fit in
/// the buffer; larger ones fail with [`ParseError::ConstructTooLarge`].
/// Character runs longer than the buffer are delivered in several
/// [`Event::Characters`] pieces, and comments of any length are skipped.
///
/// # Generic Parameters
///
/// * `'b` - Lifetime of the input buffer
/// * `R` - The input source
/// * `H` - The event handler type that implements [`XmlHandler`]
pub struct PushParser<'b, R: Reader, H> {
    pub(crate) reader: R,
    pub(crate) buffer: StreamBuffer<'b>,
    pub(crate) handler: H,
    pub(crate) config: ParserConfig,
    /// Open element count; may go negative on unbalanced input
    pub(crate) depth: i32,
    /// Cursor is between a start tag's name and its closing `>` or `/>`
    pub(crate) in_tag: bool,
    /// Reader has reported end of stream
    pub(crate) eof: bool,
    /// Bytes delivered by the reader so far
    pub(crate) bytes_read: usize,
    /// Decoded text of the current run: the last character run followed by
    /// any entities resolved since
    pub(crate) text: String,
    /// Qualified name of the start tag whose attributes are being read
    pub(crate) open_tag: String,
}

impl<'b, R: Reader, H> PushParser<'b, R, H> {
    /// Creates a new `PushParser` with the default configuration.
    pub fn new(reader: R, buffer: &'b mut [u8], handler: H) -> Self {
        Self::with_config(reader, buffer, handler, ParserConfig::default())
    }

    /// Creates a new `PushParser`. The buffer length is the capacity.
    pub fn with_config(reader: R, buffer: &'b mut [u8], handler: H, config: ParserConfig) -> Self {
        Self {
            reader,
            buffer: StreamBuffer::new(buffer),
            handler,
            config,
            depth: 0,
            in_tag: false,
            eof: false,
            bytes_read: 0,
            text: String::new(),
            open_tag: String::new(),
        }
    }

    /// Runs the dispatch loop until input is exhausted, the handler asks to
    /// stop, or an error occurs.
    ///
    /// Events already delivered stay delivered when an error is returned.
    /// After [`Completion::Stopped`], calling `parse` again resumes where
    /// the previous call left off.
    pub fn parse<E>(&mut self) -> Result<Completion, XmlParseError<E>>
    where
        H: XmlHandler<E>,
    {
        loop {
            if self.handler.should_stop() {
                debug!("Handler requested stop at byte {}", self.buffer.position());
                return Ok(Completion::Stopped);
            }

            if self.needs_refill() {
                self.refill()?;
                continue;
            }

            if self.buffer.is_empty() {
                debug!(
                    "End of input after {} bytes, depth {}",
                    self.bytes_read, self.depth
                );
                return Ok(Completion::EndOfInput);
            }

            self.ensure_lookahead(RECOGNIZER_LOOKAHEAD)?;
            let Some(next) = classify(self.buffer.unread(), self.in_tag, self.depth) else {
                continue;
            };

            if !matches!(next, Next::Characters | Next::Entity) {
                self.text.clear();
            }

            match next {
                Next::Declaration => self.consume_declaration::<E>()?,
                Next::EndTag => self.consume_end_tag::<E>()?,
                Next::StartTag => self.consume_start_tag::<E>()?,
                Next::Namespace => self.consume_namespace::<E>()?,
                Next::Attribute => self.consume_attribute::<E>()?,
                Next::CData => self.consume_cdata::<E>()?,
                Next::Comment => self.consume_comment::<E>()?,
                Next::BeforeRoot => self.consume_before_root::<E>()?,
                Next::Entity => self.consume_entity::<E>()?,
                Next::Characters => self.consume_characters::<E>()?,
                Next::Unsupported => {
                    return Err(ParseError::UnsupportedMarkup {
                        offset: self.buffer.position(),
                    }
                    .into())
                }
            }
        }
    }

    /// Current element nesting depth.
    pub fn depth(&self) -> i32 {
        self.depth
    }

    /// Bytes of input consumed so far.
    pub fn position(&self) -> usize {
        self.buffer.position()
    }

    /// Bytes delivered by the reader so far, including buffered lookahead.
    pub fn bytes_read(&self) -> usize {
        self.bytes_read
    }

    /// True once input and buffer are both exhausted.
    pub fn is_done(&self) -> bool {
        self.eof && self.buffer.is_empty()
    }

    /// Borrows the handler, e.g. to inspect tallies after a stop.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Destroys the parser and returns the handler.
    pub fn destroy(self) -> H {
        self.handler
    }

    /// True when fewer than the low-water mark of unread bytes remain and
    /// the reader may still have more. The mark is capped at the capacity so
    /// a full buffer never asks for more.
    pub(crate) fn needs_refill(&self) -> bool {
        let mark = self
            .config
            .low_water_mark
            .clamp(1, self.buffer.capacity().max(1));
        !self.eof && self.buffer.remaining_bytes() < mark
    }

    /// Discards consumed bytes, then reads until the buffer is full or the
    /// reader reports end of stream. Unread bytes keep their offsets
    /// relative to the cursor.
    pub(crate) fn refill(&mut self) -> Result<usize, ParseError> {
        let discarded = self.buffer.compact();
        let mut delivered = 0usize;

        while let Some(fill_slice) = self.buffer.fill_slice() {
            let bytes_read = self
                .reader
                .read(fill_slice)
                .map_err(|_| ParseError::ReaderError)?;
            if bytes_read == 0 {
                self.eof = true;
                break;
            }
            self.buffer.mark_filled(bytes_read)?;
            delivered = delivered.saturating_add(bytes_read);
        }

        self.bytes_read = self.bytes_read.saturating_add(delivered);
        trace!(
            "Refill: discarded {}, read {}, unread {}, eof {}",
            discarded,
            delivered,
            self.buffer.remaining_bytes(),
            self.eof
        );
        Ok(delivered)
    }

    /// Refills when fewer than `n` bytes are buffered and more may come.
    pub(crate) fn ensure_lookahead(&mut self, n: usize) -> Result<(), ParseError> {
        if !self.eof && self.buffer.remaining_bytes() < n {
            self.refill()?;
        }
        Ok(())
    }

    /// Runs `search` over the unread window, retrying once after a refill.
    ///
    /// The retry redoes the whole search from the cursor. Offsets returned
    /// are relative to the cursor and stay valid across the refill.
    pub(crate) fn locate<F>(&mut self, construct: Construct, mut search: F) -> Result<usize, ParseError>
    where
        F: FnMut(&[u8]) -> Option<usize>,
    {
        if let Some(pos) = search(self.buffer.unread()) {
            return Ok(pos);
        }
        if !self.eof {
            self.refill()?;
            if let Some(pos) = search(self.buffer.unread()) {
                return Ok(pos);
            }
        }
        Err(self.unterminated(construct))
    }

    /// Consumes whitespace at the cursor, refilling as often as needed.
    pub(crate) fn consume_whitespace(&mut self) -> Result<(), ParseError> {
        loop {
            let w = self.buffer.unread();
            let pos = skip_whitespace(w, 0);
            let exhausted = pos == w.len();
            self.buffer.advance(pos)?;
            if !exhausted || self.eof {
                return Ok(());
            }
            self.refill()?;
        }
    }

    /// Error for a terminator that could not be found: incomplete at end of
    /// input, too large otherwise.
    pub(crate) fn unterminated(&self, construct: Construct) -> ParseError {
        if self.eof {
            ParseError::IncompleteConstruct {
                construct,
                offset: self.buffer.position(),
            }
        } else {
            ParseError::ConstructTooLarge {
                construct,
                capacity: self.buffer.capacity(),
            }
        }
    }
}

/// Delivers one event, wrapping handler failures.
pub(crate) fn emit<H, E>(handler: &mut H, event: Event<'_>) -> Result<(), XmlParseError<E>>
where
    H: XmlHandler<E>,
{
    handler.handle_event(event).map_err(XmlParseError::Handler)
}

/// UTF-8 view of `window[start..end]`.
pub(crate) fn text_at(window: &[u8], start: usize, end: usize) -> Result<&str, ParseError> {
    let bytes = window
        .get(start..end)
        .ok_or(UnexpectedState::InvalidSliceBounds)?;
    Ok(core::str::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChunkReader;
    use std::vec::Vec;
    use test_log::test;

    #[derive(Default)]
    struct Recorder {
        events: Vec<std::string::String>,
        stop_after: Option<usize>,
    }

    impl XmlHandler<()> for Recorder {
        fn handle_event(&mut self, event: Event<'_>) -> Result<(), ()> {
            self.events.push(std::format!("{event:?}"));
            Ok(())
        }

        fn should_stop(&self) -> bool {
            self.stop_after.is_some_and(|n| self.events.len() >= n)
        }
    }

    fn parser_for<'b>(
        xml: &'b [u8],
        buffer: &'b mut [u8],
    ) -> PushParser<'b, ChunkReader<'b>, Recorder> {
        PushParser::new(ChunkReader::full_slice(xml), buffer, Recorder::default())
    }

    #[test]
    fn test_empty_input_is_done() {
        let mut buffer = [0u8; 16];
        let mut parser = parser_for(b"", &mut buffer);

        assert_eq!(parser.parse::<()>(), Ok(Completion::EndOfInput));
        assert!(parser.is_done());
        assert_eq!(parser.bytes_read(), 0);
        assert!(parser.destroy().events.is_empty());
    }

    #[test]
    fn test_refill_compacts_and_fills_to_capacity() {
        let mut buffer = [0u8; 8];
        let mut parser = parser_for(b"<a>0123456789</a>", &mut buffer);

        assert_eq!(parser.refill(), Ok(8));
        assert_eq!(parser.buffer.unread(), b"<a>01234");
        parser.buffer.advance(3).unwrap();

        assert_eq!(parser.refill(), Ok(3));
        assert_eq!(parser.buffer.unread(), b"01234567");
        assert_eq!(parser.position(), 3);
        assert_eq!(parser.bytes_read(), 11);
        assert!(!parser.eof);
    }

    #[test]
    fn test_refill_sets_eof_on_zero_read() {
        let mut buffer = [0u8; 8];
        let mut parser = parser_for(b"<a/>", &mut buffer);

        assert_eq!(parser.refill(), Ok(4));
        assert!(parser.eof);
        assert!(!parser.needs_refill());
    }

    #[test]
    fn test_needs_refill_below_low_water_mark() {
        let mut buffer = [0u8; 16];
        let mut parser = parser_for(b"<root>text</root>", &mut buffer);

        assert!(parser.needs_refill());
        parser.refill().unwrap();
        assert!(!parser.needs_refill());
        parser.buffer.advance(12).unwrap();
        // 4 unread bytes, reader not exhausted yet
        assert!(parser.needs_refill());
    }

    #[test]
    fn test_low_water_mark_above_capacity() {
        let mut buffer = [0u8; 4];
        let mut parser = PushParser::with_config(
            ChunkReader::full_slice(b"<a>text</a>"),
            &mut buffer,
            Recorder::default(),
            ParserConfig { low_water_mark: 64 },
        );

        parser.refill().unwrap();
        assert!(!parser.needs_refill());
        parser.buffer.advance(1).unwrap();
        assert!(parser.needs_refill());
    }

    #[test]
    fn test_locate_retries_after_refill() {
        let mut buffer = [0u8; 8];
        let mut parser = parser_for(b"<abcdef>", &mut buffer);

        let pos = parser
            .locate(Construct::StartTag, |w| w.iter().position(|b| *b == b'>'))
            .unwrap();
        assert_eq!(pos, 7);
    }

    #[test]
    fn test_locate_distinguishes_incomplete_from_too_large() {
        let mut buffer = [0u8; 4];
        let mut parser = parser_for(b"<abcdef>", &mut buffer);
        assert_eq!(
            parser.locate(Construct::StartTag, |w| w.iter().position(|b| *b == b'>')),
            Err(ParseError::ConstructTooLarge {
                construct: Construct::StartTag,
                capacity: 4
            })
        );

        let mut buffer = [0u8; 16];
        let mut parser = parser_for(b"<abc", &mut buffer);
        assert_eq!(
            parser.locate(Construct::StartTag, |w| w.iter().position(|b| *b == b'>')),
            Err(ParseError::IncompleteConstruct {
                construct: Construct::StartTag,
                offset: 0
            })
        );
    }

    #[test]
    fn test_consume_whitespace_across_refills() {
        let mut buffer = [0u8; 4];
        let mut parser = parser_for(b"          <a/>", &mut buffer);

        parser.refill().unwrap();
        parser.consume_whitespace().unwrap();
        assert_eq!(parser.position(), 10);
        assert_eq!(parser.buffer.peek(0), Some(b'<'));
    }

    #[test]
    fn test_should_stop_is_checked_before_each_step() {
        let mut buffer = [0u8; 32];
        let xml = b"<a><b/><c/></a>";
        let mut parser = PushParser::new(
            ChunkReader::full_slice(xml),
            &mut buffer,
            Recorder {
                stop_after: Some(2),
                ..Recorder::default()
            },
        );

        assert_eq!(parser.parse::<()>(), Ok(Completion::Stopped));
        assert_eq!(parser.handler().events.len(), 2);
        assert_eq!(parser.depth(), 1);

        // Resuming with the stop condition lifted finishes the document
        parser.handler.stop_after = None;
        assert_eq!(parser.parse::<()>(), Ok(Completion::EndOfInput));
        assert_eq!(parser.depth(), 0);
        assert_eq!(parser.destroy().events.len(), 4);
    }

    #[test]
    fn test_unsupported_markup() {
        let mut buffer = [0u8; 32];
        let mut parser = parser_for(b"<!DOCTYPE unit><unit/>", &mut buffer);
        assert_eq!(
            parser.parse::<()>(),
            Err(XmlParseError::Parse(ParseError::UnsupportedMarkup {
                offset: 0
            }))
        );
    }

    #[test]
    fn test_text_at_rejects_out_of_range() {
        assert_eq!(text_at(b"abc", 1, 3), Ok("bc"));
        assert_eq!(
            text_at(b"abc", 2, 5),
            Err(ParseError::Unexpected(UnexpectedState::InvalidSliceBounds))
        );
    }
}
