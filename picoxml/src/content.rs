// SPDX-License-Identifier: Apache-2.0

//! Consumers for element content: CDATA sections, comments, entity
//! references, character data, and whatever surrounds the root element.

use log::trace;

use crate::chunk_reader::Reader;
use crate::parse_error::{ParseError, XmlParseError};
use crate::push_parser::{emit, text_at, PushParser};
use crate::shared::{Construct, Event, XmlHandler};
use crate::stream_buffer::{find_byte, find_sequence, skip_whitespace};

const CDATA_OPEN: &[u8] = b"<![CDATA[";
const CDATA_CLOSE: &[u8] = b"]]>";
const COMMENT_OPEN: &[u8] = b"<!--";
const COMMENT_CLOSE: &[u8] = b"-->";

/// Entity references resolved to a single character. `&amp` is handled
/// separately because its `;` is mandatory.
const ENTITIES: [(&[u8], char); 2] = [(b"&lt;", '<'), (b"&gt;", '>')];
const AMP: &[u8] = b"&amp";

fn is_text_end(b: &u8) -> bool {
    *b == b'<' || *b == b'&'
}

/// Longest prefix of `window` that is complete UTF-8. A multi-byte character
/// cut off at the end of the window is left for the next piece.
fn utf8_boundary(window: &[u8]) -> Result<usize, ParseError> {
    match core::str::from_utf8(window) {
        Ok(_) => Ok(window.len()),
        Err(e) if e.error_len().is_none() => Ok(e.valid_up_to()),
        Err(e) => Err(e.into()),
    }
}

impl<R: Reader, H> PushParser<'_, R, H> {
    /// `<![CDATA[ ... ]]>`
    pub(crate) fn consume_cdata<E>(&mut self) -> Result<(), XmlParseError<E>>
    where
        H: XmlHandler<E>,
    {
        let offset = self.buffer.position();
        self.ensure_lookahead(CDATA_OPEN.len())?;

        let w = self.buffer.unread();
        if !w.starts_with(CDATA_OPEN) {
            if self.eof && CDATA_OPEN.starts_with(w) {
                return Err(ParseError::IncompleteConstruct {
                    construct: Construct::CData,
                    offset,
                }
                .into());
            }
            return Err(ParseError::UnsupportedMarkup { offset }.into());
        }

        let end = self.locate(Construct::CData, |w| {
            find_sequence(w, CDATA_OPEN.len(), CDATA_CLOSE)
        })?;
        let consumed = end + CDATA_CLOSE.len();

        let w = self.buffer.unread();
        emit(
            &mut self.handler,
            Event::CData {
                text: text_at(w, CDATA_OPEN.len(), end)?,
                offset: offset + consumed,
            },
        )?;

        self.buffer.advance(consumed)?;
        Ok(())
    }

    /// `<!-- ... -->`, followed by any whitespace.
    ///
    /// The body is never reported, so it is scanned in place and discarded
    /// as the buffer fills. Only the last two scanned bytes are kept, since
    /// they may begin the terminator.
    pub(crate) fn consume_comment<E>(&mut self) -> Result<(), XmlParseError<E>>
    where
        H: XmlHandler<E>,
    {
        let offset = self.buffer.position();
        let keep = COMMENT_CLOSE.len() - 1;
        let mut from = COMMENT_OPEN.len();

        let end = loop {
            let w = self.buffer.unread();
            if let Some(pos) = find_sequence(w, from, COMMENT_CLOSE) {
                break pos + COMMENT_CLOSE.len();
            }
            if self.eof {
                return Err(ParseError::IncompleteConstruct {
                    construct: Construct::Comment,
                    offset,
                }
                .into());
            }

            if self.buffer.is_full() {
                let discard = w.len().saturating_sub(keep);
                if discard == 0 {
                    return Err(ParseError::ConstructTooLarge {
                        construct: Construct::Comment,
                        capacity: self.buffer.capacity(),
                    }
                    .into());
                }
                trace!("Comment at byte {}: skipping {} bytes", offset, discard);
                self.buffer.advance(discard)?;
                from = from.saturating_sub(discard);
            }
            self.refill()?;
        };

        emit(&mut self.handler, Event::Comment)?;
        self.buffer.advance(end)?;
        self.consume_whitespace()?;
        Ok(())
    }

    /// `&lt;`, `&gt;` and `&amp;`. Any other `&` stands for itself.
    ///
    /// The decoded character extends the current text run, and the event
    /// carries the whole run.
    pub(crate) fn consume_entity<E>(&mut self) -> Result<(), XmlParseError<E>>
    where
        H: XmlHandler<E>,
    {
        let offset = self.buffer.position();
        self.ensure_lookahead(AMP.len() + 1)?;

        let w = self.buffer.unread();
        let (decoded, consumed) = if let Some((entity, c)) =
            ENTITIES.iter().find(|(entity, _)| w.starts_with(entity))
        {
            (*c, entity.len())
        } else if w.starts_with(AMP) {
            if w.get(AMP.len()) != Some(&b';') {
                return Err(ParseError::IncompleteConstruct {
                    construct: Construct::Entity,
                    offset,
                }
                .into());
            }
            ('&', AMP.len() + 1)
        } else {
            ('&', 1)
        };

        self.text.push(decoded);
        emit(
            &mut self.handler,
            Event::Entity {
                text: &self.text,
                offset: offset + consumed,
            },
        )?;

        self.buffer.advance(consumed)?;
        Ok(())
    }

    /// A run of text up to the next `<` or `&`.
    ///
    /// A run that does not fit in the buffer is delivered in pieces, each
    /// ending on a character boundary.
    pub(crate) fn consume_characters<E>(&mut self) -> Result<(), XmlParseError<E>>
    where
        H: XmlHandler<E>,
    {
        let mut stop = find_byte(self.buffer.unread(), 0, is_text_end);
        if stop.is_none() && !self.eof {
            self.refill()?;
            stop = find_byte(self.buffer.unread(), 0, is_text_end);
        }

        let w = self.buffer.unread();
        let stop = match stop {
            Some(pos) => pos,
            None if self.eof => w.len(),
            None => match utf8_boundary(w)? {
                0 => {
                    return Err(ParseError::ConstructTooLarge {
                        construct: Construct::Characters,
                        capacity: self.buffer.capacity(),
                    }
                    .into())
                }
                pos => pos,
            },
        };

        let text = text_at(w, 0, stop)?;
        self.text.clear();
        self.text.push_str(text);
        emit(
            &mut self.handler,
            Event::Characters {
                text,
                lookahead: w.get(stop).copied(),
            },
        )?;

        self.buffer.advance(stop)?;
        Ok(())
    }

    /// Whitespace before or after the root element. Anything other than
    /// whitespace or markup there is an error.
    pub(crate) fn consume_before_root<E>(&mut self) -> Result<(), XmlParseError<E>> {
        let w = self.buffer.unread();
        let stop = skip_whitespace(w, 0);
        if let Some(&b) = w.get(stop) {
            if b != b'<' {
                return Err(ParseError::UnexpectedContentBeforeRoot {
                    offset: self.buffer.position() + stop,
                }
                .into());
            }
        }

        self.buffer.advance(stop)?;
        Ok(())
    }
}
