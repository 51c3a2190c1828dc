// SPDX-License-Identifier: Apache-2.0

//! Consumers for markup: the XML declaration, start and end tags, namespace
//! declarations and attributes.
//!
//! Every consumer works on offsets relative to the cursor, which survive a
//! refill, and only advances the cursor once the whole construct has been
//! recognized and its event delivered.

use core::ops::Range;

use crate::chunk_reader::Reader;
use crate::parse_error::{ParseError, XmlParseError};
use crate::push_parser::{emit, text_at, PushParser};
use crate::qname::QName;
use crate::recognizer::XMLNS;
use crate::shared::{Construct, Event, XmlHandler};
use crate::stream_buffer::{find_byte, skip_whitespace};

const XML_DECL_OPEN: &[u8] = b"<?xml";

/// How a start tag continues after a name or an attribute value.
#[derive(Debug, PartialEq, Clone, Copy)]
enum TagClose {
    /// More attributes follow at this offset
    Pending(usize),
    /// `>` ends at this offset, content follows
    Open(usize),
    /// `/>` ends at this offset
    Empty(usize),
}

impl TagClose {
    fn consumed(self) -> usize {
        match self {
            TagClose::Pending(n) | TagClose::Open(n) | TagClose::Empty(n) => n,
        }
    }
}

fn is_name_end(b: &u8) -> bool {
    b.is_ascii_whitespace() || *b == b'>' || *b == b'/'
}

fn is_quote(b: u8) -> bool {
    b == b'"' || b == b'\''
}

/// Parses `name="value"` inside the declaration `tok` (which excludes the
/// closing `>`), starting at `from`. Returns the value range and the offset
/// just past the closing delimiter.
fn declaration_attribute(
    tok: &[u8],
    from: usize,
    expected: &'static str,
    offset: usize,
) -> Result<(Range<usize>, usize), ParseError> {
    let missing = ParseError::UnexpectedDeclarationAttribute { expected, offset };
    let malformed = ParseError::MalformedAttributeSyntax {
        construct: Construct::Declaration,
        offset,
    };

    let start = skip_whitespace(tok, from);
    let eq = find_byte(tok, start, |b| *b == b'=').ok_or(missing)?;
    if tok.get(start..eq) != Some(expected.as_bytes()) {
        return Err(ParseError::UnexpectedDeclarationAttribute { expected, offset });
    }

    let delim = match tok.get(eq + 1) {
        Some(&b) if is_quote(b) => b,
        _ => return Err(malformed),
    };
    let value_end = find_byte(tok, eq + 2, |b| *b == delim).ok_or(malformed)?;
    Ok((eq + 2..value_end, value_end + 1))
}

impl<R: Reader, H> PushParser<'_, R, H> {
    /// `<?xml version=".." encoding=".." standalone=".."?>`
    pub(crate) fn consume_declaration<E>(&mut self) -> Result<(), XmlParseError<E>>
    where
        H: XmlHandler<E>,
    {
        let offset = self.buffer.position();
        let end = self.locate(Construct::Declaration, |w| find_byte(w, 0, |b| *b == b'>'))?;

        let w = self.buffer.unread();
        let opens_declaration = w.starts_with(XML_DECL_OPEN)
            && w.get(XML_DECL_OPEN.len()).is_some_and(u8::is_ascii_whitespace);
        if !opens_declaration {
            return Err(ParseError::UnsupportedMarkup { offset }.into());
        }

        let tok = w.get(..end).unwrap_or_default();
        let (version, next) = declaration_attribute(tok, XML_DECL_OPEN.len(), "version", offset)?;
        let (encoding, next) = declaration_attribute(tok, next, "encoding", offset)?;
        let (standalone, next) = declaration_attribute(tok, next, "standalone", offset)?;

        let close = skip_whitespace(tok, next);
        if close + 1 != end || tok.get(close) != Some(&b'?') {
            return Err(ParseError::IncompleteConstruct {
                construct: Construct::Declaration,
                offset,
            }
            .into());
        }

        emit(
            &mut self.handler,
            Event::Declaration {
                version: text_at(w, version.start, version.end)?,
                encoding: text_at(w, encoding.start, encoding.end)?,
                standalone: text_at(w, standalone.start, standalone.end)?,
            },
        )?;

        self.buffer.advance(end + 1)?;
        self.consume_whitespace()?;
        Ok(())
    }

    /// `</name>`
    pub(crate) fn consume_end_tag<E>(&mut self) -> Result<(), XmlParseError<E>>
    where
        H: XmlHandler<E>,
    {
        self.depth = self.depth.saturating_sub(1);

        let offset = self.buffer.position();
        let end = self.locate(Construct::EndTag, |w| find_byte(w, 0, |b| *b == b'>'))?;

        let w = self.buffer.unread();
        let name_end = find_byte(w, 2, is_name_end).unwrap_or(end);
        if name_end <= 2 {
            return Err(ParseError::IncompleteConstruct {
                construct: Construct::EndTag,
                offset,
            }
            .into());
        }

        let qname = QName::split(text_at(w, 2, name_end)?);
        emit(
            &mut self.handler,
            Event::EndTag {
                local_name: qname.local_name,
                prefix: qname.prefix,
            },
        )?;

        self.buffer.advance(end + 1)?;
        Ok(())
    }

    /// `<name`, followed by `>`, `/>` or attributes.
    ///
    /// A tag closed by `/>` right after its name produces only an
    /// [`Event::EndTag`].
    pub(crate) fn consume_start_tag<E>(&mut self) -> Result<(), XmlParseError<E>>
    where
        H: XmlHandler<E>,
    {
        let offset = self.buffer.position();
        let end = self.locate(Construct::StartTag, |w| find_byte(w, 0, |b| *b == b'>'))?;

        let w = self.buffer.unread();
        let name_end = find_byte(w, 1, is_name_end).unwrap_or(end);
        if name_end <= 1 {
            return Err(ParseError::IncompleteConstruct {
                construct: Construct::StartTag,
                offset,
            }
            .into());
        }

        let raw = text_at(w, 1, name_end)?;
        let qname = QName::split(raw);
        let pos = skip_whitespace(w, name_end);
        self.depth = self.depth.saturating_add(1);

        let close = match (w.get(pos), w.get(pos + 1)) {
            (Some(b'>'), _) => TagClose::Open(pos + 1),
            (Some(b'/'), Some(b'>')) => TagClose::Empty(pos + 2),
            _ => TagClose::Pending(pos),
        };

        if let TagClose::Empty(_) = close {
            self.depth = self.depth.saturating_sub(1);
            emit(
                &mut self.handler,
                Event::EndTag {
                    local_name: qname.local_name,
                    prefix: qname.prefix,
                },
            )?;
        } else {
            emit(
                &mut self.handler,
                Event::StartTag {
                    local_name: qname.local_name,
                    prefix: qname.prefix,
                },
            )?;
        }

        self.in_tag = matches!(close, TagClose::Pending(_));
        if self.in_tag {
            self.open_tag.clear();
            self.open_tag.push_str(raw);
        }

        self.buffer.advance(close.consumed())?;
        Ok(())
    }

    /// `xmlns="uri"` or `xmlns:prefix="uri"` inside a start tag
    pub(crate) fn consume_namespace<E>(&mut self) -> Result<(), XmlParseError<E>>
    where
        H: XmlHandler<E>,
    {
        let offset = self.buffer.position();
        let eq = self.attribute_equals(Construct::Namespace, XMLNS.len(), offset)?;
        let value = self.attribute_value(eq, Construct::Namespace, offset)?;
        let close = self.tag_close(value.end + 1, Construct::Namespace)?;

        let w = self.buffer.unread();
        let prefix = match w.get(XMLNS.len()) {
            Some(b':') => text_at(w, XMLNS.len() + 1, eq)?.trim_end(),
            _ => "",
        };
        emit(
            &mut self.handler,
            Event::Namespace {
                uri: text_at(w, value.start, value.end)?,
                prefix,
            },
        )?;

        self.finish_tag(close)
    }

    /// `name="value"` or `prefix:name='value'` inside a start tag
    pub(crate) fn consume_attribute<E>(&mut self) -> Result<(), XmlParseError<E>>
    where
        H: XmlHandler<E>,
    {
        let offset = self.buffer.position();
        let eq = self.attribute_equals(Construct::Attribute, 0, offset)?;
        let value = self.attribute_value(eq, Construct::Attribute, offset)?;
        let close = self.tag_close(value.end + 1, Construct::Attribute)?;

        let w = self.buffer.unread();
        let qname = QName::split(text_at(w, 0, eq)?.trim_end());
        emit(
            &mut self.handler,
            Event::Attribute {
                local_name: qname.local_name,
                prefix: qname.prefix,
                value: text_at(w, value.start, value.end)?,
            },
        )?;

        self.finish_tag(close)
    }

    /// Offset of the `=` after an attribute name. The tag must not close
    /// first.
    fn attribute_equals(
        &mut self,
        construct: Construct,
        from: usize,
        offset: usize,
    ) -> Result<usize, ParseError> {
        let eq = self.locate(construct, |w| {
            find_byte(w, from, |b| *b == b'=' || *b == b'>')
        })?;
        if self.buffer.peek(eq) != Some(b'=') {
            return Err(ParseError::MalformedAttributeSyntax { construct, offset });
        }
        Ok(eq)
    }

    /// Range of a quoted value following the `=` at `eq`. Whitespace may
    /// separate `=` from the opening delimiter. The closing delimiter is
    /// searched for without regard to `>`.
    fn attribute_value(
        &mut self,
        eq: usize,
        construct: Construct,
        offset: usize,
    ) -> Result<Range<usize>, ParseError> {
        let malformed = ParseError::MalformedAttributeSyntax { construct, offset };

        let open = self.locate(construct, |w| {
            find_byte(w, eq + 1, |b| !b.is_ascii_whitespace())
        })?;
        let delim = match self.buffer.peek(open) {
            Some(b) if is_quote(b) => b,
            _ => return Err(malformed),
        };

        let close = self
            .locate(construct, |w| find_byte(w, open + 1, |b| *b == delim))
            .map_err(|e| match e {
                ParseError::IncompleteConstruct { .. } => malformed,
                other => other,
            })?;
        Ok(open + 1..close)
    }

    /// Classifies what follows an attribute value ending before `from`.
    fn tag_close(&mut self, from: usize, construct: Construct) -> Result<TagClose, ParseError> {
        let pos = self.locate(construct, |w| {
            let pos = find_byte(w, from, |b| !b.is_ascii_whitespace())?;
            // A '/' is only meaningful together with the byte after it
            match w.get(pos) {
                Some(b'/') if w.get(pos + 1).is_none() => None,
                _ => Some(pos),
            }
        })?;

        Ok(match (self.buffer.peek(pos), self.buffer.peek(pos + 1)) {
            (Some(b'>'), _) => TagClose::Open(pos + 1),
            (Some(b'/'), Some(b'>')) => TagClose::Empty(pos + 2),
            _ => TagClose::Pending(pos),
        })
    }

    /// Applies a tag close found after an attribute or namespace. A `/>`
    /// closes the element opened by the enclosing start tag.
    fn finish_tag<E>(&mut self, close: TagClose) -> Result<(), XmlParseError<E>>
    where
        H: XmlHandler<E>,
    {
        match close {
            TagClose::Pending(_) => {}
            TagClose::Open(_) => self.in_tag = false,
            TagClose::Empty(_) => {
                self.in_tag = false;
                self.depth = self.depth.saturating_sub(1);
                let qname = QName::split(&self.open_tag);
                emit(
                    &mut self.handler,
                    Event::EndTag {
                        local_name: qname.local_name,
                        prefix: qname.prefix,
                    },
                )?;
            }
        }

        self.buffer.advance(close.consumed())?;
        Ok(())
    }
}
