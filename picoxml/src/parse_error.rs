// SPDX-License-Identifier: Apache-2.0

use crate::shared::{Construct, UnexpectedState};
use crate::stream_buffer::StreamBufferError;

/// Errors that can occur during XML parsing
///
/// Every structural error is fatal for the current parse. Offsets are the
/// number of input bytes consumed when the failing construct started.
#[derive(Debug, PartialEq)]
pub enum ParseError {
    /// A terminator (`>`, `]]>`, `-->`, `;`, closing quote) was not found
    /// before the end of input.
    IncompleteConstruct { construct: Construct, offset: usize },
    /// A construct did not fit in the buffer even after a refill.
    ConstructTooLarge { construct: Construct, capacity: usize },
    /// Missing `=`, or a missing or mismatched quote delimiter.
    MalformedAttributeSyntax { construct: Construct, offset: usize },
    /// The XML declaration did not contain `version`, `encoding` and
    /// `standalone` in that order.
    UnexpectedDeclarationAttribute {
        expected: &'static str,
        offset: usize,
    },
    /// Non-whitespace content outside the root element.
    UnexpectedContentBeforeRoot { offset: usize },
    /// Markup outside the supported subset, such as `<!DOCTYPE` or a
    /// processing instruction.
    UnsupportedMarkup { offset: usize },
    /// A name, value or text slice was not valid UTF-8.
    InvalidUtf8(core::str::Utf8Error),
    /// Error from the underlying reader (I/O error, not end-of-stream)
    ReaderError,
    /// The parser entered an unexpected internal state.
    Unexpected(UnexpectedState),
}

impl From<StreamBufferError> for ParseError {
    fn from(err: StreamBufferError) -> Self {
        match err {
            StreamBufferError::Unexpected => {
                ParseError::Unexpected(UnexpectedState::BufferCapacityExceeded)
            }
            StreamBufferError::InvalidSliceBounds => {
                ParseError::Unexpected(UnexpectedState::InvalidSliceBounds)
            }
        }
    }
}

impl From<core::str::Utf8Error> for ParseError {
    fn from(err: core::str::Utf8Error) -> Self {
        ParseError::InvalidUtf8(err)
    }
}

impl From<UnexpectedState> for ParseError {
    fn from(info: UnexpectedState) -> Self {
        ParseError::Unexpected(info)
    }
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ParseError::IncompleteConstruct { construct, offset } => {
                write!(f, "Incomplete {construct} at byte {offset}")
            }
            ParseError::ConstructTooLarge {
                construct,
                capacity,
            } => write!(
                f,
                "{construct} does not fit in a {capacity} byte buffer"
            ),
            ParseError::MalformedAttributeSyntax { construct, offset } => {
                write!(f, "Missing '=' or delimiter in {construct} at byte {offset}")
            }
            ParseError::UnexpectedDeclarationAttribute { expected, offset } => write!(
                f,
                "Missing required attribute {expected} in XML declaration at byte {offset}"
            ),
            ParseError::UnexpectedContentBeforeRoot { offset } => {
                write!(f, "Start tag expected, '<' not found at byte {offset}")
            }
            ParseError::UnsupportedMarkup { offset } => {
                write!(f, "Unsupported markup at byte {offset}")
            }
            ParseError::InvalidUtf8(e) => write!(f, "Invalid UTF-8: {e}"),
            _ => write!(f, "{self:?}"),
        }
    }
}

/// An error that can occur during push-based parsing.
#[derive(Debug, PartialEq)]
pub enum XmlParseError<E> {
    /// An error occurred within the parser itself.
    Parse(ParseError),
    /// An error was returned by the user's handler.
    Handler(E),
}

impl<E> From<ParseError> for XmlParseError<E> {
    fn from(e: ParseError) -> Self {
        XmlParseError::Parse(e)
    }
}

impl<E> From<StreamBufferError> for XmlParseError<E> {
    fn from(e: StreamBufferError) -> Self {
        XmlParseError::Parse(e.into())
    }
}

impl<E> From<core::str::Utf8Error> for XmlParseError<E> {
    fn from(e: core::str::Utf8Error) -> Self {
        XmlParseError::Parse(ParseError::InvalidUtf8(e))
    }
}

impl<E: core::fmt::Display> core::fmt::Display for XmlParseError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            XmlParseError::Parse(e) => write!(f, "parser error: {e}"),
            XmlParseError::Handler(e) => write!(f, "handler error: {e}"),
        }
    }
}
