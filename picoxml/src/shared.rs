// SPDX-License-Identifier: Apache-2.0

//! Types shared by the parser, its consumers and event handlers.

/// Events produced by the parser, one per recognized construct.
///
/// All string payloads borrow either the parser's input buffer or its
/// internal accumulators, so they are only valid for the duration of the
/// [`XmlHandler::handle_event`] call.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Event<'a> {
    /// An `<?xml version=.. encoding=.. standalone=..?>` declaration.
    Declaration {
        version: &'a str,
        encoding: &'a str,
        standalone: &'a str,
    },
    /// A start tag that is not immediately self-closed.
    StartTag { local_name: &'a str, prefix: &'a str },
    /// An end tag, or the close of a self-closing tag.
    EndTag { local_name: &'a str, prefix: &'a str },
    /// An attribute inside a start tag.
    Attribute {
        local_name: &'a str,
        prefix: &'a str,
        value: &'a str,
    },
    /// An `xmlns` or `xmlns:prefix` declaration. `prefix` is empty for the
    /// default namespace.
    Namespace { uri: &'a str, prefix: &'a str },
    /// The raw body of a CDATA section.
    CData { text: &'a str, offset: usize },
    /// Decoded text of the current text run, up to and including the entity
    /// just resolved.
    Entity { text: &'a str, offset: usize },
    /// A run of character data, and the byte that stopped the scan.
    Characters {
        text: &'a str,
        lookahead: Option<u8>,
    },
    /// A comment. Comment bodies are not reported.
    Comment,
}

/// Constructs of the supported XML subset, used to attribute errors.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Construct {
    Declaration,
    StartTag,
    EndTag,
    Namespace,
    Attribute,
    CData,
    Comment,
    Entity,
    Characters,
}

impl core::fmt::Display for Construct {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Construct::Declaration => "XML declaration",
            Construct::StartTag => "element start tag",
            Construct::EndTag => "element end tag",
            Construct::Namespace => "namespace declaration",
            Construct::Attribute => "attribute",
            Construct::CData => "CDATA section",
            Construct::Comment => "XML comment",
            Construct::Entity => "entity reference",
            Construct::Characters => "character data",
        };
        f.write_str(name)
    }
}

/// Internal invariant violations that should never surface on valid use.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum UnexpectedState {
    /// The reader claimed to deliver more bytes than it was offered.
    BufferCapacityExceeded,
    /// A computed range fell outside the buffered data.
    InvalidSliceBounds,
}

/// How a call to [`crate::PushParser::parse`] ended.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Completion {
    /// Input and buffer are both exhausted.
    EndOfInput,
    /// The handler asked to stop via [`XmlHandler::should_stop`].
    Stopped,
}

/// Parser tuning that is not implied by the buffer itself.
///
/// The buffer capacity is the length of the slice handed to the parser.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct ParserConfig {
    /// Refill when fewer than this many unread bytes remain.
    pub low_water_mark: usize,
}

impl ParserConfig {
    pub const DEFAULT_LOW_WATER_MARK: usize = 5;
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            low_water_mark: Self::DEFAULT_LOW_WATER_MARK,
        }
    }
}

/// Receives parser events.
///
/// Handlers match on the variants they care about and ignore the rest.
/// Returning an error aborts the parse and surfaces as
/// [`crate::XmlParseError::Handler`].
///
/// # Generic Parameters
///
/// * `E` - The error type that can be returned by the handler
pub trait XmlHandler<E> {
    /// Handles a single, complete event.
    fn handle_event(&mut self, event: Event<'_>) -> Result<(), E>;

    /// Checked before every dispatch step; returning `true` makes
    /// [`crate::PushParser::parse`] return [`Completion::Stopped`].
    fn should_stop(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        assert_eq!(ParserConfig::default().low_water_mark, 5);
    }

    #[test]
    fn test_construct_display() {
        assert_eq!(std::format!("{}", Construct::Comment), "XML comment");
        assert_eq!(std::format!("{}", Construct::StartTag), "element start tag");
    }
}
