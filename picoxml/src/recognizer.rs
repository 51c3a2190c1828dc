// SPDX-License-Identifier: Apache-2.0

//! Classification of the construct starting at the cursor.
//!
//! Recognizers only look; they never consume input. The caller guarantees
//! that at least [`RECOGNIZER_LOOKAHEAD`] bytes are buffered unless the input
//! is exhausted, so a decision never depends on where a refill boundary fell.

/// Longest prefix any rule inspects (`xmlns:`).
pub const RECOGNIZER_LOOKAHEAD: usize = XMLNS.len() + 1;

pub const XMLNS: &[u8] = b"xmlns";

/// What the dispatch loop should consume next.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Next {
    Declaration,
    EndTag,
    StartTag,
    Namespace,
    Attribute,
    CData,
    Comment,
    /// Content outside the root element
    BeforeRoot,
    Entity,
    Characters,
    /// `<!` markup other than CDATA or a comment
    Unsupported,
}

/// Applies the dispatch rules in priority order. Returns `None` for an
/// empty window.
pub fn classify(window: &[u8], in_tag: bool, depth: i32) -> Option<Next> {
    let first = *window.first()?;
    let second = window.get(1).copied();

    if first == b'<' {
        return Some(match second {
            Some(b'?') => Next::Declaration,
            Some(b'/') => Next::EndTag,
            Some(b'!') => classify_bang(window),
            _ => Next::StartTag,
        });
    }

    if in_tag {
        if is_namespace(window) {
            return Some(Next::Namespace);
        }
        if first != b'>' && first != b'/' {
            return Some(Next::Attribute);
        }
    }

    Some(if depth == 0 {
        Next::BeforeRoot
    } else if first == b'&' {
        Next::Entity
    } else {
        Next::Characters
    })
}

fn classify_bang(window: &[u8]) -> Next {
    if window.starts_with(b"<![") {
        Next::CData
    } else if window.starts_with(b"<!--") {
        Next::Comment
    } else {
        Next::Unsupported
    }
}

/// `xmlns` followed by `:` (prefixed) or `=` (default namespace)
fn is_namespace(window: &[u8]) -> bool {
    window.starts_with(XMLNS) && matches!(window.get(XMLNS.len()), Some(b':') | Some(b'='))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markup_rules() {
        assert_eq!(classify(b"<?xml ", false, 0), Some(Next::Declaration));
        assert_eq!(classify(b"</a>", false, 1), Some(Next::EndTag));
        assert_eq!(classify(b"<a>", false, 0), Some(Next::StartTag));
        assert_eq!(classify(b"<![CDATA[", false, 1), Some(Next::CData));
        assert_eq!(classify(b"<!-- x", false, 1), Some(Next::Comment));
        assert_eq!(classify(b"<!DOCTYPE", false, 0), Some(Next::Unsupported));
    }

    #[test]
    fn test_lone_angle_bracket_is_start_tag() {
        // Truncated input still routes to the start tag consumer, which
        // reports the missing '>'.
        assert_eq!(classify(b"<", false, 0), Some(Next::StartTag));
    }

    #[test]
    fn test_in_tag_rules() {
        assert_eq!(classify(b"xmlns=\"u\"", true, 1), Some(Next::Namespace));
        assert_eq!(classify(b"xmlns:cpp=", true, 1), Some(Next::Namespace));
        assert_eq!(classify(b"xmlnsx=\"u\"", true, 1), Some(Next::Attribute));
        assert_eq!(classify(b"url=\"u\"", true, 1), Some(Next::Attribute));
        // Outside a tag the same bytes are character data
        assert_eq!(classify(b"xmlns=\"u\"", false, 1), Some(Next::Characters));
        // A stray close inside a tag is not an attribute
        assert_eq!(classify(b"> x", true, 1), Some(Next::Characters));
    }

    #[test]
    fn test_content_rules() {
        assert_eq!(classify(b"  \n<a>", false, 0), Some(Next::BeforeRoot));
        assert_eq!(classify(b"&lt;", false, 0), Some(Next::BeforeRoot));
        assert_eq!(classify(b"&lt;", false, 1), Some(Next::Entity));
        assert_eq!(classify(b"hi<", false, 1), Some(Next::Characters));
        assert_eq!(classify(b"", false, 1), None);
    }

    #[test]
    fn test_lookahead_covers_longest_rule() {
        assert_eq!(RECOGNIZER_LOOKAHEAD, b"xmlns:".len());
    }
}
