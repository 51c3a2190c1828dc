// SPDX-License-Identifier: Apache-2.0

//! A bounded-memory, SAX-style XML parser.
//!
//! The parser pulls bytes from a [`Reader`] into a caller-supplied, fixed-size
//! buffer and pushes one [`Event`] per recognized construct to an
//! [`XmlHandler`]. No tree is built and consumed input is never revisited.
//!
//! ```rust
//! use picoxml::{ChunkReader, Event, PushParser, XmlHandler};
//!
//! struct ElementCounter(usize);
//!
//! impl XmlHandler<()> for ElementCounter {
//!     fn handle_event(&mut self, event: Event<'_>) -> Result<(), ()> {
//!         if let Event::StartTag { .. } = event {
//!             self.0 += 1;
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let xml = br#"<unit><function>f</function></unit>"#;
//! let mut buffer = [0u8; 64];
//! let mut parser = PushParser::new(ChunkReader::full_slice(xml), &mut buffer, ElementCounter(0));
//! parser.parse::<()>().unwrap();
//! assert_eq!(parser.destroy().0, 2);
//! ```

#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod chunk_reader;
pub use chunk_reader::{ChunkReader, Reader};

mod content;

mod markup;

mod parse_error;
pub use parse_error::{ParseError, XmlParseError};

mod push_parser;
pub use push_parser::PushParser;

mod qname;
pub use qname::QName;

mod recognizer;

mod shared;
pub use shared::{Completion, Construct, Event, ParserConfig, UnexpectedState, XmlHandler};

mod stream_buffer;
