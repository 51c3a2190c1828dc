// SPDX-License-Identifier: Apache-2.0

//! Source code facts from a srcML document: files, lines of code and the
//! number of functions, classes, declarations and similar elements.

use std::convert::Infallible;
use std::fmt::Write;

use picoxml::{Event, XmlHandler};

/// Tallies srcML elements and text as events arrive.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SrcFacts {
    /// Value of the last `url` attribute seen
    pub url: String,
    /// Characters of text, CDATA and decoded entities
    pub text_size: usize,
    pub loc: usize,
    pub files: usize,
    pub classes: usize,
    pub functions: usize,
    pub declarations: usize,
    pub expressions: usize,
    pub comments: usize,
    pub returns: usize,
    pub string_literals: usize,
    pub line_comments: usize,
}

fn newlines(text: &str) -> usize {
    text.bytes().filter(|b| *b == b'\n').count()
}

impl XmlHandler<Infallible> for SrcFacts {
    fn handle_event(&mut self, event: Event<'_>) -> Result<(), Infallible> {
        match event {
            Event::StartTag { local_name, .. } => {
                let count = match local_name {
                    "expr" => &mut self.expressions,
                    "function" => &mut self.functions,
                    "decl" => &mut self.declarations,
                    "class" => &mut self.classes,
                    "unit" => &mut self.files,
                    "comment" => &mut self.comments,
                    "return" => &mut self.returns,
                    _ => return Ok(()),
                };
                *count += 1;
            }
            Event::Attribute {
                local_name, value, ..
            } => {
                if local_name == "url" {
                    self.url = value.to_owned();
                }
                match value {
                    "string" => self.string_literals += 1,
                    "line" => self.line_comments += 1,
                    _ => {}
                }
            }
            Event::CData { text, .. } | Event::Characters { text, .. } => {
                self.text_size += text.len();
                self.loc += newlines(text);
            }
            // The event carries the whole run; only the new character counts
            Event::Entity { .. } => self.text_size += 1,
            _ => {}
        }
        Ok(())
    }
}

impl SrcFacts {
    /// Markdown report. `total` is the size of the srcML input in bytes.
    pub fn render(&self, total: usize) -> String {
        let rows = [
            ("srcML", total),
            ("files", self.files),
            ("LOC", self.loc),
            ("characters", self.text_size),
            ("classes", self.classes),
            ("functions", self.functions),
            ("declarations", self.declarations),
            ("expressions", self.expressions),
            ("comments", self.comments),
            ("returns", self.returns),
            ("string literals", self.string_literals),
            ("line comments", self.line_comments),
        ];

        let mut out = String::new();
        // Writing to a String cannot fail
        let _ = writeln!(out, "# srcFacts: {}", self.url);
        out.push_str("| Item | Count |\n");
        out.push_str("|:-----|-----:|\n");
        for (item, count) in rows {
            let _ = writeln!(out, "| {item} | {count} |");
        }
        out
    }
}
