// SPDX-License-Identifier: Apache-2.0

//! Counts of each kind of XML construct in a document.

use std::convert::Infallible;
use std::fmt::Write;

use picoxml::{Event, XmlHandler};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct XmlStats {
    pub declarations: usize,
    pub start_tags: usize,
    pub end_tags: usize,
    pub character_sections: usize,
    pub attributes: usize,
    pub namespaces: usize,
    pub comments: usize,
    pub cdata: usize,
    pub entities: usize,
}

impl XmlHandler<Infallible> for XmlStats {
    fn handle_event(&mut self, event: Event<'_>) -> Result<(), Infallible> {
        let count = match event {
            Event::Declaration { .. } => &mut self.declarations,
            Event::StartTag { .. } => &mut self.start_tags,
            Event::EndTag { .. } => &mut self.end_tags,
            Event::Characters { .. } => &mut self.character_sections,
            Event::Attribute { .. } => &mut self.attributes,
            Event::Namespace { .. } => &mut self.namespaces,
            Event::Comment => &mut self.comments,
            Event::CData { .. } => &mut self.cdata,
            Event::Entity { .. } => &mut self.entities,
        };
        *count += 1;
        Ok(())
    }
}

impl XmlStats {
    /// Markdown report, one row per construct.
    pub fn render(&self) -> String {
        let rows = [
            ("XML declarations", self.declarations),
            ("start tags", self.start_tags),
            ("end tags", self.end_tags),
            ("character sections", self.character_sections),
            ("attributes", self.attributes),
            ("namespaces", self.namespaces),
            ("comments", self.comments),
            ("CDATA", self.cdata),
            ("entity references", self.entities),
        ];

        let mut out = String::from("| Item | Count |\n|:-----|------:|\n");
        for (item, count) in rows {
            // Writing to a String cannot fail
            let _ = writeln!(out, "| {item} | {count} |");
        }
        out
    }
}
