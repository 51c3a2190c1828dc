// SPDX-License-Identifier: Apache-2.0

// Example demonstrating PushParser with SAX-style event handling

use picoxml::{ChunkReader, Completion, Event, PushParser, XmlHandler, XmlParseError};

/// A simple event handler that prints XML events as they arrive
struct XmlEventPrinter {
    indent: usize,
    event_count: usize,
}

impl XmlEventPrinter {
    fn new() -> Self {
        Self {
            indent: 0,
            event_count: 0,
        }
    }

    fn indent_str(&self) -> String {
        "  ".repeat(self.indent)
    }
}

fn qualified(prefix: &str, local_name: &str) -> String {
    if prefix.is_empty() {
        local_name.to_string()
    } else {
        format!("{prefix}:{local_name}")
    }
}

impl XmlHandler<()> for XmlEventPrinter {
    fn handle_event(&mut self, event: Event<'_>) -> Result<(), ()> {
        self.event_count += 1;

        match event {
            Event::Declaration {
                version,
                encoding,
                standalone,
            } => {
                println!("📜 Declaration: version {version}, encoding {encoding}, standalone {standalone}");
            }
            Event::StartTag { local_name, prefix } => {
                println!("{}🏁 <{}>", self.indent_str(), qualified(prefix, local_name));
                self.indent += 1;
            }
            Event::EndTag { local_name, prefix } => {
                self.indent = self.indent.saturating_sub(1);
                println!("{}🏁 </{}>", self.indent_str(), qualified(prefix, local_name));
            }
            Event::Attribute {
                local_name,
                prefix,
                value,
            } => {
                println!(
                    "{}🔑 @{} = '{}'",
                    self.indent_str(),
                    qualified(prefix, local_name),
                    value
                );
            }
            Event::Namespace { uri, prefix } => {
                println!("{}🌐 xmlns:{} = '{}'", self.indent_str(), prefix, uri);
            }
            Event::CData { text, offset } => {
                println!("{}📦 CDATA: {:?} (byte {})", self.indent_str(), text, offset);
            }
            Event::Entity { text, offset } => {
                println!("{}🔣 Entity, text so far: {:?} (byte {})", self.indent_str(), text, offset);
            }
            Event::Characters { text, lookahead } => {
                println!(
                    "{}📝 Characters: {:?}, stopped at {:?}",
                    self.indent_str(),
                    text,
                    lookahead.map(char::from)
                );
            }
            Event::Comment => {
                println!("{}💬 Comment", self.indent_str());
            }
        }
        Ok(())
    }
}

fn main() -> Result<(), XmlParseError<()>> {
    println!("🚀 PushParser Demo - SAX-style XML Processing");
    println!("=============================================");
    println!();

    let xml = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<unit xmlns="http://www.srcML.org/srcML/src" xmlns:cpp="http://www.srcML.org/srcML/cpp" url="demo.cpp">
<!-- a tiny srcML document -->
<cpp:include>#<cpp:directive>include</cpp:directive> <cpp:file>&lt;stdio.h&gt;</cpp:file></cpp:include>
<function><type><name>int</name></type> <name>main</name>() <block>{
    <return>return <expr><literal type="number">0</literal></expr>;</return>
}</block></function>
<comment type="block"><![CDATA[/* done */]]></comment>
</unit>
"#;

    println!("📄 Input XML: {}", std::str::from_utf8(xml)?);
    println!("📏 Total size: {} bytes", xml.len());
    println!();

    // Deliver 16 bytes per read to exercise the refill logic
    let reader = ChunkReader::new(xml, 16);
    let mut buffer = [0u8; 128];
    let buffer_size = buffer.len();
    let mut parser = PushParser::new(reader, &mut buffer, XmlEventPrinter::new());

    println!("🔄 Starting PushParser:");
    println!("   Buffer size: {} bytes", buffer_size);
    println!();

    let completion = parser.parse::<()>()?;
    assert_eq!(completion, Completion::EndOfInput);
    let depth = parser.depth();
    let handler = parser.destroy();

    println!();
    println!(
        "✅ Successfully processed {} events, final depth {}",
        handler.event_count, depth
    );

    Ok(())
}
