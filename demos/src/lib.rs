// SPDX-License-Identifier: Apache-2.0

//! Report generators built on `picoxml`.
//!
//! Both tools read one document from a file or stdin through a fixed-size
//! buffer and print a Markdown table. The collectors live here so they can
//! be tested without going through the binaries.

use std::convert::Infallible;
use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::Parser;
use log::{debug, info};
use picoxml::{ParserConfig, PushParser, XmlHandler, XmlParseError};

pub mod srcfacts;
pub mod xmlstats;

/// Default parse buffer capacity, 1 MiB.
pub const DEFAULT_BUFFER_SIZE: usize = 16 * 16 * 4096;

/// Command line shared by the report tools.
#[derive(Parser, Debug)]
#[command(version, about = "Markdown report over a single XML document")]
pub struct Cli {
    /// Input document; stdin when omitted
    pub input: Option<PathBuf>,

    /// Parse buffer capacity in bytes. Bounds the largest tag, CDATA
    /// section or declaration that can be parsed.
    #[arg(long, default_value_t = DEFAULT_BUFFER_SIZE)]
    pub buffer_size: usize,

    /// Refill the buffer when fewer unread bytes than this remain
    #[arg(long, default_value_t = ParserConfig::DEFAULT_LOW_WATER_MARK)]
    pub low_water_mark: usize,
}

/// Adapts any [`std::io::Read`] to [`picoxml::Reader`].
pub struct IoReader<R> {
    inner: R,
}

impl<R: Read> IoReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: Read> picoxml::Reader for IoReader<R> {
    type Error = io::Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        loop {
            match self.inner.read(buf) {
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                other => return other,
            }
        }
    }
}

/// Failure of a report tool.
#[derive(Debug)]
pub enum DemoError {
    /// The input file could not be opened
    Open(PathBuf, io::Error),
    /// The document could not be parsed
    Parse(XmlParseError<Infallible>),
}

impl From<XmlParseError<Infallible>> for DemoError {
    fn from(e: XmlParseError<Infallible>) -> Self {
        DemoError::Parse(e)
    }
}

impl std::fmt::Display for DemoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DemoError::Open(path, e) => write!(f, "Unable to open '{}': {}", path.display(), e),
            DemoError::Parse(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for DemoError {}

/// Parses the document selected by `cli` into `handler`.
///
/// Returns the handler and the number of bytes consumed.
pub fn parse_input<H>(cli: &Cli, handler: H) -> Result<(H, usize), DemoError>
where
    H: XmlHandler<Infallible>,
{
    let source: Box<dyn Read> = match &cli.input {
        Some(path) => {
            let file = File::open(path).map_err(|e| DemoError::Open(path.clone(), e))?;
            Box::new(file)
        }
        None => Box::new(io::stdin().lock()),
    };
    parse_reader(source, cli, handler)
}

/// Like [`parse_input`], for an already open source.
pub fn parse_reader<R, H>(source: R, cli: &Cli, handler: H) -> Result<(H, usize), DemoError>
where
    R: Read,
    H: XmlHandler<Infallible>,
{
    let mut buffer = vec![0u8; cli.buffer_size.max(1)];
    debug!(
        "Parsing with a {} byte buffer, low-water mark {}",
        buffer.len(),
        cli.low_water_mark
    );

    let config = ParserConfig {
        low_water_mark: cli.low_water_mark,
    };
    let mut parser = PushParser::with_config(IoReader::new(source), &mut buffer, handler, config);
    parser.parse::<Infallible>()?;

    let total = parser.position();
    info!("Parsed {} bytes, final depth {}", total, parser.depth());
    Ok((parser.destroy(), total))
}
