// SPDX-License-Identifier: Apache-2.0

//! Markdown report of how many of each XML construct a document contains.

use clap::Parser;
use demos::xmlstats::XmlStats;
use demos::{parse_input, Cli};

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match parse_input(&cli, XmlStats::default()) {
        Ok((stats, _)) => print!("{}", stats.render()),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
