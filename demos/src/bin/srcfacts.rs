// SPDX-License-Identifier: Apache-2.0

//! Markdown report of source code facts from a srcML document.
//!
//! ```text
//! srcfacts [--buffer-size N] [--low-water-mark N] [FILE]
//! ```

use clap::Parser;
use demos::srcfacts::SrcFacts;
use demos::{parse_input, Cli};

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match parse_input(&cli, SrcFacts::default()) {
        Ok((facts, total)) => print!("{}", facts.render(total)),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
