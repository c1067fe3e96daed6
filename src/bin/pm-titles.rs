//! Page titles as phrases
//!
//! Reads an (uncompressed) page title dump from STDIN, skips its header line, drops titles that
//! make poor phrases (qualified titles, single letters, plain numbers, disambiguation pages and
//! lists) and writes the rest lowercased with spaces instead of underscores, one per line.
//!
//! `zcat enwiki-latest-all-titles-in-ns0.gz | pm-titles > titles.txt`
//!

// argument parsing
#[macro_use] extern crate clap;
// logging
#[macro_use] extern crate log;
extern crate env_logger;
// lastly, this library
extern crate phrasemill;

use std::fs::File;
use std::io::{self, BufWriter};

use phrasemill::errors::*;
use phrasemill::sink::{LineSink, PhraseSink};
use phrasemill::titles::TitleFilter;

pub fn main() {
    // Main can't return a Result, and the ? operator needs the enclosing function to return Result
    inner_main().expect("Could not recover. Exiting.");
}
pub fn inner_main() -> Result<()> {
    env_logger::init();
    let args = app_from_crate!()
        .arg_from_usage("--output [output] 'file in which to store the phrases, instead of STDOUT'")
        .get_matches();

    let filter = TitleFilter::new()?;
    let stdin = io::stdin();
    let titles = filter.read_dump(stdin.lock())
        .collect::<Result<Vec<String>>>()?;
    info!("Kept {} titles", titles.len());

    let phrases = titles.into_iter().map(|title| (title,));
    let inserted = match args.value_of("output") {
        Some(path) => LineSink::new(BufWriter::new(File::create(path)?)).insert_phrases(phrases)?,
        None => {
            let stdout = io::stdout();
            LineSink::new(stdout.lock()).insert_phrases(phrases)?
        }
    };
    info!("Inserted {} page titles", inserted);
    Ok(())
}
