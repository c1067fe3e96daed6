//! Find salient two-word phrases in a corpus
//!
//! Documents are read from STDIN, either as extracted wiki `<doc>` blocks or one per line, and
//! tokenized at unicode word boundaries. Bigrams are counted with lossy counting (so memory stays
//! around `1/delta` entries no matter how large the corpus is) and scored by PMI,
//! `ln(P(x|y) / P(x))`. Bigrams scoring at least the threshold are written one per line.
//!
//! The threshold is on the natural log scale: 0 is "as likely as chance", ln(2) = 0.69 is "twice
//! as likely". Try a few values on a sample of your corpus first.
//!

// argument parsing
#[macro_use] extern crate clap;
// logging
#[macro_use] extern crate log;
extern crate env_logger;
// parallel counting
extern crate rayon;
// lastly, this library
extern crate phrasemill;

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::sync::Arc;

use phrasemill::errors::*;
use phrasemill::extracted::{DocStream, InputFormat};
use phrasemill::pipeline::{PhraseMiner, Settings};
use phrasemill::sink::{LineSink, PhraseSink};
use phrasemill::tokens::{StopwordSet, WordBoundaryTokenizer};

/// Documents per parallel batch
const BATCH_SIZE: usize = 10_000;

pub fn main() {
    // Main can't return a Result, and the ? operator needs the enclosing function to return Result
    inner_main().expect("Could not recover. Exiting.");
}
pub fn inner_main() -> Result<()> {
    env_logger::init();
    let args = app_from_crate!()
        .arg_from_usage("--threshold <threshold> 'minimum PMI (natural log) for a phrase to be kept'")
        .arg_from_usage("--delta [delta] 'lossy counting error bound, between 0 and 1 (default 0.005)'")
        .arg_from_usage("--stopwords [stopwords] 'file of extra stopwords, one per line'")
        .arg_from_usage("--format [format] 'extracted (<doc> blocks, the default) or lines'")
        .arg_from_usage("--threads [threads] 'count on this many threads (default 1)'")
        .arg_from_usage("--output [output] 'file in which to store the phrases, instead of STDOUT'")
        .get_matches();

    let delta: f64 = args.value_of("delta").unwrap_or("0.005").parse()?;
    let threshold = value_t!(args, "threshold", f64).unwrap_or_else(|e| e.exit());
    let settings = Settings::new(delta, threshold)?;
    let format: InputFormat = args.value_of("format").unwrap_or("extracted").parse()?;
    let threads = if args.is_present("threads") {
        value_t!(args, "threads", usize).unwrap_or_else(|e| e.exit())
    } else { 1 };

    let mut stopwords = StopwordSet::english();
    if let Some(path) = args.value_of("stopwords") {
        let file = File::open(path)
            .map_err(|err| Error::MissingFile("stopword list", Some(err)))?;
        stopwords.extend_from_reader(BufReader::new(file))?;
    }
    info!("Counting with delta {} ({} stopwords), keeping a PMI of at least {}",
        settings.delta, stopwords.len(), settings.pmi_threshold);

    let stdin = io::stdin();
    let documents = DocStream::new(stdin.lock(), format);
    let mut miner = PhraseMiner::new(settings, Arc::new(stopwords))?;
    if threads > 1 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .map_err(|err| Error::Other(format!("Couldn't start {} threads: {}", threads, err)))?;
        miner.ingest_parallel(documents, &WordBoundaryTokenizer, BATCH_SIZE)?;
    } else {
        miner.ingest(documents, &WordBoundaryTokenizer)?;
    }

    let phrases = miner.finish().phrases()?;
    let inserted = match args.value_of("output") {
        Some(path) => LineSink::new(BufWriter::new(File::create(path)?)).insert_phrases(phrases)?,
        None => {
            let stdout = io::stdout();
            LineSink::new(stdout.lock()).insert_phrases(phrases)?
        }
    };
    info!("Inserted {} phrases", inserted);
    Ok(())
}
