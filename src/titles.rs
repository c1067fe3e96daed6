//! Page titles as phrases
//!
//! Title dumps have one underscore-separated title per line, after a header line naming the
//! table. Most titles are fine phrases already; the rest are qualifiers, lists, single letters
//! or plain numbers, and are dropped.
use std::io::BufRead;
use regex::Regex;
use errors::*;

/// Decides which titles are phrases, and cleans them up
pub struct TitleFilter {
    qualified: Regex,
    single_letter: Regex,
    symbols_only: Regex,
}

impl TitleFilter {
    pub fn new() -> Result<Self> {
        Ok(TitleFilter {
            // Foo_(band)
            qualified: Regex::new(r"_\(.*\)$")?,
            single_letter: Regex::new(r"^[a-z]$")?,
            // Digits and ASCII punctuation, nothing else
            symbols_only: Regex::new(r"^[0-9!-/:-@\[-`{-~]*$")?,
        })
    }

    /// Whether a lowercased title should become a phrase
    pub fn keep(&self, title: &str) -> bool {
        !(self.qualified.is_match(title)
            || self.single_letter.is_match(title)
            || self.symbols_only.is_match(title)
            || title.contains("(disambiguation)")
            || title.starts_with("lists_of"))
    }

    /// Lowercase, filter and sanitize one title
    pub fn normalize(&self, raw: &str) -> Option<String> {
        let title = raw.trim_end_matches('\r').to_lowercase();
        if self.keep(&title) {
            Some(sanitize(&title))
        } else {
            None
        }
    }

    /// Phrases from a whole dump, skipping its header line
    pub fn read_dump<'a, R: BufRead + 'a>(&'a self, reader: R)
        -> impl Iterator<Item=Result<String>> + 'a {
        reader.lines()
            .skip(1)
            .filter_map(move |line| match line {
                Err(err) => Some(Err(err.into())),
                Ok(line) => self.normalize(&line).map(Ok),
            })
    }
}

/// `_new_york_` becomes `new york`
pub fn sanitize(title: &str) -> String {
    title.trim_matches('_').replace('_', " ")
}
