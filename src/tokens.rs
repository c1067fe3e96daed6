//! Tokens and stopwords
//!
//! Counting never tokenizes by itself. It consumes whatever sequence of lowercase tokens a
//! `Tokenizer` hands it, one document at a time, and checks pairs against a `StopwordSet`.
use std::io::BufRead;
use std::iter::FromIterator;
use unicode_segmentation::UnicodeSegmentation;
use farm::FarmSet;
use errors::*;

/// Punctuation that never makes a good phrase member. Each character is its own stopword.
pub const PUNCTUATION: &'static str = ",.()[]{}:;'\"+=_-^&*%$#@!~`|\\<>?/";

/// English function words
pub const ENGLISH: &'static [&'static str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't",
    "didn", "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven",
    "haven't", "isn", "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn",
    "needn't", "shan", "shan't", "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't",
    "won", "won't", "wouldn", "wouldn't",
];

/// Immutable set of tokens excluded from bigram counting
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StopwordSet {
    words: FarmSet<String>,
}

impl StopwordSet {
    /// No stopwords at all
    pub fn empty() -> Self {
        StopwordSet::default()
    }

    /// English function words and the punctuation characters
    pub fn english() -> Self {
        let mut set: StopwordSet = ENGLISH.iter().cloned().collect();
        set.words.extend(PUNCTUATION.chars().map(|c| c.to_string()));
        set
    }

    /// Add one (lowercased) stopword per non-empty line
    pub fn extend_from_reader<R: BufRead>(&mut self, reader: R) -> Result<()> {
        for line in reader.lines() {
            let line = line?;
            let word = line.trim();
            if !word.is_empty() {
                self.words.insert(word.to_lowercase());
            }
        }
        Ok(())
    }

    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for StopwordSet {
    fn from_iter<I: IntoIterator<Item=&'a str>>(iter: I) -> Self {
        StopwordSet { words: iter.into_iter().map(|w| w.to_lowercase()).collect() }
    }
}

/// Turns the raw text of one document into lowercase tokens
///
/// The result is consumed once, in order. Don't expect to be able to rewind it.
pub trait Tokenizer {
    fn tokens<'a>(&self, text: &'a str) -> Box<dyn Iterator<Item=String> + 'a>;
}

/// Split at unicode word boundaries, dropping whitespace
#[derive(Debug, Clone, Copy, Default)]
pub struct WordBoundaryTokenizer;

impl Tokenizer for WordBoundaryTokenizer {
    fn tokens<'a>(&self, text: &'a str) -> Box<dyn Iterator<Item=String> + 'a> {
        Box::new(text
            .split_word_bounds()
            .filter(|segment| !segment.trim().is_empty())
            .map(|segment| segment.to_lowercase()))
    }
}
