//! Stream documents out of extracted wiki dumps
//!
//! The extractor writes documents like this, many to a file:
//!
//! ```text
//! <doc id="12" url="https://en.wikipedia.org/wiki?curid=12" title="Anarchism">
//! Anarchism
//!
//! Anarchism is a political philosophy ...
//! </doc>
//! ```
//!
//! Only the body is kept (the title line the extractor repeats at the top of the body included).
//! Anything outside of a doc block is skipped.
use std::io::{self, BufRead};
use std::str::FromStr;
use nom::IResult;
use nom::bytes::complete::{tag, take_until, take_while1};
use nom::character::complete::{char, multispace0, multispace1};
use nom::multi::many0;
use nom::sequence::{delimited, preceded, separated_pair};
use errors::*;

/// One document's raw text, plus whatever the header said about it
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    pub id: Option<String>,
    pub title: Option<String>,
    pub text: String,
}

/// How documents are laid out on the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// `<doc ...>` blocks
    Extracted,
    /// One document per non-empty line
    Lines,
}

impl FromStr for InputFormat {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "extracted" => Ok(InputFormat::Extracted),
            "lines" => Ok(InputFormat::Lines),
            other => Err(Error::Other(format!(
                "Unknown input format {:?}, expected \"extracted\" or \"lines\"", other))),
        }
    }
}

fn attribute(input: &str) -> IResult<&str, (&str, &str)> {
    preceded(
        multispace1,
        separated_pair(
            take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '-'),
            char('='),
            delimited(char('"'), take_until("\""), char('"'))
        )
    )(input)
}

/// `<doc key="value" ...>`
fn doc_header(input: &str) -> IResult<&str, Vec<(&str, &str)>> {
    delimited(
        tag("<doc"),
        many0(attribute),
        preceded(multispace0, char('>'))
    )(input)
}

fn is_footer(line: &str) -> bool {
    line.trim() == "</doc>"
}

/// Iterate over the documents in a reader, one at a time
pub struct DocStream<R> {
    lines: io::Lines<R>,
    format: InputFormat,
}

impl<R: BufRead> DocStream<R> {
    pub fn new(reader: R, format: InputFormat) -> Self {
        DocStream { lines: reader.lines(), format: format }
    }

    fn next_line(&mut self) -> Option<Result<Document>> {
        loop {
            match self.lines.next()? {
                Err(err) => return Some(Err(err.into())),
                Ok(line) => {
                    if !line.trim().is_empty() {
                        return Some(Ok(Document { id: None, title: None, text: line }));
                    }
                }
            }
        }
    }

    fn next_block(&mut self) -> Option<Result<Document>> {
        // Find a header
        let mut doc = loop {
            let line = match self.lines.next()? {
                Err(err) => return Some(Err(err.into())),
                Ok(line) => line,
            };
            if let Ok((_, attrs)) = doc_header(line.trim_start()) {
                let mut doc = Document::default();
                for (key, value) in attrs {
                    match key {
                        "id" => doc.id = Some(value.to_owned()),
                        "title" => doc.title = Some(value.to_owned()),
                        _ => {}
                    }
                }
                break doc;
            } else if !line.trim().is_empty() {
                debug!("Skipping text outside of a document: {:?}",
                    line.chars().take(100).collect::<String>());
            }
        };
        // Everything until the footer is the body
        loop {
            match self.lines.next() {
                None => {
                    warn!("Input ended inside document {:?}, keeping what was read", doc.title);
                    return Some(Ok(doc));
                }
                Some(Err(err)) => return Some(Err(err.into())),
                Some(Ok(line)) => {
                    if is_footer(&line) {
                        return Some(Ok(doc));
                    }
                    doc.text.push_str(&line);
                    doc.text.push('\n');
                }
            }
        }
    }
}

impl<R: BufRead> Iterator for DocStream<R> {
    type Item = Result<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.format {
            InputFormat::Extracted => self.next_block(),
            InputFormat::Lines => self.next_line(),
        }
    }
}
