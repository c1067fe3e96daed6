//! Where accepted phrases go
use std::io::Write;
use errors::*;

/// Anything that stores phrases and reports how many it took
pub trait PhraseSink {
    fn insert_phrases<I>(&mut self, phrases: I) -> Result<usize>
        where I: IntoIterator<Item=(String,)>;
}

/// One phrase per line
pub struct LineSink<W: Write> {
    writer: W,
}

impl<W: Write> LineSink<W> {
    pub fn new(writer: W) -> Self {
        LineSink { writer: writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> PhraseSink for LineSink<W> {
    fn insert_phrases<I>(&mut self, phrases: I) -> Result<usize>
        where I: IntoIterator<Item=(String,)> {
        let mut inserted = 0;
        for (phrase,) in phrases {
            writeln!(self.writer, "{}", phrase)?;
            inserted += 1;
        }
        self.writer.flush()?;
        Ok(inserted)
    }
}
