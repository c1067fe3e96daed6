//! Wire documents through both counters and into the scorer
//!
//! Every document is tokenized once. Its tokens go to the unigram counter and its consecutive
//! pairs to the lossy bigram counter, both in corpus order. Pairs never span two documents.
//! Parallel ingestion gives each chunk of documents its own counters and merges them in order.
use std::fmt;
use std::sync::Arc;
use rayon;
use rayon::prelude::*;
use extracted::Document;
use lossy::{BigramTable, LossyBigramCounter};
use pmi::PmiScorer;
use tokens::{StopwordSet, Tokenizer};
use unigram::UnigramCounter;
use errors::*;

const PROGRESS_EVERY: u64 = 100_000;

/// Numeric knobs of a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    /// Lossy counting error bound, strictly between 0 and 1
    pub delta: f64,
    /// Minimum natural-log PMI for a phrase to be accepted
    pub pmi_threshold: f64,
}

impl Settings {
    pub fn new(delta: f64, pmi_threshold: f64) -> Result<Self> {
        if !(delta > 0.0 && delta < 1.0) {
            return Err(Error::InvalidDelta(delta));
        }
        Ok(Settings { delta: delta, pmi_threshold: pmi_threshold })
    }
}

/// Owns both counters for one pass over a corpus
#[derive(Debug, Clone)]
pub struct PhraseMiner {
    settings: Settings,
    unigrams: UnigramCounter,
    bigrams: LossyBigramCounter,
    documents: u64,
}

impl PhraseMiner {
    pub fn new(settings: Settings, stopwords: Arc<StopwordSet>) -> Result<Self> {
        Ok(PhraseMiner {
            settings: settings,
            unigrams: UnigramCounter::new(),
            bigrams: LossyBigramCounter::new(settings.delta, stopwords)?,
            documents: 0,
        })
    }

    /// Feed one document's tokens, in order
    pub fn observe_document<I, S>(&mut self, tokens: I)
        where I: IntoIterator<Item=S>, S: AsRef<str> {
        let mut previous: Option<S> = None;
        for token in tokens {
            self.unigrams.observe(token.as_ref());
            if let Some(ref prev) = previous {
                self.bigrams.observe(prev.as_ref(), token.as_ref());
            }
            previous = Some(token);
        }
        self.documents += 1;
        if self.documents % PROGRESS_EVERY == 0 {
            info!("Finished {} documents: {}", self.documents, self.summary());
        }
    }

    /// Tokenize and count every document, one after another
    pub fn ingest<D, T>(&mut self, documents: D, tokenizer: &T) -> Result<()>
        where D: IntoIterator<Item=Result<Document>>, T: Tokenizer {
        for doc in documents {
            let doc = doc?;
            self.observe_document(tokenizer.tokens(&doc.text));
        }
        Ok(())
    }

    /// Like `ingest`, but counting batches of documents on the rayon pool
    ///
    /// Each batch is split into one contiguous chunk per thread, and the chunks' counters are
    /// merged back in corpus order.
    pub fn ingest_parallel<D, T>(&mut self, documents: D, tokenizer: &T, batch_size: usize)
        -> Result<()>
        where D: IntoIterator<Item=Result<Document>>, T: Tokenizer + Sync {
        let threads = rayon::current_num_threads();
        let settings = self.settings;
        let stopwords = self.bigrams.stopwords().clone();
        let mut documents = documents.into_iter();
        loop {
            let batch = documents.by_ref()
                .take(::std::cmp::max(batch_size, 1))
                .collect::<Result<Vec<Document>>>()?;
            if batch.is_empty() {
                break;
            }
            let chunk_len = (batch.len() + threads - 1) / threads;
            let parts = batch.par_chunks(chunk_len)
                .map(|docs| -> Result<PhraseMiner> {
                    let mut part = PhraseMiner::new(settings, stopwords.clone())?;
                    for doc in docs {
                        part.observe_document(tokenizer.tokens(&doc.text));
                    }
                    Ok(part)
                })
                .collect::<Result<Vec<PhraseMiner>>>()?;
            self.absorb(parts)?;
            debug!("Merged a batch of {} documents: {}", batch.len(), self.summary());
        }
        Ok(())
    }

    /// Merge counters that ran side by side, in corpus order
    ///
    /// They were all alive next to this one, so their peaks count together.
    fn absorb(&mut self, parts: Vec<PhraseMiner>) -> Result<()> {
        let concurrent = self.bigrams.len()
            + parts.iter().map(|part| part.bigrams.peak_len()).sum::<usize>();
        for part in parts {
            self.merge(part)?;
        }
        self.bigrams.note_peak(concurrent);
        Ok(())
    }

    /// Combine with counters that saw a later part of the corpus
    pub fn merge(&mut self, other: PhraseMiner) -> Result<()> {
        self.bigrams.merge(other.bigrams)?;
        self.unigrams.merge(other.unigrams);
        self.documents += other.documents;
        Ok(())
    }

    pub fn unigrams(&self) -> &UnigramCounter {
        &self.unigrams
    }

    pub fn bigrams(&self) -> &LossyBigramCounter {
        &self.bigrams
    }

    pub fn summary(&self) -> Summary {
        Summary {
            documents: self.documents,
            tokens: self.unigrams.total(),
            vocabulary: self.unigrams.len(),
            pairs: self.bigrams.processed(),
            bigrams: self.bigrams.len(),
            peak_bigrams: self.bigrams.peak_len(),
        }
    }

    /// Stop counting. The tables are read-only from here on.
    pub fn finish(self) -> Mined {
        info!("Counting done: {}", self.summary());
        Mined {
            threshold: self.settings.pmi_threshold,
            unigrams: self.unigrams,
            bigrams: self.bigrams.into_table(),
        }
    }
}

/// Finished tables, ready to score
#[derive(Debug, Clone)]
pub struct Mined {
    pub unigrams: UnigramCounter,
    pub bigrams: BigramTable,
    pub threshold: f64,
}

impl Mined {
    pub fn scorer(&self) -> PmiScorer {
        PmiScorer::new(&self.unigrams, &self.bigrams, self.threshold)
    }

    /// Accepted phrases, ready for a sink
    pub fn phrases(&self) -> Result<Vec<(String,)>> {
        let phrases = self.scorer().phrases()?;
        info!("{} of {} bigrams reached a PMI of {}", phrases.len(), self.bigrams.len(), self.threshold);
        Ok(phrases.into_iter().map(|phrase| (phrase,)).collect())
    }
}

/// How much a run has seen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub documents: u64,
    pub tokens: u64,
    pub vocabulary: usize,
    pub pairs: u64,
    pub bigrams: usize,
    pub peak_bigrams: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} documents, {} tokens ({} distinct), {} pairs, {} bigrams kept (peak {})",
            self.documents, self.tokens, self.vocabulary, self.pairs, self.bigrams, self.peak_bigrams)
    }
}
