//! Exact token frequencies
use farm::{FarmMap, new_farm};

/// Exact count of every token seen. Grows with the vocabulary, not the corpus.
#[derive(Debug, Clone, Default)]
pub struct UnigramCounter {
    counts: FarmMap<String, u64>,
    total: u64,
}

impl UnigramCounter {
    pub fn new() -> Self {
        UnigramCounter { counts: new_farm(), total: 0 }
    }

    /// Count one more occurrence of `token`
    pub fn observe(&mut self, token: &str) {
        // Avoid allocating for tokens we already know
        if let Some(count) = self.counts.get_mut(token) {
            *count += 1;
        } else {
            self.counts.insert(token.to_owned(), 1);
        }
        self.total += 1;
    }

    /// How many times `token` was observed (0 if never)
    pub fn count(&self, token: &str) -> u64 {
        self.counts.get(token).cloned().unwrap_or(0)
    }

    /// Sum of all counts
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct tokens
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Fold the counts of another counter into this one. Exact, so order is irrelevant.
    pub fn merge(&mut self, other: UnigramCounter) {
        for (token, count) in other.counts {
            *self.counts.entry(token).or_insert(0) += count;
        }
        self.total += other.total;
    }

    pub fn iter(&self) -> impl Iterator<Item=(&str, u64)> {
        self.counts.iter().map(|(token, &count)| (token.as_str(), count))
    }
}
