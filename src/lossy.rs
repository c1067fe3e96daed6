//! Lossy counting of bigrams
//!
//! Approximate frequencies of ordered token pairs, in memory bounded by the error bound rather
//! than the vocabulary. The stream is cut into buckets of `w = ceil(1/delta)` pairs, and at every
//! bucket boundary entries whose count can't have outpaced the buckets elapsed since they were
//! created are evicted. For every entry that survives, after `n` pairs:
//!
//! ```text
//! count <= true frequency <= count + delta * n
//! ```
//!
//! and every pair with a true frequency above `delta * n` is still present.
use std::sync::Arc;
use farm::{FarmMap, new_farm};
use tokens::StopwordSet;
use errors::*;

/// One counted pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BigramEntry {
    /// Occurrences since the entry was created
    pub count: u64,
    /// The bucket before the one active at creation, which bounds what was missed before then
    pub created_bucket: u64,
}

/// Approximate bigram frequencies over a token pair stream
#[derive(Debug, Clone)]
pub struct LossyBigramCounter {
    delta: f64,
    window: u64,
    processed: u64,
    current_bucket: u64,
    // context token -> following token -> entry
    entries: FarmMap<String, FarmMap<String, BigramEntry>>,
    live: usize,
    peak: usize,
    stopwords: Arc<StopwordSet>,
}

/// Bucket width for an error bound, `ceil(1/delta)`
///
/// Never narrower than `1/delta`, so the closed buckets never outrun `delta * n`.
pub fn window_width(delta: f64) -> u64 {
    (1.0 / delta).ceil() as u64
}

impl LossyBigramCounter {
    /// Create an empty counter. `delta` must lie strictly between 0 and 1.
    pub fn new(delta: f64, stopwords: Arc<StopwordSet>) -> Result<Self> {
        if !(delta > 0.0 && delta < 1.0) {
            return Err(Error::InvalidDelta(delta));
        }
        Ok(LossyBigramCounter {
            delta: delta,
            window: window_width(delta),
            processed: 0,
            current_bucket: 1,
            entries: new_farm(),
            live: 0,
            peak: 0,
            stopwords: stopwords,
        })
    }

    /// Count the pair `t1 t2`
    ///
    /// Pairs touching a stopword are never recorded but still advance the stream position, so the
    /// bound holds against the whole stream.
    pub fn observe(&mut self, t1: &str, t2: &str) {
        self.processed += 1;
        if !self.stopwords.contains(t1) && !self.stopwords.contains(t2) {
            self.record(t1, t2);
        }
        if self.processed % self.window == 0 {
            self.current_bucket += 1;
            self.weed_out();
        }
    }

    fn record(&mut self, t1: &str, t2: &str) {
        let created_bucket = self.current_bucket - 1;
        // Only allocate keys for new entries
        if let Some(children) = self.entries.get_mut(t1) {
            if let Some(entry) = children.get_mut(t2) {
                entry.count += 1;
                return;
            }
            children.insert(t2.to_owned(), BigramEntry { count: 1, created_bucket: created_bucket });
        } else {
            let mut children = new_farm();
            children.insert(t2.to_owned(), BigramEntry { count: 1, created_bucket: created_bucket });
            self.entries.insert(t1.to_owned(), children);
        }
        self.live += 1;
        if self.live > self.peak {
            self.peak = self.live;
        }
    }

    /// Evict everything that can't be frequent, judged against the buckets closed so far
    fn weed_out(&mut self) {
        let closed = self.closed_buckets();
        let before = self.live;
        let mut live = 0;
        self.entries.retain(|_, children| {
            children.retain(|_, entry| entry.count + entry.created_bucket > closed);
            live += children.len();
            !children.is_empty()
        });
        self.live = live;
        trace!("Closed bucket {} after {} pairs: kept {} of {} bigrams",
            closed, self.processed, live, before);
    }

    /// Buckets completely behind us
    pub fn closed_buckets(&self) -> u64 {
        self.current_bucket - 1
    }

    pub fn current_bucket(&self) -> u64 {
        self.current_bucket
    }

    pub fn window(&self) -> u64 {
        self.window
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Pairs seen, including the ones that were skipped for stopwords
    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// Pairs with a true frequency below this may have been dropped
    pub fn support_threshold(&self) -> f64 {
        self.delta * self.processed as f64
    }

    /// Live entries
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// The most live entries there have ever been at once
    pub fn peak_len(&self) -> usize {
        self.peak
    }

    /// Account for entries held elsewhere at the same time, like counters running in parallel
    pub fn note_peak(&mut self, entries: usize) {
        if entries > self.peak {
            self.peak = entries;
        }
    }

    pub fn stopwords(&self) -> &Arc<StopwordSet> {
        &self.stopwords
    }

    pub fn entry(&self, t1: &str, t2: &str) -> Option<BigramEntry> {
        self.entries.get(t1).and_then(|children| children.get(t2)).cloned()
    }

    /// Copy out the current approximate counts
    pub fn snapshot(&self) -> BigramTable {
        BigramTable {
            contexts: self.entries.iter()
                .map(|(t1, children)| {
                    let counts = children.iter()
                        .map(|(t2, entry)| (t2.clone(), entry.count))
                        .collect();
                    (t1.clone(), counts)
                })
                .collect()
        }
    }

    /// Like snapshot, but consuming the counter so nothing is copied
    pub fn into_table(self) -> BigramTable {
        BigramTable {
            contexts: self.entries.into_iter()
                .map(|(t1, children)| {
                    let counts = children.into_iter()
                        .map(|(t2, entry)| (t2, entry.count))
                        .collect();
                    (t1, counts)
                })
                .collect()
        }
    }

    /// Absorb a counter that saw a different part of the corpus
    ///
    /// Counts add up, and so do the creation deficits. An entry only one side has is charged the
    /// other side's closed buckets, which is the most that side could have dropped for it. The
    /// result has seen `n1 + n2` pairs and closes as many buckets as fit in that, so small
    /// pieces (each shorter than a bucket) still get weeded once they are combined.
    pub fn merge(&mut self, other: LossyBigramCounter) -> Result<()> {
        if self.window != other.window {
            return Err(Error::IncompatibleCounters(format!(
                "bucket widths differ ({} vs {})", self.window, other.window)));
        }
        if self.delta != other.delta {
            return Err(Error::IncompatibleCounters(format!(
                "error bounds differ ({} vs {})", self.delta, other.delta)));
        }
        if !Arc::ptr_eq(&self.stopwords, &other.stopwords) && self.stopwords != other.stopwords {
            return Err(Error::IncompatibleCounters("stopword sets differ".into()));
        }
        let mine = self.closed_buckets();
        let theirs = other.closed_buckets();

        for children in self.entries.values_mut() {
            for entry in children.values_mut() {
                entry.created_bucket += theirs;
            }
        }
        for (t1, their_children) in other.entries {
            let children = self.entries.entry(t1).or_insert_with(new_farm);
            for (t2, theirs_entry) in their_children {
                let mut added = false;
                {
                    let entry = children.entry(t2).or_insert_with(|| {
                        added = true;
                        BigramEntry { count: 0, created_bucket: mine }
                    });
                    if added {
                        entry.created_bucket += theirs_entry.created_bucket;
                    } else {
                        // Undo the charge for being absent on their side
                        entry.created_bucket = entry.created_bucket - theirs
                            + theirs_entry.created_bucket;
                    }
                    entry.count += theirs_entry.count;
                }
                if added {
                    self.live += 1;
                }
            }
        }
        self.peak = ::std::cmp::max(self.peak, ::std::cmp::max(self.live, other.peak));
        self.processed += other.processed;
        // Never less than mine + theirs, and never more than delta * n
        self.current_bucket = self.processed / self.window + 1;
        self.weed_out();
        Ok(())
    }
}

/// Finished bigram counts, grouped by context (first) token
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BigramTable {
    contexts: FarmMap<String, FarmMap<String, u64>>,
}

impl BigramTable {
    pub fn get(&self, t1: &str, t2: &str) -> Option<u64> {
        self.contexts.get(t1).and_then(|children| children.get(t2)).cloned()
    }

    /// Tokens counted after `t1`
    pub fn children(&self, t1: &str) -> Option<&FarmMap<String, u64>> {
        self.contexts.get(t1)
    }

    pub fn contexts(&self) -> impl Iterator<Item=(&str, &FarmMap<String, u64>)> {
        self.contexts.iter().map(|(t1, children)| (t1.as_str(), children))
    }

    /// Every (context, target, count)
    pub fn iter(&self) -> impl Iterator<Item=(&str, &str, u64)> {
        self.contexts.iter().flat_map(|(t1, children)| {
            children.iter().map(move |(t2, &count)| (t1.as_str(), t2.as_str(), count))
        })
    }

    pub fn len(&self) -> usize {
        self.contexts.values().map(|children| children.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use rand::{Rng, SeedableRng};
    use rand::rngs::StdRng;

    fn counter(delta: f64) -> LossyBigramCounter {
        LossyBigramCounter::new(delta, Arc::new(StopwordSet::empty())).unwrap()
    }

    /// Skewed pairs over a small vocabulary, so some are frequent and most are rare
    fn skewed_stream(seed: u64, len: usize, vocab: usize) -> Vec<(String, String)> {
        let mut rng = StdRng::seed_from_u64(seed);
        let pick = |rng: &mut StdRng| {
            // Squaring a uniform draw favours small ids
            let u: f64 = rng.gen();
            format!("w{}", (u * u * vocab as f64) as usize)
        };
        (0..len).map(|_| { let a = pick(&mut rng); let b = pick(&mut rng); (a, b) }).collect()
    }

    fn true_counts(stream: &[(String, String)]) -> HashMap<(String, String), u64> {
        let mut counts = HashMap::new();
        for pair in stream {
            *counts.entry(pair.clone()).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn rejects_delta_outside_unit_interval() {
        for &delta in &[0.0, 1.0, -0.1, 1.5, ::std::f64::NAN] {
            match LossyBigramCounter::new(delta, Arc::new(StopwordSet::empty())) {
                Err(Error::InvalidDelta(_)) => {}
                other => panic!("delta {} should be rejected, got {:?}", delta, other.map(|_| ())),
            }
        }
    }

    #[test]
    fn window_is_ceiling_of_inverse_delta() {
        assert_eq!(window_width(0.5), 2);
        assert_eq!(window_width(0.005), 200);
        assert_eq!(window_width(0.3), 4);
        assert_eq!(window_width(0.01), 100);
        // Just below 1/2 needs a third slot
        assert_eq!(window_width(0.4999999999), 3);
        assert_eq!(window_width(0.2499999999), 5);
    }

    #[test]
    fn delta_just_below_a_reciprocal_keeps_supported_pairs() {
        let mut bigrams = counter(0.4999999999);
        bigrams.observe("a", "b");
        bigrams.observe("c", "d");
        assert!(1.0 > bigrams.support_threshold());
        assert_eq!(bigrams.entry("a", "b").map(|e| e.count), Some(1));
    }

    #[test]
    fn error_is_bounded_with_stopwords_in_the_stream() {
        let stopwords: StopwordSet = vec!["the", "of"].into_iter().collect();
        let mut rng = StdRng::seed_from_u64(19);
        let stream: Vec<(String, String)> = skewed_stream(23, 30_000, 50)
            .into_iter()
            .map(|(a, b)| match rng.gen_range(0..6) {
                0 => ("the".to_owned(), b),
                1 => (a, "of".to_owned()),
                _ => (a, b),
            })
            .collect();
        let truth = true_counts(&stream);
        let mut bigrams = LossyBigramCounter::new(0.004, Arc::new(stopwords.clone())).unwrap();
        for &(ref a, ref b) in &stream {
            bigrams.observe(a, b);
        }
        assert_eq!(bigrams.processed(), stream.len() as u64);
        let table = bigrams.snapshot();
        let slack = bigrams.support_threshold();
        for (t1, t2, count) in table.iter() {
            assert!(!stopwords.contains(t1) && !stopwords.contains(t2));
            let actual = truth[&(t1.to_owned(), t2.to_owned())];
            assert!(count <= actual, "{} {} overcounted: {} > {}", t1, t2, count, actual);
            assert!(actual as f64 <= count as f64 + slack);
        }
        for (&(ref t1, ref t2), &actual) in &truth {
            if actual as f64 > slack && !stopwords.contains(t1) && !stopwords.contains(t2) {
                assert!(table.get(t1, t2).is_some(), "{} {} ({} times) went missing", t1, t2, actual);
            }
        }
    }

    #[test]
    fn small_stream_keeps_the_frequent_pair() {
        let mut bigrams = counter(0.5);
        for &(a, b) in &[("a", "b"), ("a", "b"), ("c", "d"), ("a", "b")] {
            bigrams.observe(a, b);
        }
        let table = bigrams.snapshot();
        let ab = table.get("a", "b").expect("(a, b) is above the support threshold");
        assert!(ab >= 2 && ab <= 3);
        match table.get("c", "d") {
            None => {}
            Some(cd) => assert!(cd <= 1),
        }
    }

    #[test]
    fn error_is_bounded() {
        let stream = skewed_stream(7, 20_000, 60);
        let truth = true_counts(&stream);
        let mut bigrams = counter(0.002);
        for &(ref a, ref b) in &stream {
            bigrams.observe(a, b);
        }
        let table = bigrams.snapshot();
        let slack = bigrams.support_threshold();
        for (t1, t2, count) in table.iter() {
            let actual = truth[&(t1.to_owned(), t2.to_owned())];
            assert!(count <= actual, "{} {} overcounted: {} > {}", t1, t2, count, actual);
            assert!(actual as f64 <= count as f64 + slack);
        }
        for (&(ref t1, ref t2), &actual) in &truth {
            if actual as f64 > slack {
                assert!(table.get(t1, t2).is_some(), "{} {} ({} times) went missing", t1, t2, actual);
            }
        }
    }

    #[test]
    fn memory_is_bounded_for_distinct_pairs() {
        // Every pair is new, so nothing should outlive its bucket
        let mut bigrams = counter(0.01);
        for i in 0..50_000 {
            bigrams.observe(&format!("x{}", i), &format!("y{}", i));
        }
        assert!(bigrams.peak_len() as u64 <= bigrams.window());
        assert_eq!(bigrams.len(), 0);
    }

    #[test]
    fn memory_is_bounded_for_skewed_pairs() {
        let stream = skewed_stream(11, 50_000, 400);
        let mut bigrams = counter(0.01);
        for &(ref a, ref b) in &stream {
            bigrams.observe(a, b);
        }
        let buckets = bigrams.closed_buckets() as f64;
        let bound = bigrams.window() as f64 * (2.0 + buckets.ln());
        assert!((bigrams.peak_len() as f64) <= bound,
            "{} entries at peak, bound {}", bigrams.peak_len(), bound);
    }

    #[test]
    fn stopword_pairs_are_never_recorded() {
        let stopwords: StopwordSet = vec!["the"].into_iter().collect();
        let mut bigrams = LossyBigramCounter::new(0.1, Arc::new(stopwords)).unwrap();
        for _ in 0..1000 {
            bigrams.observe("the", "city");
            bigrams.observe("city", "the");
            bigrams.observe("new", "york");
        }
        assert_eq!(bigrams.entry("the", "city"), None);
        assert_eq!(bigrams.entry("city", "the"), None);
        assert!(bigrams.entry("new", "york").is_some());
        assert_eq!(bigrams.processed(), 3000);
    }

    #[test]
    fn buckets_advance_once_per_window() {
        let mut bigrams = counter(0.25);
        let start = bigrams.current_bucket();
        for k in 1..6 {
            for _ in 0..bigrams.window() {
                bigrams.observe("a", "b");
            }
            assert_eq!(bigrams.current_bucket(), start + k);
        }
        // A partial window doesn't count
        bigrams.observe("a", "b");
        assert_eq!(bigrams.current_bucket(), start + 5);
    }

    #[test]
    fn new_entries_are_credited_from_the_previous_bucket() {
        let mut bigrams = counter(0.5);
        bigrams.observe("a", "b");
        assert_eq!(bigrams.entry("a", "b"), Some(BigramEntry { count: 1, created_bucket: 0 }));
        bigrams.observe("a", "b");
        bigrams.observe("c", "d");
        assert_eq!(bigrams.entry("c", "d"), Some(BigramEntry { count: 1, created_bucket: 1 }));
    }

    #[test]
    fn merged_counters_keep_the_bound() {
        let stream = skewed_stream(3, 30_000, 50);
        let truth = true_counts(&stream);
        let (left_half, right_half) = stream.split_at(13_001);
        let mut left = counter(0.005);
        let mut right = counter(0.005);
        for &(ref a, ref b) in left_half { left.observe(a, b); }
        for &(ref a, ref b) in right_half { right.observe(a, b); }
        left.merge(right).unwrap();
        assert_eq!(left.processed(), stream.len() as u64);

        let table = left.snapshot();
        let slack = left.support_threshold();
        for (t1, t2, count) in table.iter() {
            let actual = truth[&(t1.to_owned(), t2.to_owned())];
            assert!(count <= actual);
            assert!(actual as f64 <= count as f64 + slack);
        }
        for (&(ref t1, ref t2), &actual) in &truth {
            if actual as f64 > slack {
                assert!(table.get(t1, t2).is_some());
            }
        }
    }

    #[test]
    fn merging_short_pieces_still_weeds() {
        // Each piece is shorter than a bucket, so none of them weeds by itself
        let mut total = counter(0.1);
        for piece in 0..100 {
            let mut part = counter(0.1);
            for i in 0..5 {
                part.observe(&format!("p{}", piece), &format!("t{}", i));
            }
            assert_eq!(part.closed_buckets(), 0);
            total.merge(part).unwrap();
            assert!(total.len() as u64 <= total.window());
        }
        assert_eq!(total.processed(), 500);
        assert_eq!(total.closed_buckets(), 50);
    }

    #[test]
    fn merge_rejects_different_deltas_with_the_same_window() {
        let mut left = counter(0.26);
        let right = counter(0.3);
        assert_eq!(left.window(), right.window());
        match left.merge(right) {
            Err(Error::IncompatibleCounters(_)) => {}
            other => panic!("expected a merge failure, got {:?}", other),
        }
    }

    #[test]
    fn merge_keeps_the_larger_peak() {
        let mut left = counter(0.2);
        let mut right = counter(0.2);
        for i in 0..5 {
            right.observe(&format!("x{}", i), "y");
        }
        // Weeded at the boundary, but five were live at once
        assert_eq!(right.len(), 0);
        assert_eq!(right.peak_len(), 5);
        left.merge(right).unwrap();
        assert_eq!(left.peak_len(), 5);
        left.note_peak(3);
        assert_eq!(left.peak_len(), 5);
        left.note_peak(12);
        assert_eq!(left.peak_len(), 12);
    }

    #[test]
    fn merge_rejects_different_windows() {
        let mut left = counter(0.5);
        let right = counter(0.1);
        match left.merge(right) {
            Err(Error::IncompatibleCounters(_)) => {}
            other => panic!("expected a merge failure, got {:?}", other),
        }
    }

    #[test]
    fn table_groups_by_context() {
        let mut bigrams = counter(0.001);
        bigrams.observe("new", "york");
        bigrams.observe("new", "york");
        bigrams.observe("new", "jersey");
        bigrams.observe("old", "york");
        let table = bigrams.into_table();
        assert_eq!(table.len(), 3);
        let children = table.children("new").unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children["york"], 2);
        assert_eq!(table.get("old", "york"), Some(1));
    }
}
