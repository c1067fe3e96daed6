//! Score bigrams by pointwise mutual information
//!
//! For a context token `y` followed by `x`:
//!
//! ```text
//! pmi = ln( P(x|y) / P(x) )
//! P(x|y) = count(y x) / sum over x' of count(y x')
//! P(x)   = count(x) / total unigrams
//! ```
//!
//! The statistic is a natural log ratio of probabilities with no smoothing, so a threshold of 0
//! means "more likely than chance" and ln(2) means "twice as likely". Calibrate it on real data.
use lossy::BigramTable;
use unigram::UnigramCounter;
use errors::*;

/// A scored bigram
#[derive(Debug, Clone, PartialEq)]
pub struct PhraseCandidate {
    pub context: String,
    pub target: String,
    pub pmi: f64,
    pub accepted: bool,
}

impl PhraseCandidate {
    /// "context target"
    pub fn phrase(&self) -> String {
        format!("{} {}", self.context, self.target)
    }
}

/// `ln(P(x|y) / P(x))` from raw counts
pub fn pmi(count_x_given_y: u64, count_all_given_y: u64, count_x: u64, total: u64) -> f64 {
    let p_x_given_y = count_x_given_y as f64 / count_all_given_y as f64;
    let p_x = count_x as f64 / total as f64;
    (p_x_given_y / p_x).ln()
}

/// Scores every pair left in a finished bigram table. Never modifies either table.
pub struct PmiScorer<'a> {
    unigrams: &'a UnigramCounter,
    bigrams: &'a BigramTable,
    threshold: f64,
}

impl<'a> PmiScorer<'a> {
    pub fn new(unigrams: &'a UnigramCounter, bigrams: &'a BigramTable, threshold: f64) -> Self {
        PmiScorer { unigrams: unigrams, bigrams: bigrams, threshold: threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Every candidate with its score, in no particular order
    ///
    /// A target token the unigram counter never saw means the counters were fed different
    /// streams, which is reported rather than scored.
    pub fn candidates(&self) -> Result<Vec<PhraseCandidate>> {
        let total = self.unigrams.total();
        let mut scored = Vec::with_capacity(self.bigrams.len());
        for (context, children) in self.bigrams.contexts() {
            let count_all_given_y: u64 = children.values().sum();
            for (target, &count_x_given_y) in children {
                let count_x = self.unigrams.count(target);
                if count_x == 0 {
                    return Err(Error::MissingUnigram(target.clone()));
                }
                let score = pmi(count_x_given_y, count_all_given_y, count_x, total);
                scored.push(PhraseCandidate {
                    context: context.to_owned(),
                    target: target.clone(),
                    pmi: score,
                    accepted: score >= self.threshold,
                });
            }
        }
        Ok(scored)
    }

    /// Just the accepted phrases
    pub fn phrases(&self) -> Result<Vec<String>> {
        Ok(self.candidates()?
            .into_iter()
            .filter(|candidate| candidate.accepted)
            .map(|candidate| candidate.phrase())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use lossy::LossyBigramCounter;
    use tokens::StopwordSet;

    /// x:10, y:5 and the only bigram is "y x", seen 5 times
    fn tables() -> (UnigramCounter, BigramTable) {
        let mut unigrams = UnigramCounter::new();
        for _ in 0..10 { unigrams.observe("x"); }
        for _ in 0..5 { unigrams.observe("y"); }
        let mut bigrams = LossyBigramCounter::new(0.01, Arc::new(StopwordSet::empty())).unwrap();
        for _ in 0..5 { bigrams.observe("y", "x"); }
        (unigrams, bigrams.into_table())
    }

    #[test]
    fn scores_against_chance() {
        let (unigrams, bigrams) = tables();
        let candidates = PmiScorer::new(&unigrams, &bigrams, 0.4).candidates().unwrap();
        assert_eq!(candidates.len(), 1);
        assert!((candidates[0].pmi - 1.5f64.ln()).abs() < 1e-12);
        assert!((candidates[0].pmi - 0.405).abs() < 1e-3);
    }

    #[test]
    fn threshold_decides_acceptance() {
        let (unigrams, bigrams) = tables();
        assert_eq!(PmiScorer::new(&unigrams, &bigrams, 0.4).phrases().unwrap(), vec!["y x"]);
        assert!(PmiScorer::new(&unigrams, &bigrams, 0.5).phrases().unwrap().is_empty());
    }

    #[test]
    fn scoring_is_repeatable() {
        let mut unigrams = UnigramCounter::new();
        let mut bigrams = LossyBigramCounter::new(0.001, Arc::new(StopwordSet::empty())).unwrap();
        let tokens = "a b a c a b d b a b".split(' ').collect::<Vec<_>>();
        for t in &tokens { unigrams.observe(t); }
        for pair in tokens.windows(2) { bigrams.observe(pair[0], pair[1]); }
        let table = bigrams.into_table();
        let scorer = PmiScorer::new(&unigrams, &table, 0.2);
        let sorted = |mut c: Vec<PhraseCandidate>| {
            c.sort_by(|l, r| l.phrase().cmp(&r.phrase()));
            c
        };
        let first = sorted(scorer.candidates().unwrap());
        let second = sorted(scorer.candidates().unwrap());
        assert_eq!(first, second);
        assert_eq!(first.len(), table.len());
    }

    #[test]
    fn conditional_probability_sums_over_the_context() {
        // "y" is followed by x twice and by z twice, so P(x|y) = 0.5
        let score = pmi(2, 4, 1, 8);
        assert!((score - 4f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn unknown_target_is_an_error() {
        let unigrams = UnigramCounter::new();
        let mut bigrams = LossyBigramCounter::new(0.01, Arc::new(StopwordSet::empty())).unwrap();
        bigrams.observe("y", "x");
        let table = bigrams.into_table();
        match PmiScorer::new(&unigrams, &table, 0.0).candidates() {
            Err(Error::MissingUnigram(ref token)) => assert_eq!(token, "x"),
            other => panic!("expected a missing unigram, got {:?}", other),
        }
    }
}
