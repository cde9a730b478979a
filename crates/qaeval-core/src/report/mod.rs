pub mod console;
pub mod jsonl;

use crate::judge::Judgment;
use crate::model::Verdict;
use serde::Serialize;

/// Verdict counts of one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VerdictTally {
    pub correct: usize,
    pub incorrect: usize,
    pub unparseable: usize,
}

impl VerdictTally {
    pub fn from_verdicts<I: IntoIterator<Item = Verdict>>(verdicts: I) -> Self {
        let mut tally = Self::default();
        for v in verdicts {
            tally.add(v);
        }
        tally
    }

    pub fn from_judgments(judgments: &[Judgment]) -> Self {
        Self::from_verdicts(judgments.iter().map(|j| j.verdict))
    }

    pub fn add(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Correct => self.correct += 1,
            Verdict::Incorrect => self.incorrect += 1,
            Verdict::Unparseable => self.unparseable += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.correct + self.incorrect + self.unparseable
    }

    pub fn parseable(&self) -> usize {
        self.correct + self.incorrect
    }

    /// Share of correct verdicts among parseable ones; unparseable verdicts
    /// are excluded, not counted as incorrect.
    pub fn accuracy(&self) -> Option<f64> {
        match self.parseable() {
            0 => None,
            n => Some(self.correct as f64 / n as f64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accuracy_excludes_unparseable() {
        let tally = VerdictTally::from_verdicts([
            Verdict::Correct,
            Verdict::Unparseable,
            Verdict::Incorrect,
            Verdict::Correct,
            Verdict::Unparseable,
        ]);
        assert_eq!(tally.total(), 5);
        assert_eq!(tally.parseable(), 3);
        assert!((tally.accuracy().unwrap() - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn all_unparseable_has_no_accuracy() {
        let tally = VerdictTally::from_verdicts([Verdict::Unparseable]);
        assert_eq!(tally.accuracy(), None);
        assert_eq!(VerdictTally::default().accuracy(), None);
    }
}
