//! Per-format answer tally.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ClassifierError;
use crate::types::QuestionFormat;

/// Correct / total counts for one format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatScore {
    pub correct: u32,
    pub total: u32,
}

impl FormatScore {
    /// `correct / total × 100`, or `None` when nothing was answered.
    pub fn accuracy_percent(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        Some(self.correct as f64 / self.total as f64 * 100.0)
    }

    /// Exact accuracy comparison via cross-multiplication.
    ///
    /// Both scores must have `total > 0`.
    pub fn cmp_accuracy(&self, other: &FormatScore) -> Ordering {
        let lhs = self.correct as u64 * other.total as u64;
        let rhs = other.correct as u64 * self.total as u64;
        lhs.cmp(&rhs)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct TallyEntry {
    score: FormatScore,
    capacity: u32,
}

/// Mapping from format to counts, seeded from the question set.
///
/// Every format present in the question set starts at zero, so formats that
/// were never answered still have an entry (with an undefined accuracy that
/// is skipped during selection).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatScoreTally {
    entries: BTreeMap<QuestionFormat, TallyEntry>,
}

impl FormatScoreTally {
    /// Seed the tally from the formats of every diagnostic question.
    ///
    /// The number of questions per format becomes that format's capacity.
    pub fn for_questions<I>(question_formats: I) -> Self
    where
        I: IntoIterator<Item = QuestionFormat>,
    {
        let mut entries: BTreeMap<QuestionFormat, TallyEntry> = BTreeMap::new();
        for format in question_formats {
            entries.entry(format).or_default().capacity += 1;
        }
        Self { entries }
    }

    pub fn record(&mut self, format: QuestionFormat, is_correct: bool) -> Result<(), ClassifierError> {
        let entry = self
            .entries
            .get_mut(&format)
            .ok_or(ClassifierError::UnknownFormat(format))?;

        if entry.score.total >= entry.capacity {
            return Err(ClassifierError::TallyOverflow {
                format,
                capacity: entry.capacity,
            });
        }

        entry.score.total += 1;
        if is_correct {
            entry.score.correct += 1;
        }
        Ok(())
    }

    pub fn score(&self, format: QuestionFormat) -> Option<FormatScore> {
        self.entries.get(&format).map(|e| e.score)
    }

    pub fn capacity(&self, format: QuestionFormat) -> u32 {
        self.entries.get(&format).map(|e| e.capacity).unwrap_or(0)
    }

    pub fn formats(&self) -> impl Iterator<Item = QuestionFormat> + '_ {
        self.entries.keys().copied()
    }

    /// Formats with at least one answer, in format order.
    pub fn scored(&self) -> impl Iterator<Item = (QuestionFormat, FormatScore)> + '_ {
        self.entries
            .iter()
            .filter(|(_, e)| e.score.total > 0)
            .map(|(f, e)| (*f, e.score))
    }

    pub fn total_answers(&self) -> u32 {
        self.entries.values().map(|e| e.score.total).sum()
    }

    /// Best-performing format under the tie-break rules.
    ///
    /// Order: strictly higher accuracy, then larger total, then
    /// [`crate::FORMAT_PRIORITY`]. `None` when no format has been answered.
    pub fn best_format(&self) -> Option<QuestionFormat> {
        self.scored()
            .max_by(|(fa, a), (fb, b)| {
                a.cmp_accuracy(b)
                    .then_with(|| a.total.cmp(&b.total))
                    .then_with(|| fb.priority_rank().cmp(&fa.priority_rank()))
            })
            .map(|(format, _)| format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use QuestionFormat::*;

    fn seeded(diagram: usize, audio: usize, text: usize) -> FormatScoreTally {
        let formats = std::iter::repeat(Diagram)
            .take(diagram)
            .chain(std::iter::repeat(Audio).take(audio))
            .chain(std::iter::repeat(Text).take(text));
        FormatScoreTally::for_questions(formats)
    }

    #[test]
    fn test_seeds_zero_counts_for_every_format() {
        let tally = seeded(2, 1, 0);
        assert_eq!(tally.score(Diagram), Some(FormatScore::default()));
        assert_eq!(tally.score(Audio), Some(FormatScore::default()));
        assert_eq!(tally.score(Text), None);
        assert_eq!(tally.capacity(Diagram), 2);
        assert_eq!(tally.total_answers(), 0);
    }

    #[test]
    fn test_record_counts() {
        let mut tally = seeded(3, 0, 0);
        tally.record(Diagram, true).unwrap();
        tally.record(Diagram, false).unwrap();
        let score = tally.score(Diagram).unwrap();
        assert_eq!(score, FormatScore { correct: 1, total: 2 });
        assert_eq!(score.accuracy_percent(), Some(50.0));
    }

    #[test]
    fn test_record_unknown_format_rejected() {
        let mut tally = seeded(1, 0, 0);
        assert_eq!(
            tally.record(Audio, true),
            Err(ClassifierError::UnknownFormat(Audio))
        );
    }

    #[test]
    fn test_total_never_exceeds_question_count() {
        let mut tally = seeded(0, 1, 0);
        tally.record(Audio, true).unwrap();
        assert_eq!(
            tally.record(Audio, true),
            Err(ClassifierError::TallyOverflow {
                format: Audio,
                capacity: 1
            })
        );
        assert_eq!(tally.score(Audio).unwrap().total, 1);
    }

    #[test]
    fn test_unanswered_format_has_no_accuracy() {
        assert_eq!(FormatScore::default().accuracy_percent(), None);
    }

    #[test]
    fn test_best_format_skips_unanswered() {
        let mut tally = seeded(1, 1, 0);
        tally.record(Audio, false).unwrap();
        assert_eq!(tally.best_format(), Some(Audio));
    }

    #[test]
    fn test_best_format_exact_tie_uses_evidence() {
        // 2/3 vs 4/6 compare equal exactly; floating point would not guarantee it.
        let mut tally = seeded(3, 6, 0);
        for correct in [true, true, false] {
            tally.record(Diagram, correct).unwrap();
        }
        for correct in [true, true, true, true, false, false] {
            tally.record(Audio, correct).unwrap();
        }
        assert_eq!(tally.best_format(), Some(Audio));
    }

    #[test]
    fn test_best_format_none_when_empty() {
        assert_eq!(seeded(2, 2, 2).best_format(), None);
    }
}
