//! Format-accuracy learning-style classifier.
//!
//! Answers are bucketed by the presentation format of their question, the
//! per-format accuracy is computed, and the best-performing format is mapped
//! to a [`LearningStyle`]. The classifier never falls back to a default label:
//! without at least one scorable answer it returns
//! [`ClassifierError::InsufficientData`].

use serde::{Deserialize, Serialize};

use crate::error::ClassifierError;
use crate::tally::{FormatScore, FormatScoreTally};
use crate::types::{FormatOutcome, LearningStyle, QuestionFormat};

/// Accuracy summary for one format that took part in the diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatAccuracy {
    pub format: QuestionFormat,
    pub correct: u32,
    pub total: u32,
    /// `None` for formats present in the question set but never answered.
    pub accuracy: Option<f64>,
}

impl FormatAccuracy {
    fn from_score(format: QuestionFormat, score: FormatScore) -> Self {
        Self {
            format,
            correct: score.correct,
            total: score.total,
            accuracy: score.accuracy_percent(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub learning_style: LearningStyle,
    pub winning_format: QuestionFormat,
    pub scores: Vec<FormatAccuracy>,
}

impl Classification {
    pub fn accuracy_of(&self, format: QuestionFormat) -> Option<f64> {
        self.scores
            .iter()
            .find(|s| s.format == format)
            .and_then(|s| s.accuracy)
    }
}

/// Build the tally for `outcomes` against the formats of the question set.
pub fn tally_outcomes<Q, O>(question_formats: Q, outcomes: O) -> Result<FormatScoreTally, ClassifierError>
where
    Q: IntoIterator<Item = QuestionFormat>,
    O: IntoIterator<Item = FormatOutcome>,
{
    let mut tally = FormatScoreTally::for_questions(question_formats);
    for outcome in outcomes {
        tally.record(outcome.format, outcome.is_correct)?;
    }
    Ok(tally)
}

/// Select the winning format of an already built tally.
pub fn classify_tally(tally: &FormatScoreTally) -> Result<Classification, ClassifierError> {
    let winning_format = tally.best_format().ok_or(ClassifierError::InsufficientData)?;

    let scores = tally
        .formats()
        .filter_map(|format| {
            tally
                .score(format)
                .map(|score| FormatAccuracy::from_score(format, score))
        })
        .collect();

    Ok(Classification {
        learning_style: winning_format.learning_style(),
        winning_format,
        scores,
    })
}

/// Classify a diagnostic run.
///
/// `question_formats` lists the format of every question in the diagnostic
/// set (duplicates included); `outcomes` holds one graded answer per
/// answered question, in any order.
pub fn classify<Q, O>(question_formats: Q, outcomes: O) -> Result<Classification, ClassifierError>
where
    Q: IntoIterator<Item = QuestionFormat>,
    O: IntoIterator<Item = FormatOutcome>,
{
    let tally = tally_outcomes(question_formats, outcomes)?;
    classify_tally(&tally)
}
