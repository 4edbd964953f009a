//! Property-based tests for the learning-style classifier
//!
//! Invariants:
//! - Any run with at least one answer yields a label from the fixed enumeration
//! - The winning format's accuracy is >= every other answered format
//! - Answer order never changes the result
//! - Runs without answers fail with InsufficientData

use proptest::prelude::*;

use prep_algo::{classify, ClassifierError, FormatOutcome, LearningStyle, QuestionFormat};

fn arb_format() -> impl Strategy<Value = QuestionFormat> {
    prop_oneof![
        Just(QuestionFormat::Text),
        Just(QuestionFormat::Diagram),
        Just(QuestionFormat::Audio),
    ]
}

/// A diagnostic run: the question formats plus one graded answer for a
/// prefix of those questions.
fn arb_run() -> impl Strategy<Value = (Vec<QuestionFormat>, Vec<FormatOutcome>)> {
    prop::collection::vec((arb_format(), any::<bool>()), 1..40).prop_flat_map(|graded| {
        let len = graded.len();
        (Just(graded), 1..=len).prop_map(|(graded, answered)| {
            let formats = graded.iter().map(|(f, _)| *f).collect();
            let outcomes = graded
                .iter()
                .take(answered)
                .map(|(f, c)| FormatOutcome::new(*f, *c))
                .collect();
            (formats, outcomes)
        })
    })
}

fn accuracy(outcomes: &[FormatOutcome], format: QuestionFormat) -> Option<f64> {
    let total = outcomes.iter().filter(|o| o.format == format).count();
    if total == 0 {
        return None;
    }
    let correct = outcomes
        .iter()
        .filter(|o| o.format == format && o.is_correct)
        .count();
    Some(correct as f64 / total as f64)
}

proptest! {
    #[test]
    fn label_is_from_enumeration_and_never_kinesthetic((formats, outcomes) in arb_run()) {
        let result = classify(formats, outcomes).unwrap();
        prop_assert!(LearningStyle::ALL.contains(&result.learning_style));
        prop_assert_ne!(result.learning_style, LearningStyle::Kinesthetic);
        prop_assert_eq!(result.learning_style, result.winning_format.learning_style());
    }

    #[test]
    fn winner_accuracy_dominates((formats, outcomes) in arb_run()) {
        let result = classify(formats, outcomes.clone()).unwrap();
        let best = accuracy(&outcomes, result.winning_format).unwrap();
        for format in QuestionFormat::ALL {
            if let Some(other) = accuracy(&outcomes, format) {
                prop_assert!(best + 1e-12 >= other);
            }
        }
    }

    #[test]
    fn order_independent((formats, outcomes) in arb_run(), seed in any::<u64>()) {
        let forward = classify(formats.clone(), outcomes.clone()).unwrap();

        let mut shuffled = outcomes.clone();
        // Deterministic rotation + reversal driven by the seed.
        if !shuffled.is_empty() {
            let k = (seed as usize) % shuffled.len();
            shuffled.rotate_left(k);
        }
        if seed % 2 == 0 {
            shuffled.reverse();
        }
        let mut shuffled_formats = formats.clone();
        shuffled_formats.reverse();

        let permuted = classify(shuffled_formats, shuffled).unwrap();
        prop_assert_eq!(forward.learning_style, permuted.learning_style);
        prop_assert_eq!(forward.winning_format, permuted.winning_format);
    }

    #[test]
    fn no_answers_is_insufficient(formats in prop::collection::vec(arb_format(), 0..20)) {
        let result = classify(formats, Vec::new());
        prop_assert_eq!(result, Err(ClassifierError::InsufficientData));
    }

    #[test]
    fn all_incorrect_is_deterministic((formats, outcomes) in arb_run()) {
        let wrong: Vec<FormatOutcome> = outcomes
            .iter()
            .map(|o| FormatOutcome::new(o.format, false))
            .collect();
        let first = classify(formats.clone(), wrong.clone()).unwrap();
        let second = classify(formats, wrong).unwrap();
        prop_assert_eq!(first.winning_format, second.winning_format);
    }
}

#[test]
fn all_incorrect_equal_counts_follow_priority_table() {
    let formats = vec![
        QuestionFormat::Text,
        QuestionFormat::Audio,
        QuestionFormat::Diagram,
        QuestionFormat::Text,
        QuestionFormat::Audio,
        QuestionFormat::Diagram,
    ];
    let outcomes: Vec<FormatOutcome> = formats
        .iter()
        .map(|f| FormatOutcome::new(*f, false))
        .collect();

    let all = classify(formats.clone(), outcomes.clone()).unwrap();
    assert_eq!(all.winning_format, QuestionFormat::Diagram);

    let without_diagram: Vec<FormatOutcome> = outcomes
        .into_iter()
        .filter(|o| o.format != QuestionFormat::Diagram)
        .collect();
    let rest = classify(formats, without_diagram).unwrap();
    assert_eq!(rest.winning_format, QuestionFormat::Audio);
    assert_eq!(rest.learning_style, LearningStyle::Auditory);
}
