//! Per-subject correctness breakdown.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectScore {
    pub subject: String,
    pub correct: u32,
    pub total: u32,
    pub accuracy: f64,
}

/// Group graded answers by subject; result is sorted by subject name.
pub fn subject_breakdown<I, S>(graded: I) -> Vec<SubjectScore>
where
    I: IntoIterator<Item = (S, bool)>,
    S: AsRef<str>,
{
    let mut counts: BTreeMap<String, (u32, u32)> = BTreeMap::new();
    for (subject, is_correct) in graded {
        let entry = counts.entry(subject.as_ref().to_string()).or_default();
        entry.1 += 1;
        if is_correct {
            entry.0 += 1;
        }
    }

    counts
        .into_iter()
        .map(|(subject, (correct, total))| SubjectScore {
            subject,
            correct,
            total,
            accuracy: if total > 0 {
                round2(correct as f64 / total as f64 * 100.0)
            } else {
                0.0
            },
        })
        .collect()
}

/// Weakest subjects first: lower accuracy, then more evidence, then name.
pub fn rank_by_weakness(scores: &[SubjectScore]) -> Vec<SubjectScore> {
    let mut ranked = scores.to_vec();
    ranked.sort_by(|a, b| {
        let lhs = a.correct as u64 * b.total as u64;
        let rhs = b.correct as u64 * a.total as u64;
        lhs.cmp(&rhs)
            .then_with(|| b.total.cmp(&a.total))
            .then_with(|| a.subject.cmp(&b.subject))
    });
    ranked
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl SubjectScore {
    pub fn is_weak(&self, threshold_percent: f64) -> bool {
        self.accuracy.partial_cmp(&threshold_percent) == Some(Ordering::Less)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakdown_groups_and_sorts() {
        let graded = vec![
            ("math", true),
            ("reading", false),
            ("math", false),
            ("math", true),
        ];
        let breakdown = subject_breakdown(graded);
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].subject, "math");
        assert_eq!(breakdown[0].correct, 2);
        assert_eq!(breakdown[0].total, 3);
        assert_eq!(breakdown[0].accuracy, 66.67);
        assert_eq!(breakdown[1].subject, "reading");
        assert_eq!(breakdown[1].accuracy, 0.0);
    }

    #[test]
    fn test_breakdown_empty() {
        let breakdown = subject_breakdown(Vec::<(&str, bool)>::new());
        assert!(breakdown.is_empty());
    }

    #[test]
    fn test_rank_by_weakness() {
        let scores = subject_breakdown(vec![
            ("science", true),
            ("science", false),
            ("math", false),
            ("writing", false),
            ("writing", false),
            ("reading", true),
        ]);
        let ranked: Vec<String> = rank_by_weakness(&scores)
            .into_iter()
            .map(|s| s.subject)
            .collect();
        assert_eq!(ranked, vec!["writing", "math", "science", "reading"]);
    }

    #[test]
    fn test_is_weak() {
        let score = SubjectScore {
            subject: "math".into(),
            correct: 1,
            total: 4,
            accuracy: 25.0,
        };
        assert!(score.is_weak(50.0));
        assert!(!score.is_weak(25.0));
    }
}
