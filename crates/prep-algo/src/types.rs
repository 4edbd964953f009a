//! Common Types and Constants
//!
//! Shared data structures used by the tally, classifier and subject modules.

use serde::{Deserialize, Serialize};

// ==================== Formats ====================

/// Presentation channel of a diagnostic question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionFormat {
    Text,
    Diagram,
    Audio,
}

/// Fixed tie-break order, highest priority first.
///
/// Consulted only when two formats have identical accuracy and identical
/// evidence (answer count).
pub const FORMAT_PRIORITY: [QuestionFormat; 3] = [
    QuestionFormat::Diagram,
    QuestionFormat::Audio,
    QuestionFormat::Text,
];

impl QuestionFormat {
    pub const ALL: [QuestionFormat; 3] = [Self::Text, Self::Diagram, Self::Audio];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Diagram => "diagram",
            Self::Audio => "audio",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "diagram" => Some(Self::Diagram),
            "audio" => Some(Self::Audio),
            _ => None,
        }
    }

    /// Position in [`FORMAT_PRIORITY`]; lower wins.
    pub fn priority_rank(&self) -> usize {
        FORMAT_PRIORITY
            .iter()
            .position(|f| f == self)
            .unwrap_or(FORMAT_PRIORITY.len())
    }

    /// `diagram → visual`, `audio → auditory`, `text → reading/writing`.
    pub fn learning_style(&self) -> LearningStyle {
        match self {
            Self::Diagram => LearningStyle::Visual,
            Self::Audio => LearningStyle::Auditory,
            Self::Text => LearningStyle::ReadingWriting,
        }
    }
}

impl std::fmt::Display for QuestionFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==================== Learning Style ====================

/// Coarse learning-style label.
///
/// `Kinesthetic` has no diagnostic format behind it; it is only reachable
/// through an explicit user choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LearningStyle {
    #[serde(rename = "visual")]
    Visual,
    #[serde(rename = "auditory")]
    Auditory,
    #[serde(rename = "kinesthetic")]
    Kinesthetic,
    #[serde(rename = "reading/writing", alias = "reading_writing")]
    ReadingWriting,
}

impl LearningStyle {
    pub const ALL: [LearningStyle; 4] = [
        Self::Visual,
        Self::Auditory,
        Self::Kinesthetic,
        Self::ReadingWriting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Visual => "visual",
            Self::Auditory => "auditory",
            Self::Kinesthetic => "kinesthetic",
            Self::ReadingWriting => "reading/writing",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "visual" => Some(Self::Visual),
            "auditory" => Some(Self::Auditory),
            "kinesthetic" => Some(Self::Kinesthetic),
            "reading/writing" | "reading_writing" | "reading" => Some(Self::ReadingWriting),
            _ => None,
        }
    }
}

impl std::fmt::Display for LearningStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==================== Outcomes ====================

/// One graded answer as seen by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatOutcome {
    pub format: QuestionFormat,
    pub is_correct: bool,
}

impl FormatOutcome {
    pub fn new(format: QuestionFormat, is_correct: bool) -> Self {
        Self { format, is_correct }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_round_trip_str() {
        for format in QuestionFormat::ALL {
            assert_eq!(QuestionFormat::parse(format.as_str()), Some(format));
        }
        assert_eq!(QuestionFormat::parse(" Diagram "), Some(QuestionFormat::Diagram));
        assert_eq!(QuestionFormat::parse("video"), None);
    }

    #[test]
    fn test_priority_table() {
        assert_eq!(QuestionFormat::Diagram.priority_rank(), 0);
        assert_eq!(QuestionFormat::Audio.priority_rank(), 1);
        assert_eq!(QuestionFormat::Text.priority_rank(), 2);
    }

    #[test]
    fn test_format_to_learning_style_table() {
        assert_eq!(QuestionFormat::Diagram.learning_style(), LearningStyle::Visual);
        assert_eq!(QuestionFormat::Audio.learning_style(), LearningStyle::Auditory);
        assert_eq!(QuestionFormat::Text.learning_style(), LearningStyle::ReadingWriting);
        assert!(QuestionFormat::ALL
            .iter()
            .all(|f| f.learning_style() != LearningStyle::Kinesthetic));
    }

    #[test]
    fn test_learning_style_serde_names() {
        let json = serde_json::to_string(&LearningStyle::ReadingWriting).unwrap();
        assert_eq!(json, "\"reading/writing\"");

        let alias: LearningStyle = serde_json::from_str("\"reading_writing\"").unwrap();
        assert_eq!(alias, LearningStyle::ReadingWriting);

        for style in LearningStyle::ALL {
            assert_eq!(LearningStyle::parse(style.as_str()), Some(style));
        }
    }

    #[test]
    fn test_outcome_serializes_camel_case() {
        let outcome = FormatOutcome::new(QuestionFormat::Audio, true);
        let value = serde_json::to_value(outcome).unwrap();
        assert_eq!(value["format"], "audio");
        assert_eq!(value["isCorrect"], true);
    }
}
