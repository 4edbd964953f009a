use prep_algo::QuestionFormat;

use crate::db::operations::{count_questions, insert_question, QuestionRecord};
use crate::db::Database;
use crate::models::DiagnosticQuestion;

struct SeedQuestion {
    subject: &'static str,
    format: QuestionFormat,
    prompt: &'static str,
    options: &'static [&'static str],
    correct: usize,
    media: Option<&'static str>,
}

const DEFAULT_BATTERY: &[SeedQuestion] = &[
    SeedQuestion {
        subject: "math",
        format: QuestionFormat::Text,
        prompt: "If 3x + 5 = 20, what is the value of x?",
        options: &["3", "5", "15", "25"],
        correct: 1,
        media: None,
    },
    SeedQuestion {
        subject: "math",
        format: QuestionFormat::Diagram,
        prompt: "The graph shows a line through (0, 2) and (4, 10). What is its slope?",
        options: &["1", "2", "4", "8"],
        correct: 1,
        media: Some("diagrams/math-slope.svg"),
    },
    SeedQuestion {
        subject: "math",
        format: QuestionFormat::Audio,
        prompt: "Listen to the word problem. How many tickets were sold in total?",
        options: &["120", "135", "150", "165"],
        correct: 2,
        media: Some("audio/math-tickets.mp3"),
    },
    SeedQuestion {
        subject: "reading",
        format: QuestionFormat::Text,
        prompt: "In the passage, the word \"candid\" most nearly means:",
        options: &["frank", "hidden", "cheerful", "rehearsed"],
        correct: 0,
        media: None,
    },
    SeedQuestion {
        subject: "reading",
        format: QuestionFormat::Diagram,
        prompt: "According to the timeline, which event happened first?",
        options: &["The treaty", "The election", "The census", "The flood"],
        correct: 3,
        media: Some("diagrams/reading-timeline.svg"),
    },
    SeedQuestion {
        subject: "reading",
        format: QuestionFormat::Audio,
        prompt: "Listen to the excerpt. What is the narrator's main concern?",
        options: &["Money", "Family", "Health", "Travel"],
        correct: 1,
        media: Some("audio/reading-excerpt.mp3"),
    },
    SeedQuestion {
        subject: "writing",
        format: QuestionFormat::Text,
        prompt: "Which choice best combines the two sentences?",
        options: &[
            "The museum opened, it was crowded.",
            "The museum opened and, it was crowded.",
            "When the museum opened, it was crowded.",
            "The museum opened; and it was crowded.",
        ],
        correct: 2,
        media: None,
    },
    SeedQuestion {
        subject: "writing",
        format: QuestionFormat::Diagram,
        prompt: "Based on the outline, where should the new paragraph be placed?",
        options: &["Before 1", "After 1", "After 2", "After 3"],
        correct: 2,
        media: Some("diagrams/writing-outline.svg"),
    },
    SeedQuestion {
        subject: "writing",
        format: QuestionFormat::Audio,
        prompt: "Listen to the sentence. Which word is used incorrectly?",
        options: &["their", "quickly", "affect", "although"],
        correct: 2,
        media: Some("audio/writing-usage.mp3"),
    },
    SeedQuestion {
        subject: "science",
        format: QuestionFormat::Text,
        prompt: "Which variable was held constant in the experiment described?",
        options: &["Temperature", "Light", "Water volume", "Soil type"],
        correct: 3,
        media: None,
    },
    SeedQuestion {
        subject: "science",
        format: QuestionFormat::Diagram,
        prompt: "The chart shows reaction rate versus temperature. At what temperature is the rate highest?",
        options: &["20 C", "35 C", "50 C", "65 C"],
        correct: 1,
        media: Some("diagrams/science-rate.svg"),
    },
    SeedQuestion {
        subject: "science",
        format: QuestionFormat::Audio,
        prompt: "Listen to the two hypotheses. Which data would support the second?",
        options: &["Higher yield", "Lower yield", "No change", "Faster growth"],
        correct: 0,
        media: Some("audio/science-hypotheses.mp3"),
    },
];

/// Insert the default battery into `question_set` when it holds no questions.
/// Returns how many questions were inserted.
pub async fn seed_diagnostic_questions(db: &Database, question_set: &str) -> Result<usize, sqlx::Error> {
    if count_questions(db, question_set).await? > 0 {
        tracing::debug!(question_set, "diagnostic questions already present");
        return Ok(0);
    }

    let mut inserted = 0usize;
    for (index, seed) in DEFAULT_BATTERY.iter().enumerate() {
        let position = index as i64 + 1;
        let record = QuestionRecord {
            question: DiagnosticQuestion {
                id: format!("{question_set}-{position:03}"),
                text: seed.prompt.to_string(),
                options: seed.options.iter().map(|o| o.to_string()).collect(),
                subject: seed.subject.to_string(),
                format: seed.format,
                media_ref: seed.media.map(str::to_string),
            },
            question_set: question_set.to_string(),
            position,
            correct_option: seed.correct,
        };
        if insert_question(db, &record).await? {
            inserted += 1;
        }
    }

    tracing::info!(question_set, inserted, "seeded diagnostic questions");
    Ok(inserted)
}

/// Answer key of the default battery, in position order. Test helper.
pub fn default_answer_key() -> Vec<usize> {
    DEFAULT_BATTERY.iter().map(|q| q.correct).collect()
}
