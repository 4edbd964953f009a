//! # prep-algo - diagnostic scoring core
//!
//! Pure Rust scoring logic behind the diagnostic-to-study-plan pipeline:
//!
//! - **Format tally** - correct/total counts per question presentation format
//! - **Learning-style classifier** - best format by accuracy, mapped to a label
//! - **Subject breakdown** - per-subject correctness used to prioritise plans
//!
//! ## Tie-break policy
//!
//! When two formats have the same accuracy the one with more answers wins;
//! if both counts are equal as well, [`FORMAT_PRIORITY`]
//! (`diagram > audio > text`) decides.
//!
//! ## Usage
//!
//! ```rust
//! use prep_algo::{classify, FormatOutcome, LearningStyle, QuestionFormat};
//!
//! let questions = [QuestionFormat::Diagram, QuestionFormat::Text];
//! let answers = [
//!     FormatOutcome::new(QuestionFormat::Diagram, true),
//!     FormatOutcome::new(QuestionFormat::Text, false),
//! ];
//! let result = classify(questions, answers).unwrap();
//! assert_eq!(result.learning_style, LearningStyle::Visual);
//! ```

pub mod classifier;
pub mod error;
pub mod subjects;
pub mod tally;
pub mod types;

pub use classifier::{classify, classify_tally, tally_outcomes, Classification, FormatAccuracy};
pub use error::ClassifierError;
pub use subjects::{rank_by_weakness, subject_breakdown, SubjectScore};
pub use tally::{FormatScore, FormatScoreTally};
pub use types::*;
