pub mod diagnostic;
pub mod learning_profile;
pub mod question_bank;
pub mod scoring;
pub mod study_plan;

use thiserror::Error;

use crate::services::question_bank::QuestionBankError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("submission rejected: {0}")]
    Rejected(String),
    #[error("session already submitted with a different payload")]
    DuplicateSubmission,
    #[error("submission already in progress")]
    SubmissionInProgress,
    #[error("session is bound to a different graded answer set")]
    AnswersLocked,
    #[error("session already submitted")]
    SessionSubmitted,
    #[error(transparent)]
    QuestionSet(#[from] QuestionBankError),
    #[error(transparent)]
    Sql(#[from] sqlx::Error),
}
