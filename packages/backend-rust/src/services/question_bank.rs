use thiserror::Error;

use crate::db::operations::{self, QuestionRecord};
use crate::db::Database;
use crate::models::DiagnosticSessionView;
use crate::services::ServiceError;

const MIN_OPTIONS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestionBankError {
    #[error("question set {0} is empty")]
    Empty(String),
    #[error("question {id} is malformed: {reason}")]
    Malformed { id: String, reason: String },
}

/// Structural checks a question must pass before it is served.
pub fn validate_question(record: &QuestionRecord) -> Result<(), QuestionBankError> {
    let malformed = |reason: &str| QuestionBankError::Malformed {
        id: record.question.id.clone(),
        reason: reason.to_string(),
    };

    if record.question.text.trim().is_empty() {
        return Err(malformed("empty prompt"));
    }
    if record.question.options.len() < MIN_OPTIONS {
        return Err(malformed("fewer than two options"));
    }
    if record.correct_option >= record.question.options.len() {
        return Err(malformed("answer key out of range"));
    }
    if record.question.subject.trim().is_empty() {
        return Err(malformed("missing subject"));
    }
    Ok(())
}

/// Load and validate a whole question set. One bad question blocks the set.
pub async fn load_question_set(
    db: &Database,
    question_set: &str,
) -> Result<Vec<QuestionRecord>, ServiceError> {
    let records = match operations::list_questions(db, question_set).await {
        Ok(records) => records,
        // an unreadable row (unknown format, bad options JSON) is a malformed set
        Err(sqlx::Error::ColumnDecode { index, source }) => {
            return Err(QuestionBankError::Malformed {
                id: format!("column {index}"),
                reason: source.to_string(),
            }
            .into())
        }
        Err(err) => return Err(err.into()),
    };

    if records.is_empty() {
        return Err(QuestionBankError::Empty(question_set.to_string()).into());
    }
    for record in &records {
        validate_question(record)?;
    }
    Ok(records)
}

pub async fn start_session(
    db: &Database,
    user_id: &str,
    question_set: &str,
) -> Result<DiagnosticSessionView, ServiceError> {
    let records = load_question_set(db, question_set).await?;
    let session = operations::insert_session(db, user_id, question_set).await?;

    tracing::info!(
        user_id,
        session_id = %session.id,
        question_set,
        questions = records.len(),
        "diagnostic session started"
    );

    Ok(DiagnosticSessionView {
        session_id: session.id,
        question_set: session.question_set,
        questions: records.into_iter().map(|r| r.question).collect(),
    })
}

pub async fn get_session_view(
    db: &Database,
    user_id: &str,
    session_id: &str,
) -> Result<DiagnosticSessionView, ServiceError> {
    let session = operations::get_session(db, session_id)
        .await?
        .filter(|s| s.user_id == user_id)
        .ok_or_else(|| ServiceError::NotFound("diagnostic session not found".to_string()))?;

    let records = load_question_set(db, &session.question_set).await?;
    Ok(DiagnosticSessionView {
        session_id: session.id,
        question_set: session.question_set,
        questions: records.into_iter().map(|r| r.question).collect(),
    })
}
