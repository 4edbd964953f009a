use std::collections::{HashMap, HashSet};

use sha2::{Digest, Sha256};

use crate::db::operations::{self, QuestionRecord, SessionRecord, SessionStatus};
use crate::db::Database;
use crate::models::{Answer, GradeResult};
use crate::services::question_bank::load_question_set;
use crate::services::ServiceError;

/// Grade `answers` against the answer key of `questions`.
///
/// Every answer must reference a question of the set at most once, pick an
/// option that exists, and carry the format and subject of its question.
/// Results are returned in answer order.
pub fn grade_answers(
    questions: &[QuestionRecord],
    answers: &[Answer],
) -> Result<Vec<GradeResult>, ServiceError> {
    let by_id: HashMap<&str, &QuestionRecord> = questions
        .iter()
        .map(|q| (q.question.id.as_str(), q))
        .collect();
    let mut seen: HashSet<&str> = HashSet::with_capacity(answers.len());

    answers
        .iter()
        .map(|answer| {
            let record = by_id.get(answer.question_id.as_str()).ok_or_else(|| {
                ServiceError::Rejected(format!("unknown question {}", answer.question_id))
            })?;
            if !seen.insert(answer.question_id.as_str()) {
                return Err(ServiceError::Rejected(format!(
                    "duplicate answer for question {}",
                    answer.question_id
                )));
            }
            if answer.selected_option >= record.question.options.len() {
                return Err(ServiceError::Rejected(format!(
                    "option {} out of range for question {}",
                    answer.selected_option, answer.question_id
                )));
            }
            if answer.format != record.question.format || answer.subject != record.question.subject {
                return Err(ServiceError::Rejected(format!(
                    "format or subject does not match question {}",
                    answer.question_id
                )));
            }
            Ok(GradeResult {
                question_id: answer.question_id.clone(),
                is_correct: answer.selected_option == record.correct_option,
            })
        })
        .collect()
}

/// SHA-256 (hex) of an answer set, in answer order.
pub fn answers_hash(answers: &[Answer]) -> Result<String, ServiceError> {
    let bytes = serde_json::to_vec(answers)
        .map_err(|e| ServiceError::Validation(format!("unencodable answers: {e}")))?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

/// Bind a session to the answer set it is graded with.
///
/// A session is graded with exactly one complete answer set. Repeating that
/// set is allowed (client retries); any other set is `AnswersLocked`, and a
/// submitted session cannot be graded again.
pub(crate) async fn bind_answer_set(
    db: &Database,
    session: &SessionRecord,
    answers: &[Answer],
) -> Result<(), ServiceError> {
    let hash = answers_hash(answers)?;
    if operations::lock_graded_answers(db, &session.id, &hash).await? {
        return Ok(());
    }

    let current = operations::get_session(db, &session.id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("diagnostic session not found".to_string()))?;

    if current.status == SessionStatus::Submitted {
        return Err(ServiceError::SessionSubmitted);
    }
    match current.graded_answers_hash {
        Some(bound) if bound == hash => Ok(()),
        _ => {
            tracing::warn!(session_id = %session.id, "grading with a different answer set rejected");
            Err(ServiceError::AnswersLocked)
        }
    }
}

/// Require one answer per question of the set before grading.
pub(crate) fn ensure_complete(questions: &[QuestionRecord], answers: &[Answer]) -> Result<(), ServiceError> {
    if answers.len() != questions.len() {
        return Err(ServiceError::Rejected(format!(
            "expected {} answers, got {}",
            questions.len(),
            answers.len()
        )));
    }
    Ok(())
}

/// Grade a complete answer set for an open session the user owns.
pub async fn grade_session(
    db: &Database,
    user_id: &str,
    session_id: &str,
    answers: &[Answer],
) -> Result<Vec<GradeResult>, ServiceError> {
    let session = operations::get_session(db, session_id)
        .await?
        .filter(|s| s.user_id == user_id)
        .ok_or_else(|| ServiceError::NotFound("diagnostic session not found".to_string()))?;
    if session.status == SessionStatus::Submitted {
        return Err(ServiceError::SessionSubmitted);
    }

    let questions = load_question_set(db, &session.question_set).await?;
    ensure_complete(&questions, answers)?;
    let results = grade_answers(&questions, answers)?;
    bind_answer_set(db, &session, answers).await?;

    tracing::debug!(
        session_id,
        graded = results.len(),
        correct = results.iter().filter(|r| r.is_correct).count(),
        "answers graded"
    );
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DiagnosticQuestion;
    use crate::seed::{default_answer_key, seed_diagnostic_questions};
    use crate::services::question_bank::start_session;
    use prep_algo::QuestionFormat;

    fn questions() -> Vec<QuestionRecord> {
        [("q1", QuestionFormat::Diagram, 0usize), ("q2", QuestionFormat::Audio, 2)]
            .into_iter()
            .enumerate()
            .map(|(i, (id, format, key))| QuestionRecord {
                question: DiagnosticQuestion {
                    id: id.into(),
                    text: format!("prompt {id}"),
                    options: vec!["a".into(), "b".into(), "c".into()],
                    subject: "science".into(),
                    format,
                    media_ref: None,
                },
                question_set: "unit".into(),
                position: i as i64,
                correct_option: key,
            })
            .collect()
    }

    fn answer(id: &str, format: QuestionFormat, option: usize) -> Answer {
        Answer {
            question_id: id.into(),
            selected_option: option,
            format,
            subject: "science".into(),
        }
    }

    #[test]
    fn test_grades_against_key() {
        let results = grade_answers(
            &questions(),
            &[answer("q2", QuestionFormat::Audio, 1), answer("q1", QuestionFormat::Diagram, 0)],
        )
        .unwrap();
        assert_eq!(results[0], GradeResult { question_id: "q2".into(), is_correct: false });
        assert_eq!(results[1], GradeResult { question_id: "q1".into(), is_correct: true });
    }

    #[test]
    fn test_rejects_invalid_answers() {
        let qs = questions();
        let unknown = grade_answers(&qs, &[answer("q9", QuestionFormat::Text, 0)]);
        assert!(matches!(unknown, Err(ServiceError::Rejected(_))));

        let duplicate = grade_answers(
            &qs,
            &[answer("q1", QuestionFormat::Diagram, 0), answer("q1", QuestionFormat::Diagram, 1)],
        );
        assert!(matches!(duplicate, Err(ServiceError::Rejected(_))));

        let out_of_range = grade_answers(&qs, &[answer("q1", QuestionFormat::Diagram, 3)]);
        assert!(matches!(out_of_range, Err(ServiceError::Rejected(_))));

        let wrong_format = grade_answers(&qs, &[answer("q1", QuestionFormat::Text, 0)]);
        assert!(matches!(wrong_format, Err(ServiceError::Rejected(_))));
    }

    #[test]
    fn test_empty_answers_grade_to_nothing() {
        assert!(grade_answers(&questions(), &[]).unwrap().is_empty());
    }

    async fn seeded_session() -> (Database, String, Vec<Answer>) {
        let db = Database::connect_in_memory().await.unwrap();
        seed_diagnostic_questions(&db, "sat-core").await.unwrap();
        let view = start_session(&db, "u1", "sat-core").await.unwrap();
        let answers = view
            .questions
            .iter()
            .zip(default_answer_key())
            .map(|(q, key)| Answer::for_question(q, key))
            .collect();
        (db, view.session_id, answers)
    }

    #[tokio::test]
    async fn test_session_graded_with_one_answer_set() {
        let (db, session_id, answers) = seeded_session().await;

        let first = grade_session(&db, "u1", &session_id, &answers).await.unwrap();
        assert!(first.iter().all(|r| r.is_correct));
        let again = grade_session(&db, "u1", &session_id, &answers).await.unwrap();
        assert_eq!(again, first);

        let mut other = answers.clone();
        other[0].selected_option = (other[0].selected_option + 1) % 2;
        let err = grade_session(&db, "u1", &session_id, &other).await.unwrap_err();
        assert!(matches!(err, ServiceError::AnswersLocked));

        let session = operations::get_session(&db, &session_id).await.unwrap().unwrap();
        assert_eq!(session.graded_answers_hash, Some(answers_hash(&answers).unwrap()));
    }

    #[tokio::test]
    async fn test_partial_answer_set_not_graded() {
        let (db, session_id, mut answers) = seeded_session().await;
        answers.truncate(1);
        let err = grade_session(&db, "u1", &session_id, &answers).await.unwrap_err();
        assert!(matches!(err, ServiceError::Rejected(_)));

        let session = operations::get_session(&db, &session_id).await.unwrap().unwrap();
        assert!(session.graded_answers_hash.is_none());
    }

    #[tokio::test]
    async fn test_submitted_session_not_graded() {
        let (db, session_id, answers) = seeded_session().await;
        operations::mark_session_submitted(db.pool(), &session_id, &crate::db::now_iso())
            .await
            .unwrap();

        let err = grade_session(&db, "u1", &session_id, &answers).await.unwrap_err();
        assert!(matches!(err, ServiceError::SessionSubmitted));

        let err = grade_session(&db, "u2", &session_id, &answers).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
