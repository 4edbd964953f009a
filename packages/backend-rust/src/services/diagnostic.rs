use prep_algo::{classify, subject_breakdown, FormatOutcome};
use sha2::{Digest, Sha256};

use crate::db::operations::{self, SubmissionRecord};
use crate::db::now_iso;
use crate::models::{SubmissionReceipt, SubmitDiagnosticRequest};
use crate::services::question_bank::load_question_set;
use crate::services::scoring::{bind_answer_set, ensure_complete, grade_answers};
use crate::services::study_plan::generate_plan;
use crate::services::ServiceError;
use crate::state::AppState;

/// SHA-256 (hex) of the canonical JSON encoding of a submission.
pub fn payload_hash(request: &SubmitDiagnosticRequest) -> Result<String, ServiceError> {
    let bytes = serde_json::to_vec(request)
        .map_err(|e| ServiceError::Validation(format!("unencodable submission: {e}")))?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

/// Accept a completed diagnostic and persist the generated plan.
///
/// Resubmitting the same payload for a session replays the stored plan; a
/// different payload is a duplicate. The answers must be the set the session
/// was graded with, if it was graded. Only one request per session is
/// processed at a time.
pub async fn submit(
    state: &AppState,
    user_id: &str,
    session_id: &str,
    request: SubmitDiagnosticRequest,
) -> Result<SubmissionReceipt, ServiceError> {
    let db = state.db();
    let session = operations::get_session(db, session_id)
        .await?
        .filter(|s| s.user_id == user_id)
        .ok_or_else(|| ServiceError::NotFound("diagnostic session not found".to_string()))?;

    // only the owner may hold the claim
    let Some(_claim) = state.in_flight().try_claim(session_id) else {
        tracing::warn!(user_id, session_id, "concurrent submission rejected");
        return Err(ServiceError::SubmissionInProgress);
    };

    let hash = payload_hash(&request)?;

    if let Some(existing) = operations::get_submission(db, session_id).await? {
        if existing.payload_hash != hash {
            tracing::warn!(user_id, session_id, "divergent resubmission rejected");
            return Err(ServiceError::DuplicateSubmission);
        }
        let plan = operations::get_plan(db, &existing.plan_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("study plan not found".to_string()))?;
        tracing::info!(user_id, session_id, plan_id = %plan.id, "submission replayed");
        return Ok(SubmissionReceipt {
            plan,
            subject_breakdown: existing.subject_breakdown,
            learning_style: existing.learning_style,
            replayed: true,
        });
    }

    let questions = load_question_set(db, &session.question_set).await?;
    ensure_complete(&questions, &request.answers)?;
    let graded = grade_answers(&questions, &request.answers)?;
    bind_answer_set(db, &session, &request.answers).await?;

    let outcomes = request
        .answers
        .iter()
        .zip(&graded)
        .map(|(answer, result)| FormatOutcome::new(answer.format, result.is_correct));
    let classification = classify(questions.iter().map(|q| q.question.format), outcomes)
        .map_err(|e| ServiceError::Rejected(e.to_string()))?;

    if classification.learning_style != request.learning_style {
        tracing::warn!(
            user_id,
            session_id,
            declared = request.learning_style.as_str(),
            classified = classification.learning_style.as_str(),
            "declared learning style does not match graded answers"
        );
        return Err(ServiceError::Rejected(format!(
            "learning style {} does not match graded answers ({})",
            request.learning_style,
            classification.learning_style
        )));
    }

    let breakdown = subject_breakdown(
        request
            .answers
            .iter()
            .zip(&graded)
            .map(|(answer, result)| (answer.subject.as_str(), result.is_correct)),
    );

    let now = now_iso();
    let plan = generate_plan(session_id, classification.learning_style, &breakdown, &now);
    let record = SubmissionRecord {
        session_id: session_id.to_string(),
        user_id: user_id.to_string(),
        payload_hash: hash,
        learning_style: classification.learning_style,
        plan_id: plan.id.clone(),
        subject_breakdown: breakdown.clone(),
        created_at: now,
    };
    operations::persist_submission(db, &record, &plan).await?;

    tracing::info!(
        user_id,
        session_id,
        plan_id = %plan.id,
        learning_style = classification.learning_style.as_str(),
        winning_format = classification.winning_format.as_str(),
        tasks = plan.tasks.len(),
        "diagnostic submitted"
    );

    Ok(SubmissionReceipt {
        plan,
        subject_breakdown: breakdown,
        learning_style: classification.learning_style,
        replayed: false,
    })
}
