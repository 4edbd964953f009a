use prep_algo::{LearningStyle, SubjectScore};
use sqlx::Row;

use crate::db::operations::{
    decode_error, deactivate_active_plans, insert_plan_row, insert_task_row,
    mark_session_submitted, upsert_learning_profile,
};
use crate::db::Database;
use crate::models::{LearningProfile, ProfileSource, StudyPlan};

#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionRecord {
    pub session_id: String,
    pub user_id: String,
    pub payload_hash: String,
    pub learning_style: LearningStyle,
    pub plan_id: String,
    pub subject_breakdown: Vec<SubjectScore>,
    pub created_at: String,
}

pub async fn get_submission(
    db: &Database,
    session_id: &str,
) -> Result<Option<SubmissionRecord>, sqlx::Error> {
    let row = sqlx::query(r#"SELECT * FROM "diagnostic_submissions" WHERE "sessionId" = ? LIMIT 1"#)
        .bind(session_id)
        .fetch_optional(db.pool())
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let style_raw: String = row.try_get("learningStyle")?;
    let learning_style = LearningStyle::parse(&style_raw)
        .ok_or_else(|| decode_error("learningStyle", format!("unknown learning style {style_raw}")))?;
    let breakdown_raw: String = row.try_get("subjectBreakdown")?;
    let subject_breakdown: Vec<SubjectScore> =
        serde_json::from_str(&breakdown_raw).map_err(|e| decode_error("subjectBreakdown", e))?;

    Ok(Some(SubmissionRecord {
        session_id: row.try_get("sessionId")?,
        user_id: row.try_get("userId")?,
        payload_hash: row.try_get("payloadHash")?,
        learning_style,
        plan_id: row.try_get("planId")?,
        subject_breakdown,
        created_at: row.try_get("createdAt")?,
    }))
}

/// Store an accepted submission in one transaction: the submission row, the
/// new active plan and its tasks, the session status and the learner's
/// diagnostic profile. Any failure leaves no partial state behind.
pub async fn persist_submission(
    db: &Database,
    record: &SubmissionRecord,
    plan: &StudyPlan,
) -> Result<(), sqlx::Error> {
    let breakdown = serde_json::to_string(&record.subject_breakdown)
        .map_err(|e| decode_error("subjectBreakdown", e))?;

    let mut tx = db.pool().begin().await?;

    deactivate_active_plans(&mut *tx, &record.user_id, &record.created_at).await?;
    insert_plan_row(&mut *tx, &record.user_id, plan).await?;
    for (position, task) in plan.tasks.iter().enumerate() {
        insert_task_row(&mut *tx, &plan.id, position as i64, task, &record.created_at).await?;
    }

    sqlx::query(
        r#"
        INSERT INTO "diagnostic_submissions" (
            "sessionId", "userId", "payloadHash", "learningStyle",
            "planId", "subjectBreakdown", "createdAt"
        ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&record.session_id)
    .bind(&record.user_id)
    .bind(&record.payload_hash)
    .bind(record.learning_style.as_str())
    .bind(&record.plan_id)
    .bind(breakdown)
    .bind(&record.created_at)
    .execute(&mut *tx)
    .await?;

    mark_session_submitted(&mut *tx, &record.session_id, &record.created_at).await?;

    let profile = LearningProfile {
        learning_style: record.learning_style,
        source: ProfileSource::Diagnostic,
        updated_at: record.created_at.clone(),
    };
    upsert_learning_profile(&mut *tx, &record.user_id, &profile).await?;

    tx.commit().await?;
    Ok(())
}
