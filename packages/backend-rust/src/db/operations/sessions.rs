use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite};

use crate::db::{now_iso, Database};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    InProgress,
    Submitted,
}

impl SessionStatus {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            Self::InProgress => "IN_PROGRESS",
            Self::Submitted => "SUBMITTED",
        }
    }

    pub fn from_db_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "SUBMITTED" => Self::Submitted,
            _ => Self::InProgress,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub id: String,
    pub user_id: String,
    pub question_set: String,
    pub status: SessionStatus,
    pub created_at: String,
    pub submitted_at: Option<String>,
    /// Hash of the one answer set this session may be graded with.
    pub graded_answers_hash: Option<String>,
}

pub async fn insert_session(
    db: &Database,
    user_id: &str,
    question_set: &str,
) -> Result<SessionRecord, sqlx::Error> {
    let record = SessionRecord {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        question_set: question_set.to_string(),
        status: SessionStatus::InProgress,
        created_at: now_iso(),
        submitted_at: None,
        graded_answers_hash: None,
    };

    sqlx::query(
        r#"
        INSERT INTO "diagnostic_sessions" ("id", "userId", "questionSet", "status", "createdAt")
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&record.id)
    .bind(&record.user_id)
    .bind(&record.question_set)
    .bind(record.status.as_db_str())
    .bind(&record.created_at)
    .execute(db.pool())
    .await?;

    Ok(record)
}

pub async fn get_session(db: &Database, session_id: &str) -> Result<Option<SessionRecord>, sqlx::Error> {
    let row = sqlx::query(r#"SELECT * FROM "diagnostic_sessions" WHERE "id" = ? LIMIT 1"#)
        .bind(session_id)
        .fetch_optional(db.pool())
        .await?;
    row.as_ref().map(map_session_row).transpose()
}

pub(crate) async fn mark_session_submitted<'c, E>(
    executor: E,
    session_id: &str,
    submitted_at: &str,
) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'c, Database = Sqlite>,
{
    sqlx::query(r#"UPDATE "diagnostic_sessions" SET "status" = ?, "submittedAt" = ? WHERE "id" = ?"#)
        .bind(SessionStatus::Submitted.as_db_str())
        .bind(submitted_at)
        .bind(session_id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Bind `answers_hash` to an unsubmitted session that has no graded answer
/// set yet. Returns `false` when the session was already bound or submitted.
pub(crate) async fn lock_graded_answers(
    db: &Database,
    session_id: &str,
    answers_hash: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE "diagnostic_sessions" SET "gradedAnswersHash" = ?
        WHERE "id" = ? AND "gradedAnswersHash" IS NULL AND "status" = ?
        "#,
    )
    .bind(answers_hash)
    .bind(session_id)
    .bind(SessionStatus::InProgress.as_db_str())
    .execute(db.pool())
    .await?;
    Ok(result.rows_affected() == 1)
}

fn map_session_row(row: &SqliteRow) -> Result<SessionRecord, sqlx::Error> {
    let status: String = row.try_get("status")?;
    Ok(SessionRecord {
        id: row.try_get("id")?,
        user_id: row.try_get("userId")?,
        question_set: row.try_get("questionSet")?,
        status: SessionStatus::from_db_str(&status),
        created_at: row.try_get("createdAt")?,
        submitted_at: row.try_get("submittedAt")?,
        graded_answers_hash: row.try_get("gradedAnswersHash")?,
    })
}
