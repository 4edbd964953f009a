use prep_algo::QuestionFormat;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::db::operations::decode_error;
use crate::db::Database;
use crate::models::DiagnosticQuestion;

/// A stored question together with its answer key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRecord {
    pub question: DiagnosticQuestion,
    pub question_set: String,
    pub position: i64,
    pub correct_option: usize,
}

pub async fn list_questions(
    db: &Database,
    question_set: &str,
) -> Result<Vec<QuestionRecord>, sqlx::Error> {
    let rows = sqlx::query(
        r#"SELECT * FROM "diagnostic_questions" WHERE "questionSet" = ? ORDER BY "position" ASC"#,
    )
    .bind(question_set)
    .fetch_all(db.pool())
    .await?;

    rows.iter().map(map_question_row).collect()
}

pub async fn count_questions(db: &Database, question_set: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(r#"SELECT COUNT(*) FROM "diagnostic_questions" WHERE "questionSet" = ?"#)
        .bind(question_set)
        .fetch_one(db.pool())
        .await
}

/// Insert a question unless one with the same id already exists.
pub async fn insert_question(db: &Database, record: &QuestionRecord) -> Result<bool, sqlx::Error> {
    let options = serde_json::to_string(&record.question.options)
        .map_err(|e| decode_error("options", e))?;

    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO "diagnostic_questions" (
            "id", "questionSet", "position", "prompt", "options",
            "subject", "format", "mediaRef", "correctOption"
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&record.question.id)
    .bind(&record.question_set)
    .bind(record.position)
    .bind(&record.question.text)
    .bind(options)
    .bind(&record.question.subject)
    .bind(record.question.format.as_str())
    .bind(&record.question.media_ref)
    .bind(record.correct_option as i64)
    .execute(db.pool())
    .await?;

    Ok(result.rows_affected() > 0)
}

fn map_question_row(row: &SqliteRow) -> Result<QuestionRecord, sqlx::Error> {
    let options_raw: String = row.try_get("options")?;
    let options: Vec<String> =
        serde_json::from_str(&options_raw).map_err(|e| decode_error("options", e))?;

    let format_raw: String = row.try_get("format")?;
    let format = QuestionFormat::parse(&format_raw)
        .ok_or_else(|| decode_error("format", format!("unknown question format {format_raw}")))?;

    let correct_option: i64 = row.try_get("correctOption")?;
    let correct_option = usize::try_from(correct_option)
        .map_err(|_| decode_error("correctOption", "negative answer key"))?;

    Ok(QuestionRecord {
        question: DiagnosticQuestion {
            id: row.try_get("id")?,
            text: row.try_get("prompt")?,
            options,
            subject: row.try_get("subject")?,
            format,
            media_ref: row.try_get("mediaRef")?,
        },
        question_set: row.try_get("questionSet")?,
        position: row.try_get("position")?,
        correct_option,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, position: i64, format: QuestionFormat) -> QuestionRecord {
        QuestionRecord {
            question: DiagnosticQuestion {
                id: id.to_string(),
                text: format!("prompt {id}"),
                options: vec!["a".into(), "b".into(), "c".into()],
                subject: "math".into(),
                format,
                media_ref: None,
            },
            question_set: "unit".into(),
            position,
            correct_option: 2,
        }
    }

    #[tokio::test]
    async fn test_insert_and_list_in_position_order() {
        let db = Database::connect_in_memory().await.unwrap();
        assert!(insert_question(&db, &record("q2", 2, QuestionFormat::Audio)).await.unwrap());
        assert!(insert_question(&db, &record("q1", 1, QuestionFormat::Diagram)).await.unwrap());

        let listed = list_questions(&db, "unit").await.unwrap();
        let ids: Vec<_> = listed.iter().map(|r| r.question.id.as_str()).collect();
        assert_eq!(ids, vec!["q1", "q2"]);
        assert_eq!(listed[0].question.format, QuestionFormat::Diagram);
        assert_eq!(listed[0].correct_option, 2);
        assert_eq!(listed[0].question.options.len(), 3);
    }

    #[tokio::test]
    async fn test_insert_is_idempotent() {
        let db = Database::connect_in_memory().await.unwrap();
        assert!(insert_question(&db, &record("q1", 1, QuestionFormat::Text)).await.unwrap());
        assert!(!insert_question(&db, &record("q1", 1, QuestionFormat::Text)).await.unwrap());
        assert_eq!(count_questions(&db, "unit").await.unwrap(), 1);
        assert_eq!(count_questions(&db, "other").await.unwrap(), 0);
    }
}
