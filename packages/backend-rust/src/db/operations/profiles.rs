use prep_algo::LearningStyle;
use sqlx::{Row, Sqlite};

use crate::db::operations::decode_error;
use crate::db::Database;
use crate::models::{LearningProfile, ProfileSource};

pub async fn get_learning_profile(
    db: &Database,
    user_id: &str,
) -> Result<Option<LearningProfile>, sqlx::Error> {
    let row = sqlx::query(r#"SELECT * FROM "learning_profiles" WHERE "userId" = ? LIMIT 1"#)
        .bind(user_id)
        .fetch_optional(db.pool())
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let style_raw: String = row.try_get("learningStyle")?;
    let learning_style = LearningStyle::parse(&style_raw)
        .ok_or_else(|| decode_error("learningStyle", format!("unknown learning style {style_raw}")))?;
    let source: String = row.try_get("source")?;

    Ok(Some(LearningProfile {
        learning_style,
        source: ProfileSource::from_db_str(&source),
        updated_at: row.try_get("updatedAt")?,
    }))
}

pub(crate) async fn upsert_learning_profile<'c, E>(
    executor: E,
    user_id: &str,
    profile: &LearningProfile,
) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'c, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO "learning_profiles" ("userId", "learningStyle", "source", "updatedAt")
        VALUES (?, ?, ?, ?)
        ON CONFLICT ("userId") DO UPDATE SET
            "learningStyle" = excluded."learningStyle",
            "source" = excluded."source",
            "updatedAt" = excluded."updatedAt"
        "#,
    )
    .bind(user_id)
    .bind(profile.learning_style.as_str())
    .bind(profile.source.as_db_str())
    .bind(&profile.updated_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn save_learning_profile(
    db: &Database,
    user_id: &str,
    profile: &LearningProfile,
) -> Result<(), sqlx::Error> {
    upsert_learning_profile(db.pool(), user_id, profile).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_profile_upsert_overwrites() {
        let db = Database::connect_in_memory().await.unwrap();
        assert!(get_learning_profile(&db, "u1").await.unwrap().is_none());

        let diagnostic = LearningProfile {
            learning_style: LearningStyle::Visual,
            source: ProfileSource::Diagnostic,
            updated_at: "2026-01-01T00:00:00.000Z".into(),
        };
        save_learning_profile(&db, "u1", &diagnostic).await.unwrap();
        assert_eq!(get_learning_profile(&db, "u1").await.unwrap(), Some(diagnostic));

        let manual = LearningProfile {
            learning_style: LearningStyle::Kinesthetic,
            source: ProfileSource::Manual,
            updated_at: "2026-01-02T00:00:00.000Z".into(),
        };
        save_learning_profile(&db, "u1", &manual).await.unwrap();
        assert_eq!(get_learning_profile(&db, "u1").await.unwrap(), Some(manual));
    }
}
