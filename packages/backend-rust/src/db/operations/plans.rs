use prep_algo::LearningStyle;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite};

use crate::db::operations::decode_error;
use crate::db::{now_iso, Database};
use crate::models::{PlanProgress, StudyMaterial, StudyPlan, StudyTask, TaskCadence, TaskStatus};

/// Deactivate every active plan of `user_id`; a user has at most one active plan.
pub(crate) async fn deactivate_active_plans<'c, E>(
    executor: E,
    user_id: &str,
    now: &str,
) -> Result<u64, sqlx::Error>
where
    E: sqlx::Executor<'c, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"UPDATE "study_plans" SET "isActive" = 0, "updatedAt" = ? WHERE "userId" = ? AND "isActive" = 1"#,
    )
    .bind(now)
    .bind(user_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

pub(crate) async fn insert_plan_row<'c, E>(
    executor: E,
    user_id: &str,
    plan: &StudyPlan,
) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'c, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO "study_plans" (
            "id", "userId", "sessionId", "learningStyle", "isActive", "createdAt", "updatedAt"
        ) VALUES (?, ?, ?, ?, 1, ?, ?)
        "#,
    )
    .bind(&plan.id)
    .bind(user_id)
    .bind(&plan.session_id)
    .bind(plan.learning_style.as_str())
    .bind(&plan.created_at)
    .bind(&plan.updated_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) async fn insert_task_row<'c, E>(
    executor: E,
    plan_id: &str,
    position: i64,
    task: &StudyTask,
    now: &str,
) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'c, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO "study_tasks" (
            "id", "planId", "cadence", "dayIndex", "weekIndex", "position",
            "title", "subject", "material", "status", "timeSpentSecs", "updatedAt"
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&task.id)
    .bind(plan_id)
    .bind(task.cadence.as_db_str())
    .bind(task.day_index.map(i64::from))
    .bind(task.week_index.map(i64::from))
    .bind(position)
    .bind(&task.title)
    .bind(&task.subject)
    .bind(task.material.as_str())
    .bind(task.status.as_db_str())
    .bind(task.time_spent_secs as i64)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn get_active_plan(db: &Database, user_id: &str) -> Result<Option<StudyPlan>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT * FROM "study_plans"
        WHERE "userId" = ? AND "isActive" = 1
        ORDER BY "createdAt" DESC
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db.pool())
    .await?;

    let plan = row.as_ref().map(map_plan_row).transpose()?;
    match plan {
        Some(plan) => with_tasks(db, plan).await.map(Some),
        None => Ok(None),
    }
}

pub async fn get_plan(db: &Database, plan_id: &str) -> Result<Option<StudyPlan>, sqlx::Error> {
    let row = sqlx::query(r#"SELECT * FROM "study_plans" WHERE "id" = ? LIMIT 1"#)
        .bind(plan_id)
        .fetch_optional(db.pool())
        .await?;

    let plan = row.as_ref().map(map_plan_row).transpose()?;
    match plan {
        Some(plan) => with_tasks(db, plan).await.map(Some),
        None => Ok(None),
    }
}

pub async fn list_plan_tasks(db: &Database, plan_id: &str) -> Result<Vec<StudyTask>, sqlx::Error> {
    let rows = sqlx::query(r#"SELECT * FROM "study_tasks" WHERE "planId" = ? ORDER BY "position" ASC"#)
        .bind(plan_id)
        .fetch_all(db.pool())
        .await?;
    rows.iter().map(map_task_row).collect()
}

/// Load a task only if it belongs to one of `user_id`'s plans.
pub async fn get_task_for_user(
    db: &Database,
    user_id: &str,
    task_id: &str,
) -> Result<Option<StudyTask>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT t.* FROM "study_tasks" t
        JOIN "study_plans" p ON p."id" = t."planId"
        WHERE t."id" = ? AND p."userId" = ?
        LIMIT 1
        "#,
    )
    .bind(task_id)
    .bind(user_id)
    .fetch_optional(db.pool())
    .await?;
    row.as_ref().map(map_task_row).transpose()
}

pub async fn update_task_status(
    db: &Database,
    task_id: &str,
    status: TaskStatus,
) -> Result<(), sqlx::Error> {
    let now = now_iso();
    sqlx::query(r#"UPDATE "study_tasks" SET "status" = ?, "updatedAt" = ? WHERE "id" = ?"#)
        .bind(status.as_db_str())
        .bind(&now)
        .bind(task_id)
        .execute(db.pool())
        .await?;
    touch_plan_of_task(db, task_id, &now).await
}

pub async fn add_task_time(db: &Database, task_id: &str, seconds: u64) -> Result<(), sqlx::Error> {
    let now = now_iso();
    sqlx::query(
        r#"UPDATE "study_tasks" SET "timeSpentSecs" = "timeSpentSecs" + ?, "updatedAt" = ? WHERE "id" = ?"#,
    )
    .bind(seconds as i64)
    .bind(&now)
    .bind(task_id)
    .execute(db.pool())
    .await?;
    touch_plan_of_task(db, task_id, &now).await
}

async fn touch_plan_of_task(db: &Database, task_id: &str, now: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE "study_plans" SET "updatedAt" = ?
        WHERE "id" = (SELECT "planId" FROM "study_tasks" WHERE "id" = ?)
        "#,
    )
    .bind(now)
    .bind(task_id)
    .execute(db.pool())
    .await?;
    Ok(())
}

fn map_plan_row(row: &SqliteRow) -> Result<StudyPlan, sqlx::Error> {
    let style_raw: String = row.try_get("learningStyle")?;
    let learning_style = LearningStyle::parse(&style_raw)
        .ok_or_else(|| decode_error("learningStyle", format!("unknown learning style {style_raw}")))?;

    Ok(StudyPlan {
        id: row.try_get("id")?,
        session_id: row.try_get("sessionId")?,
        learning_style,
        tasks: Vec::new(),
        progress_percent: 0.0,
        created_at: row.try_get("createdAt")?,
        updated_at: row.try_get("updatedAt")?,
    })
}

async fn with_tasks(db: &Database, mut plan: StudyPlan) -> Result<StudyPlan, sqlx::Error> {
    plan.tasks = list_plan_tasks(db, &plan.id).await?;
    plan.progress_percent = PlanProgress::from_statuses(plan.tasks.iter().map(|t| &t.status)).progress_percent;
    Ok(plan)
}

fn map_task_row(row: &SqliteRow) -> Result<StudyTask, sqlx::Error> {
    let cadence: String = row.try_get("cadence")?;
    let status: String = row.try_get("status")?;
    let material_raw: String = row.try_get("material")?;
    let material = StudyMaterial::parse(&material_raw)
        .ok_or_else(|| decode_error("material", format!("unknown material {material_raw}")))?;
    let day_index: Option<i64> = row.try_get("dayIndex")?;
    let week_index: Option<i64> = row.try_get("weekIndex")?;
    let time_spent: i64 = row.try_get("timeSpentSecs")?;

    Ok(StudyTask {
        id: row.try_get("id")?,
        cadence: TaskCadence::from_db_str(&cadence),
        day_index: day_index.and_then(|v| u32::try_from(v).ok()),
        week_index: week_index.and_then(|v| u32::try_from(v).ok()),
        title: row.try_get("title")?,
        subject: row.try_get("subject")?,
        material,
        status: TaskStatus::from_db_str(&status),
        time_spent_secs: time_spent.max(0) as u64,
    })
}
