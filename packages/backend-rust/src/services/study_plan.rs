//! Study-plan generation and the task mutations behind the plan API.
//!
//! A plan has one week of daily tasks and one set of weekly tasks. Daily tasks
//! cycle through the focus subjects, weakest first; weekly tasks review every
//! subject, add remediation for subjects under [`REMEDIATION_THRESHOLD`], and
//! end with a full practice test. Every non-test task uses the material that
//! matches the learner's style.

use prep_algo::{rank_by_weakness, LearningStyle, SubjectScore};

use crate::db::operations;
use crate::db::Database;
use crate::models::{
    PlanProgress, StudyMaterial, StudyPlan, StudyTask, TaskCadence, TaskStatus,
};
use crate::services::ServiceError;

pub const PLAN_DAYS: u32 = 7;
/// Subjects under this accuracy get a weekly remediation task.
pub const REMEDIATION_THRESHOLD: f64 = 50.0;
/// Subjects under this accuracy are the focus of the daily rotation.
pub const FOCUS_THRESHOLD: f64 = 80.0;
pub const MAX_STUDY_SECONDS: u64 = 86_400;

pub fn generate_plan(
    session_id: &str,
    learning_style: LearningStyle,
    breakdown: &[SubjectScore],
    now: &str,
) -> StudyPlan {
    let ranked = rank_by_weakness(breakdown);
    let material = StudyMaterial::for_style(learning_style);
    let material_label = material.as_str().replace('_', " ");

    let mut focus: Vec<&SubjectScore> = ranked.iter().filter(|s| s.is_weak(FOCUS_THRESHOLD)).collect();
    if focus.is_empty() {
        focus = ranked.iter().collect();
    }

    let mut tasks = Vec::new();

    if !focus.is_empty() {
        for day in 1..=PLAN_DAYS {
            let subject = focus[(day as usize - 1) % focus.len()];
            tasks.push(new_task(
                TaskCadence::Daily,
                format!("Day {day}: {} {material_label}", subject.subject),
                Some(subject.subject.clone()),
                material,
            ));
        }
    }

    for subject in &ranked {
        tasks.push(new_task(
            TaskCadence::Weekly,
            format!("Weekly review: {}", subject.subject),
            Some(subject.subject.clone()),
            material,
        ));
        if subject.is_weak(REMEDIATION_THRESHOLD) {
            tasks.push(new_task(
                TaskCadence::Weekly,
                format!("Remediation: {} fundamentals", subject.subject),
                Some(subject.subject.clone()),
                material,
            ));
        }
    }

    tasks.push(new_task(
        TaskCadence::Weekly,
        "Full-length practice test".to_string(),
        None,
        StudyMaterial::PracticeTest,
    ));

    // day/week indices follow the order tasks were pushed
    let mut day = 0;
    for task in &mut tasks {
        match task.cadence {
            TaskCadence::Daily => {
                day += 1;
                task.day_index = Some(day);
            }
            TaskCadence::Weekly => task.week_index = Some(1),
        }
    }

    StudyPlan {
        id: uuid::Uuid::new_v4().to_string(),
        session_id: session_id.to_string(),
        learning_style,
        tasks,
        progress_percent: 0.0,
        created_at: now.to_string(),
        updated_at: now.to_string(),
    }
}

fn new_task(
    cadence: TaskCadence,
    title: String,
    subject: Option<String>,
    material: StudyMaterial,
) -> StudyTask {
    StudyTask {
        id: uuid::Uuid::new_v4().to_string(),
        cadence,
        day_index: None,
        week_index: None,
        title,
        subject,
        material,
        status: TaskStatus::Pending,
        time_spent_secs: 0,
    }
}

pub async fn get_active_plan(db: &Database, user_id: &str) -> Result<Option<StudyPlan>, ServiceError> {
    Ok(operations::get_active_plan(db, user_id).await?)
}

pub async fn get_progress(db: &Database, user_id: &str) -> Result<PlanProgress, ServiceError> {
    let plan = operations::get_active_plan(db, user_id).await?;
    let statuses: Vec<TaskStatus> = plan
        .map(|p| p.tasks.into_iter().map(|t| t.status).collect())
        .unwrap_or_default();
    Ok(PlanProgress::from_statuses(statuses.iter()))
}

pub async fn update_task_status(
    db: &Database,
    user_id: &str,
    task_id: &str,
    status: TaskStatus,
) -> Result<StudyTask, ServiceError> {
    owned_task(db, user_id, task_id).await?;
    operations::update_task_status(db, task_id, status).await?;
    tracing::info!(user_id, task_id, status = status.as_db_str(), "task status updated");
    owned_task(db, user_id, task_id).await
}

pub async fn record_study_time(
    db: &Database,
    user_id: &str,
    task_id: &str,
    seconds: u64,
) -> Result<StudyTask, ServiceError> {
    if seconds == 0 || seconds > MAX_STUDY_SECONDS {
        return Err(ServiceError::Validation(format!(
            "seconds must be between 1 and {MAX_STUDY_SECONDS}"
        )));
    }
    owned_task(db, user_id, task_id).await?;
    operations::add_task_time(db, task_id, seconds).await?;
    tracing::debug!(user_id, task_id, seconds, "study time recorded");
    owned_task(db, user_id, task_id).await
}

async fn owned_task(db: &Database, user_id: &str, task_id: &str) -> Result<StudyTask, ServiceError> {
    operations::get_task_for_user(db, user_id, task_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("task not found".to_string()))
}
