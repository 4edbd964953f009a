use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};

use crate::auth::AuthUser;
use crate::models::{RecordStudyTimeRequest, UpdateTaskStatusRequest};
use crate::response::{AppError, SuccessResponse};
use crate::routes::service_error;
use crate::services::study_plan;
use crate::state::AppState;

pub async fn get_plan(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response, AppError> {
    let plan = study_plan::get_active_plan(state.db(), &user.id)
        .await
        .map_err(service_error)?;
    Ok(SuccessResponse::ok(plan).into_response())
}

pub async fn get_progress(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response, AppError> {
    let progress = study_plan::get_progress(state.db(), &user.id)
        .await
        .map_err(service_error)?;
    Ok(SuccessResponse::ok(progress).into_response())
}

pub async fn update_task_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(task_id): Path<String>,
    Json(payload): Json<UpdateTaskStatusRequest>,
) -> Result<Response, AppError> {
    let task = study_plan::update_task_status(state.db(), &user.id, &task_id, payload.status)
        .await
        .map_err(service_error)?;
    Ok(SuccessResponse::ok(task).into_response())
}

pub async fn record_study_time(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(task_id): Path<String>,
    Json(payload): Json<RecordStudyTimeRequest>,
) -> Result<Response, AppError> {
    let task = study_plan::record_study_time(state.db(), &user.id, &task_id, payload.seconds)
        .await
        .map_err(service_error)?;
    Ok(SuccessResponse::ok(task).into_response())
}
