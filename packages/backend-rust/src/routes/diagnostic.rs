use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};

use crate::auth::AuthUser;
use crate::models::{GradeRequest, GradeResponse, SubmitDiagnosticRequest};
use crate::response::{AppError, SuccessResponse};
use crate::routes::service_error;
use crate::services::{diagnostic, question_bank, scoring};
use crate::state::AppState;

pub async fn start_session(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response, AppError> {
    let view = question_bank::start_session(state.db(), &user.id, &state.config().question_set)
        .await
        .map_err(service_error)?;
    Ok((StatusCode::CREATED, SuccessResponse::ok(view)).into_response())
}

pub async fn get_session(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(session_id): Path<String>,
) -> Result<Response, AppError> {
    let view = question_bank::get_session_view(state.db(), &user.id, &session_id)
        .await
        .map_err(service_error)?;
    Ok(SuccessResponse::ok(view).into_response())
}

pub async fn grade(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(session_id): Path<String>,
    Json(payload): Json<GradeRequest>,
) -> Result<Response, AppError> {
    let results = scoring::grade_session(state.db(), &user.id, &session_id, &payload.answers)
        .await
        .map_err(service_error)?;
    Ok(SuccessResponse::ok(GradeResponse { results }).into_response())
}

pub async fn submit(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(session_id): Path<String>,
    Json(payload): Json<SubmitDiagnosticRequest>,
) -> Result<Response, AppError> {
    let receipt = diagnostic::submit(&state, &user.id, &session_id, payload)
        .await
        .map_err(service_error)?;

    let status = if receipt.replayed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, SuccessResponse::ok(receipt)).into_response())
}
