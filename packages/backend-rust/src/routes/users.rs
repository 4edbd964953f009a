use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};

use crate::auth::AuthUser;
use crate::models::SetLearningStyleRequest;
use crate::response::{AppError, SuccessResponse};
use crate::routes::service_error;
use crate::services::learning_profile;
use crate::state::AppState;

pub async fn get_learning_style(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response, AppError> {
    let profile = learning_profile::get_profile(state.db(), &user.id)
        .await
        .map_err(service_error)?;
    Ok(SuccessResponse::ok(profile).into_response())
}

pub async fn set_learning_style(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<SetLearningStyleRequest>,
) -> Result<Response, AppError> {
    let profile = learning_profile::set_manual_style(state.db(), &user.id, payload.learning_style)
        .await
        .map_err(service_error)?;
    Ok(SuccessResponse::with_message(profile, "learning style updated").into_response())
}
