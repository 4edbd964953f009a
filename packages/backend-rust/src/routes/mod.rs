mod diagnostic;
mod health;
mod plan;
mod users;

use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::Router;

use crate::middleware::auth::require_auth;
use crate::response::{json_error, AppError};
use crate::services::question_bank::QuestionBankError;
use crate::services::ServiceError;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/api/diagnostic/sessions",
            post(diagnostic::start_session).fallback(fallback_handler),
        )
        .route(
            "/api/diagnostic/sessions/:id",
            get(diagnostic::get_session).fallback(fallback_handler),
        )
        .route(
            "/api/diagnostic/sessions/:id/grade",
            post(diagnostic::grade).fallback(fallback_handler),
        )
        .route(
            "/api/diagnostic/sessions/:id/submit",
            post(diagnostic::submit).fallback(fallback_handler),
        )
        .route("/api/plan", get(plan::get_plan).fallback(fallback_handler))
        .route(
            "/api/plan/progress",
            get(plan::get_progress).fallback(fallback_handler),
        )
        .route(
            "/api/plan/tasks/:id",
            put(plan::update_task_status).fallback(fallback_handler),
        )
        .route(
            "/api/plan/tasks/:id/time",
            post(plan::record_study_time).fallback(fallback_handler),
        )
        .route(
            "/api/users/profile/learning-style",
            get(users::get_learning_style)
                .put(users::set_learning_style)
                .fallback(fallback_handler),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .nest("/health", health::router())
        .merge(protected)
        .fallback(fallback_handler)
        .with_state(state)
}

async fn fallback_handler() -> Response {
    json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "route not found").into_response()
}

pub(crate) fn service_error(err: ServiceError) -> AppError {
    match err {
        ServiceError::NotFound(message) => AppError::not_found(message),
        ServiceError::Validation(message) => AppError::validation(message),
        ServiceError::Rejected(message) => AppError::unprocessable("SUBMISSION_REJECTED", message),
        ServiceError::DuplicateSubmission => AppError::conflict(
            "DUPLICATE_SUBMISSION",
            "this diagnostic was already submitted with different answers",
        ),
        ServiceError::SubmissionInProgress => AppError::conflict(
            "SUBMISSION_IN_PROGRESS",
            "a submission for this diagnostic is already in progress",
        ),
        ServiceError::AnswersLocked => AppError::conflict(
            "ANSWERS_LOCKED",
            "this diagnostic was already graded with different answers",
        ),
        ServiceError::SessionSubmitted => AppError::conflict(
            "SESSION_SUBMITTED",
            "this diagnostic has already been submitted",
        ),
        ServiceError::QuestionSet(err) => {
            match &err {
                QuestionBankError::Empty(set) => {
                    tracing::warn!(question_set = %set, "question set empty")
                }
                QuestionBankError::Malformed { id, reason } => {
                    tracing::warn!(question_id = %id, reason = %reason, "malformed question")
                }
            }
            AppError::service_unavailable("QUESTION_SET_UNAVAILABLE", err.to_string())
        }
        ServiceError::Sql(err) => AppError::internal(format!("database error: {err}")),
    }
}
