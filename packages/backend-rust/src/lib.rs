pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod diagnostic;
pub mod logging;
pub mod middleware;
pub mod models;
pub mod response;
pub mod routes;
pub mod seed;
pub mod services;
pub mod state;

use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::db::{Database, DbInitError};
use crate::state::AppState;

/// Router with the HTTP tracing and CORS layers applied.
pub fn build_router(state: AppState) -> axum::Router {
    routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Connect the database, seed the diagnostic set if enabled and build the app.
pub async fn create_app(config: Config) -> Result<(axum::Router, AppState), DbInitError> {
    let db = Database::connect(&config.database_url).await?;
    if config.seed_diagnostic {
        seed::seed_diagnostic_questions(&db, &config.question_set).await?;
    }
    let state = AppState::new(db, config);
    Ok((build_router(state.clone()), state))
}
