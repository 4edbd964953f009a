#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use prep_backend::auth::issue_token;
use prep_backend::config::Config;
use prep_backend::db::Database;
use prep_backend::seed::seed_diagnostic_questions;
use prep_backend::state::AppState;

pub const TEST_SECRET: &str = "integration-test-secret";
pub const QUESTION_SET: &str = "sat-core";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

/// In-memory app with the default question battery seeded.
pub async fn create_test_app() -> TestApp {
    let db = Database::connect_in_memory().await.unwrap();
    seed_diagnostic_questions(&db, QUESTION_SET).await.unwrap();
    app_with_db(db)
}

/// In-memory app with no questions at all.
pub async fn create_empty_app() -> TestApp {
    let db = Database::connect_in_memory().await.unwrap();
    app_with_db(db)
}

pub fn app_with_db(db: Database) -> TestApp {
    let state = AppState::new(db, Config::for_tests(TEST_SECRET));
    TestApp {
        router: prep_backend::build_router(state.clone()),
        state,
    }
}

pub fn token_for(user_id: &str) -> String {
    issue_token(&Config::for_tests(TEST_SECRET), user_id).unwrap().0
}

impl TestApp {
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.call(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.call(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.call(Method::PUT, uri, Some(token), Some(body)).await
    }

    /// Start a session and build answers choosing `pick(index, question)`.
    pub async fn start_session(&self, token: &str) -> (String, Vec<Value>) {
        let (status, body) = self
            .call(Method::POST, "/api/diagnostic/sessions", Some(token), None)
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        let session_id = body["data"]["sessionId"].as_str().unwrap().to_string();
        let questions = body["data"]["questions"].as_array().unwrap().clone();
        (session_id, questions)
    }
}

/// Answer JSON for `question` choosing option `selected`.
pub fn answer_json(question: &Value, selected: usize) -> Value {
    serde_json::json!({
        "questionId": question["id"],
        "selectedOption": selected,
        "format": question["format"],
        "subject": question["subject"],
    })
}
