use std::time::Duration;

use prep_algo::LearningStyle;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::{
    ClientError, QuestionBank, ScoringAuthority, StudyPlanGenerator, StudyPlanService,
};
use crate::models::{
    Answer, DiagnosticSessionView, GradeRequest, GradeResponse, GradeResult, LearningProfile,
    PlanProgress, RecordStudyTimeRequest, SetLearningStyleRequest, StudyPlan, StudyTask, SubmissionReceipt,
    SubmitDiagnosticRequest, TaskStatus, UpdateTaskStatusRequest,
};
use crate::response::{ErrorResponse, SuccessResponse};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// REST client for every prep-backend endpoint, authenticated with a bearer token.
#[derive(Clone)]
pub struct HttpPrepClient {
    base_url: String,
    token: Option<String>,
    http: reqwest::Client,
}

impl HttpPrepClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self::with_client(http, base_url, token)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>, token: Option<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            token,
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get_session(&self, session_id: &str) -> Result<DiagnosticSessionView, ClientError> {
        let path = format!("/api/diagnostic/sessions/{session_id}");
        self.send(self.http.get(self.url(&path))).await
    }

    pub async fn plan_progress(&self) -> Result<PlanProgress, ClientError> {
        self.send(self.http.get(self.url("/api/plan/progress"))).await
    }

    pub async fn learning_profile(&self) -> Result<Option<LearningProfile>, ClientError> {
        self.send(self.http.get(self.url("/api/users/profile/learning-style")))
            .await
    }

    pub async fn set_learning_style(&self, learning_style: LearningStyle) -> Result<LearningProfile, ClientError> {
        let body = SetLearningStyleRequest { learning_style };
        self.send_json(self.http.put(self.url("/api/users/profile/learning-style")), &body)
            .await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send_json<B, T>(&self, request: RequestBuilder, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(request.json(body)).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if status.is_success() {
            let body: SuccessResponse<T> = serde_json::from_slice(&bytes).map_err(|e| {
                tracing::warn!(error = %e, %status, "undecodable success body");
                ClientError::Decode(e.to_string())
            })?;
            return Ok(body.data);
        }

        Err(error_from_status(status, &bytes))
    }
}

fn error_from_status(status: StatusCode, body: &[u8]) -> ClientError {
    if status == StatusCode::UNAUTHORIZED {
        return ClientError::Unauthorized;
    }
    if status.is_server_error() {
        return ClientError::Network(format!("server responded {status}"));
    }

    match serde_json::from_slice::<ErrorResponse>(body) {
        Ok(err) => ClientError::Rejected {
            status: status.as_u16(),
            code: err.code,
            message: err.error,
        },
        Err(_) => ClientError::Rejected {
            status: status.as_u16(),
            code: format!("HTTP_{}", status.as_u16()),
            message: String::from_utf8_lossy(body).into_owned(),
        },
    }
}

impl QuestionBank for HttpPrepClient {
    async fn start_session(&self) -> Result<DiagnosticSessionView, ClientError> {
        self.send(self.http.post(self.url("/api/diagnostic/sessions")))
            .await
    }
}

impl ScoringAuthority for HttpPrepClient {
    async fn grade(&self, session_id: &str, answers: &[Answer]) -> Result<Vec<GradeResult>, ClientError> {
        let path = format!("/api/diagnostic/sessions/{session_id}/grade");
        let body = GradeRequest {
            answers: answers.to_vec(),
        };
        let response: GradeResponse = self.send_json(self.http.post(self.url(&path)), &body).await?;
        Ok(response.results)
    }
}

impl StudyPlanGenerator for HttpPrepClient {
    async fn submit(
        &self,
        session_id: &str,
        payload: &SubmitDiagnosticRequest,
    ) -> Result<SubmissionReceipt, ClientError> {
        let path = format!("/api/diagnostic/sessions/{session_id}/submit");
        self.send_json(self.http.post(self.url(&path)), payload).await
    }
}

impl StudyPlanService for HttpPrepClient {
    async fn fetch_plan(&self) -> Result<Option<StudyPlan>, ClientError> {
        self.send(self.http.get(self.url("/api/plan"))).await
    }

    async fn update_task_status(&self, task_id: &str, status: TaskStatus) -> Result<StudyTask, ClientError> {
        let path = format!("/api/plan/tasks/{task_id}");
        let body = UpdateTaskStatusRequest { status };
        self.send_json(self.http.put(self.url(&path)), &body).await
    }

    async fn record_study_time(&self, task_id: &str, seconds: u64) -> Result<StudyTask, ClientError> {
        let path = format!("/api/plan/tasks/{task_id}/time");
        let body = RecordStudyTimeRequest { seconds };
        self.send_json(self.http.post(self.url(&path)), &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        assert_eq!(
            error_from_status(StatusCode::UNAUTHORIZED, b""),
            ClientError::Unauthorized
        );
        assert!(error_from_status(StatusCode::BAD_GATEWAY, b"").is_transient());

        let body = br#"{"success":false,"error":"already submitted","code":"DUPLICATE_SUBMISSION"}"#;
        assert_eq!(
            error_from_status(StatusCode::CONFLICT, body),
            ClientError::Rejected {
                status: 409,
                code: "DUPLICATE_SUBMISSION".into(),
                message: "already submitted".into(),
            }
        );

        let plain = error_from_status(StatusCode::UNPROCESSABLE_ENTITY, b"bad json");
        assert_eq!(plain.code(), Some("HTTP_422"));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = HttpPrepClient::new("http://localhost:3000/", None);
        assert_eq!(client.base_url(), "http://localhost:3000");
        assert_eq!(client.url("/api/plan"), "http://localhost:3000/api/plan");
    }
}
