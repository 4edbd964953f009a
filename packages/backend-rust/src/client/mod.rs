//! Typed clients for the question bank, scoring authority and study-plan
//! services. Consumers depend on the traits, never on a concrete transport.

pub mod error;
pub mod http;
pub mod plan_cache;

use std::future::Future;
use std::sync::Arc;

pub use error::ClientError;
pub use http::HttpPrepClient;
pub use plan_cache::PlanCache;

use crate::models::{
    Answer, DiagnosticSessionView, GradeResult, StudyPlan, StudyTask, SubmissionReceipt,
    SubmitDiagnosticRequest, TaskStatus,
};

pub trait QuestionBank: Send + Sync {
    /// Open a new diagnostic session and fetch its ordered questions.
    fn start_session(&self) -> impl Future<Output = Result<DiagnosticSessionView, ClientError>> + Send;
}

pub trait ScoringAuthority: Send + Sync {
    fn grade(
        &self,
        session_id: &str,
        answers: &[Answer],
    ) -> impl Future<Output = Result<Vec<GradeResult>, ClientError>> + Send;
}

pub trait StudyPlanGenerator: Send + Sync {
    fn submit(
        &self,
        session_id: &str,
        payload: &SubmitDiagnosticRequest,
    ) -> impl Future<Output = Result<SubmissionReceipt, ClientError>> + Send;
}

pub trait StudyPlanService: Send + Sync {
    fn fetch_plan(&self) -> impl Future<Output = Result<Option<StudyPlan>, ClientError>> + Send;

    fn update_task_status(
        &self,
        task_id: &str,
        status: TaskStatus,
    ) -> impl Future<Output = Result<StudyTask, ClientError>> + Send;

    fn record_study_time(
        &self,
        task_id: &str,
        seconds: u64,
    ) -> impl Future<Output = Result<StudyTask, ClientError>> + Send;
}

impl<T: QuestionBank> QuestionBank for Arc<T> {
    fn start_session(&self) -> impl Future<Output = Result<DiagnosticSessionView, ClientError>> + Send {
        (**self).start_session()
    }
}

impl<T: ScoringAuthority> ScoringAuthority for Arc<T> {
    fn grade(
        &self,
        session_id: &str,
        answers: &[Answer],
    ) -> impl Future<Output = Result<Vec<GradeResult>, ClientError>> + Send {
        (**self).grade(session_id, answers)
    }
}

impl<T: StudyPlanGenerator> StudyPlanGenerator for Arc<T> {
    fn submit(
        &self,
        session_id: &str,
        payload: &SubmitDiagnosticRequest,
    ) -> impl Future<Output = Result<SubmissionReceipt, ClientError>> + Send {
        (**self).submit(session_id, payload)
    }
}

impl<T: StudyPlanService> StudyPlanService for Arc<T> {
    fn fetch_plan(&self) -> impl Future<Output = Result<Option<StudyPlan>, ClientError>> + Send {
        (**self).fetch_plan()
    }

    fn update_task_status(
        &self,
        task_id: &str,
        status: TaskStatus,
    ) -> impl Future<Output = Result<StudyTask, ClientError>> + Send {
        (**self).update_task_status(task_id, status)
    }

    fn record_study_time(
        &self,
        task_id: &str,
        seconds: u64,
    ) -> impl Future<Output = Result<StudyTask, ClientError>> + Send {
        (**self).record_study_time(task_id, seconds)
    }
}
