//! Diagnostic state machine.
//!
//! ```text
//! NotStarted ──start──▶ InProgress(0) ──answer──▶ … ──last answer──▶ AwaitingSubmission
//!      │                                                                  │
//!      └──load error──▶ LoadFailed                        submit ok ◀─────┤────▶ submit err
//!                                                          Submitted          Failed ──retry──┐
//!                                                                              ▲              │
//!                                                                              └──────────────┘
//! ```
//!
//! Grading goes to the scoring authority; the learning style is derived
//! locally from the graded answers and sent along with them. The payload is
//! built once, so a retry re-sends the exact same body and the server can
//! treat it as the same submission.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use prep_algo::{classify, FormatOutcome};

use crate::client::{QuestionBank, ScoringAuthority, StudyPlanGenerator};
use crate::diagnostic::error::DiagnosticError;
use crate::models::{
    Answer, DiagnosticQuestion, DiagnosticSessionView, GradeResult, SubmissionReceipt,
    SubmitDiagnosticRequest,
};

#[derive(Debug, Clone, PartialEq)]
pub enum FlowState {
    NotStarted,
    /// The question set could not be loaded; the flow cannot continue.
    LoadFailed { error: DiagnosticError },
    InProgress { index: usize },
    AwaitingSubmission,
    Submitted { receipt: SubmissionReceipt },
    Failed { error: DiagnosticError },
}

impl FlowState {
    fn name(&self) -> &'static str {
        match self {
            Self::NotStarted => "not started",
            Self::LoadFailed { .. } => "load failed",
            Self::InProgress { .. } => "in progress",
            Self::AwaitingSubmission => "awaiting submission",
            Self::Submitted { .. } => "submitted",
            Self::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowProgress {
    pub answered: usize,
    pub total: usize,
}

struct FlowInner {
    state: FlowState,
    session: Option<DiagnosticSessionView>,
    answers: Vec<Answer>,
    graded: Option<Vec<GradeResult>>,
    payload: Option<SubmitDiagnosticRequest>,
}

pub struct DiagnosticFlow<B> {
    backend: B,
    inner: Mutex<FlowInner>,
    starting: AtomicBool,
    submitting: AtomicBool,
}

/// Clears the in-flight flag on every exit path, including cancellation.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<B> DiagnosticFlow<B>
where
    B: QuestionBank + ScoringAuthority + StudyPlanGenerator,
{
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            inner: Mutex::new(FlowInner {
                state: FlowState::NotStarted,
                session: None,
                answers: Vec::new(),
                graded: None,
                payload: None,
            }),
            starting: AtomicBool::new(false),
            submitting: AtomicBool::new(false),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn state(&self) -> FlowState {
        self.inner.lock().state.clone()
    }

    pub fn answers(&self) -> Vec<Answer> {
        self.inner.lock().answers.clone()
    }

    pub fn session_id(&self) -> Option<String> {
        self.inner.lock().session.as_ref().map(|s| s.session_id.clone())
    }

    pub fn progress(&self) -> FlowProgress {
        let inner = self.inner.lock();
        FlowProgress {
            answered: inner.answers.len(),
            total: inner.session.as_ref().map_or(0, |s| s.questions.len()),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    /// Load the question set. A missing or malformed set moves the flow to
    /// `LoadFailed`. Only one load runs at a time, so a flow opens at most one
    /// server session.
    pub async fn start(&self) -> Result<FlowState, DiagnosticError> {
        let Some(_guard) = InFlightGuard::acquire(&self.starting) else {
            return Err(DiagnosticError::InvalidTransition {
                action: "start",
                state: "loading",
            });
        };
        self.expect_state("start", |s| matches!(s, FlowState::NotStarted))?;

        let loaded = self
            .backend
            .start_session()
            .await
            .map_err(|e| DiagnosticError::QuestionLoad(e.to_string()))
            .and_then(|view| validate_session(&view).map(|_| view));

        let mut inner = self.inner.lock();
        if !matches!(inner.state, FlowState::NotStarted) {
            return Err(DiagnosticError::InvalidTransition {
                action: "start",
                state: inner.state.name(),
            });
        }

        match loaded {
            Ok(view) => {
                tracing::info!(
                    session_id = %view.session_id,
                    questions = view.questions.len(),
                    "diagnostic loaded"
                );
                inner.session = Some(view);
                inner.state = FlowState::InProgress { index: 0 };
                Ok(inner.state.clone())
            }
            Err(error) => {
                tracing::warn!(error = %error, "diagnostic failed to load");
                inner.state = FlowState::LoadFailed {
                    error: error.clone(),
                };
                Err(error)
            }
        }
    }

    pub fn current_question(&self) -> Option<DiagnosticQuestion> {
        let inner = self.inner.lock();
        match inner.state {
            FlowState::InProgress { index } => inner
                .session
                .as_ref()
                .and_then(|s| s.questions.get(index))
                .cloned(),
            _ => None,
        }
    }

    /// Record the answer to the current question and advance.
    pub fn record_answer(&self, option_index: usize) -> Result<FlowState, DiagnosticError> {
        let mut inner = self.inner.lock();
        let FlowState::InProgress { index } = inner.state else {
            return Err(DiagnosticError::InvalidTransition {
                action: "record an answer",
                state: inner.state.name(),
            });
        };

        let (answer, total) = {
            let session = inner.session.as_ref().ok_or(DiagnosticError::InvalidTransition {
                action: "record an answer",
                state: "without a session",
            })?;
            let question = session.questions.get(index).ok_or(DiagnosticError::InvalidTransition {
                action: "record an answer",
                state: "past the last question",
            })?;
            if option_index >= question.options.len() {
                return Err(DiagnosticError::InvalidOption {
                    index: option_index,
                    available: question.options.len(),
                });
            }
            (Answer::for_question(question, option_index), session.questions.len())
        };

        inner.answers.push(answer);
        inner.state = if index + 1 < total {
            FlowState::InProgress { index: index + 1 }
        } else {
            FlowState::AwaitingSubmission
        };
        Ok(inner.state.clone())
    }

    /// Grade, classify and submit. Also the retry entry point from `Failed`.
    pub async fn submit(&self) -> Result<SubmissionReceipt, DiagnosticError> {
        let Some(_guard) = InFlightGuard::acquire(&self.submitting) else {
            return Err(DiagnosticError::SubmissionInFlight);
        };

        self.expect_state("submit", |s| {
            matches!(s, FlowState::AwaitingSubmission | FlowState::Failed { .. })
        })?;

        let result = self.run_submission().await;

        let mut inner = self.inner.lock();
        match &result {
            Ok(receipt) => {
                inner.state = FlowState::Submitted {
                    receipt: receipt.clone(),
                };
            }
            Err(error) => {
                inner.state = FlowState::Failed {
                    error: error.clone(),
                };
            }
        }
        result
    }

    async fn run_submission(&self) -> Result<SubmissionReceipt, DiagnosticError> {
        let (session_id, payload) = match self.cached_payload() {
            Some(cached) => cached,
            None => self.build_payload().await?,
        };

        tracing::info!(
            session_id = %session_id,
            answers = payload.answers.len(),
            learning_style = payload.learning_style.as_str(),
            "submitting diagnostic"
        );

        self.backend
            .submit(&session_id, &payload)
            .await
            .map_err(DiagnosticError::from_submission)
    }

    fn cached_payload(&self) -> Option<(String, SubmitDiagnosticRequest)> {
        let inner = self.inner.lock();
        let session_id = inner.session.as_ref()?.session_id.clone();
        inner.payload.clone().map(|p| (session_id, p))
    }

    async fn build_payload(&self) -> Result<(String, SubmitDiagnosticRequest), DiagnosticError> {
        let (session_id, formats, answers, graded) = {
            let inner = self.inner.lock();
            let session = inner.session.as_ref().ok_or(DiagnosticError::InvalidTransition {
                action: "submit",
                state: "without a session",
            })?;
            (
                session.session_id.clone(),
                session.questions.iter().map(|q| q.format).collect::<Vec<_>>(),
                inner.answers.clone(),
                inner.graded.clone(),
            )
        };

        let graded = match graded {
            Some(graded) => graded,
            None => {
                let graded = self
                    .backend
                    .grade(&session_id, &answers)
                    .await
                    .map_err(DiagnosticError::from_submission)?;
                check_grading(&answers, &graded)?;
                self.inner.lock().graded = Some(graded.clone());
                graded
            }
        };

        let outcomes = answers
            .iter()
            .zip(&graded)
            .map(|(answer, result)| FormatOutcome::new(answer.format, result.is_correct));
        let classification = classify(formats, outcomes)?;

        let payload = SubmitDiagnosticRequest {
            answers,
            learning_style: classification.learning_style,
        };
        self.inner.lock().payload = Some(payload.clone());
        Ok((session_id, payload))
    }

    fn expect_state(
        &self,
        action: &'static str,
        allowed: impl Fn(&FlowState) -> bool,
    ) -> Result<(), DiagnosticError> {
        let inner = self.inner.lock();
        if allowed(&inner.state) {
            Ok(())
        } else {
            Err(DiagnosticError::InvalidTransition {
                action,
                state: inner.state.name(),
            })
        }
    }
}

fn validate_session(view: &DiagnosticSessionView) -> Result<(), DiagnosticError> {
    if view.questions.is_empty() {
        return Err(DiagnosticError::QuestionLoad("question set is empty".to_string()));
    }
    for question in &view.questions {
        if question.text.trim().is_empty() || question.options.len() < 2 {
            return Err(DiagnosticError::QuestionLoad(format!(
                "question {} is malformed",
                question.id
            )));
        }
    }
    Ok(())
}

fn check_grading(answers: &[Answer], graded: &[GradeResult]) -> Result<(), DiagnosticError> {
    let aligned = answers.len() == graded.len()
        && answers
            .iter()
            .zip(graded)
            .all(|(a, g)| a.question_id == g.question_id);
    if aligned {
        Ok(())
    } else {
        Err(DiagnosticError::SubmissionRejected {
            code: "GRADING_MISMATCH".to_string(),
            message: "grading results do not match the submitted answers".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prep_algo::QuestionFormat;

    fn question(id: &str, options: usize) -> DiagnosticQuestion {
        DiagnosticQuestion {
            id: id.into(),
            text: format!("prompt {id}"),
            options: (0..options).map(|i| i.to_string()).collect(),
            subject: "math".into(),
            format: QuestionFormat::Text,
            media_ref: None,
        }
    }

    #[test]
    fn test_validate_session() {
        let ok = DiagnosticSessionView {
            session_id: "s".into(),
            question_set: "set".into(),
            questions: vec![question("q1", 4)],
        };
        assert!(validate_session(&ok).is_ok());

        let empty = DiagnosticSessionView {
            questions: Vec::new(),
            ..ok.clone()
        };
        assert!(matches!(validate_session(&empty), Err(DiagnosticError::QuestionLoad(_))));

        let one_option = DiagnosticSessionView {
            questions: vec![question("q1", 1)],
            ..ok
        };
        assert!(validate_session(&one_option).is_err());
    }

    #[test]
    fn test_check_grading_alignment() {
        let answers = vec![Answer::for_question(&question("q1", 2), 0)];
        let good = vec![GradeResult {
            question_id: "q1".into(),
            is_correct: true,
        }];
        assert!(check_grading(&answers, &good).is_ok());
        assert!(check_grading(&answers, &[]).is_err());
        let wrong = vec![GradeResult {
            question_id: "q2".into(),
            is_correct: true,
        }];
        assert!(check_grading(&answers, &wrong).is_err());
    }

    #[test]
    fn test_in_flight_guard_releases() {
        let flag = AtomicBool::new(false);
        let guard = InFlightGuard::acquire(&flag).unwrap();
        assert!(InFlightGuard::acquire(&flag).is_none());
        drop(guard);
        assert!(InFlightGuard::acquire(&flag).is_some());
    }
}
