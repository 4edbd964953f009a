use prep_algo::ClassifierError;
use thiserror::Error;

use crate::client::ClientError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiagnosticError {
    #[error("not enough scorable answers to infer a learning style")]
    InsufficientData,
    #[error("submission failed: {0}")]
    SubmissionNetwork(String),
    #[error("submission rejected ({code}): {message}")]
    SubmissionRejected { code: String, message: String },
    #[error("diagnostic could not be loaded: {0}")]
    QuestionLoad(String),
    #[error("a submission is already in flight")]
    SubmissionInFlight,
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },
    #[error("option {index} does not exist, the question has {available} options")]
    InvalidOption { index: usize, available: usize },
}

/// What the screen hosting the flow should offer after an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    RetrySubmission,
    ReturnToPreviousScreen,
    Acknowledge,
}

impl DiagnosticError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::SubmissionNetwork(_))
    }

    pub fn recovery(&self) -> RecoveryAction {
        match self {
            Self::SubmissionNetwork(_) => RecoveryAction::RetrySubmission,
            Self::QuestionLoad(_) | Self::InsufficientData => RecoveryAction::ReturnToPreviousScreen,
            Self::SubmissionRejected { .. }
            | Self::SubmissionInFlight
            | Self::InvalidTransition { .. }
            | Self::InvalidOption { .. } => RecoveryAction::Acknowledge,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::InsufficientData => {
                "We need at least one answered question to tailor your plan.".to_string()
            }
            Self::SubmissionNetwork(_) => {
                "We couldn't reach the server. Your answers are saved, try submitting again."
                    .to_string()
            }
            Self::SubmissionRejected { message, .. } => {
                format!("Your diagnostic could not be accepted: {message}")
            }
            Self::QuestionLoad(_) => {
                "The diagnostic is unavailable right now. Please go back and try later.".to_string()
            }
            Self::SubmissionInFlight => "Your answers are already being submitted.".to_string(),
            Self::InvalidTransition { .. } => "That action isn't available right now.".to_string(),
            Self::InvalidOption { .. } => "Please pick one of the listed options.".to_string(),
        }
    }

    /// Map a transport error raised while grading or submitting.
    pub(crate) fn from_submission(err: ClientError) -> Self {
        match err {
            ClientError::Network(message) | ClientError::Decode(message) => {
                Self::SubmissionNetwork(message)
            }
            ClientError::Rejected { code, message, .. } if code == "SUBMISSION_IN_PROGRESS" => {
                Self::SubmissionNetwork(message)
            }
            ClientError::Rejected { code, message, .. } => Self::SubmissionRejected { code, message },
            ClientError::Unauthorized => Self::SubmissionRejected {
                code: "UNAUTHORIZED".to_string(),
                message: "session expired, please sign in again".to_string(),
            },
        }
    }
}

impl From<ClassifierError> for DiagnosticError {
    fn from(err: ClassifierError) -> Self {
        match err {
            ClassifierError::InsufficientData => Self::InsufficientData,
            other => Self::SubmissionRejected {
                code: "INVALID_ANSWERS".to_string(),
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovery_actions() {
        assert_eq!(
            DiagnosticError::SubmissionNetwork("timeout".into()).recovery(),
            RecoveryAction::RetrySubmission
        );
        assert_eq!(
            DiagnosticError::QuestionLoad("empty".into()).recovery(),
            RecoveryAction::ReturnToPreviousScreen
        );
        assert_eq!(
            DiagnosticError::SubmissionRejected {
                code: "SUBMISSION_REJECTED".into(),
                message: "bad".into()
            }
            .recovery(),
            RecoveryAction::Acknowledge
        );
    }

    #[test]
    fn test_only_network_errors_retry() {
        assert!(DiagnosticError::SubmissionNetwork("x".into()).is_retryable());
        assert!(!DiagnosticError::InsufficientData.is_retryable());
        assert!(!DiagnosticError::SubmissionInFlight.is_retryable());
    }

    #[test]
    fn test_client_error_mapping() {
        assert!(DiagnosticError::from_submission(ClientError::Network("reset".into())).is_retryable());
        let in_progress = ClientError::Rejected {
            status: 409,
            code: "SUBMISSION_IN_PROGRESS".into(),
            message: "busy".into(),
        };
        assert!(DiagnosticError::from_submission(in_progress).is_retryable());
        let duplicate = ClientError::Rejected {
            status: 409,
            code: "DUPLICATE_SUBMISSION".into(),
            message: "dup".into(),
        };
        assert!(matches!(
            DiagnosticError::from_submission(duplicate),
            DiagnosticError::SubmissionRejected { code, .. } if code == "DUPLICATE_SUBMISSION"
        ));
    }

    #[test]
    fn test_messages_never_empty() {
        let errors = [
            DiagnosticError::InsufficientData,
            DiagnosticError::SubmissionInFlight,
            DiagnosticError::QuestionLoad("x".into()),
            DiagnosticError::InvalidOption { index: 4, available: 4 },
        ];
        for err in errors {
            assert!(!err.user_message().is_empty());
        }
    }
}
