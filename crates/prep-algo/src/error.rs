use thiserror::Error;

use crate::types::QuestionFormat;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifierError {
    #[error("insufficient data: no scorable answers in any format")]
    InsufficientData,
    #[error("format {0} is not part of the diagnostic question set")]
    UnknownFormat(QuestionFormat),
    #[error("format {format} already holds {capacity} answers, the number of {format} questions")]
    TallyOverflow {
        format: QuestionFormat,
        capacity: u32,
    },
}
