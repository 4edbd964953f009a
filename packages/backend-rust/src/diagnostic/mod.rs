//! Client-side diagnostic: the question-by-question flow and study timers.

pub mod error;
pub mod flow;
pub mod timer;

pub use error::{DiagnosticError, RecoveryAction};
pub use flow::{DiagnosticFlow, FlowProgress, FlowState};
pub use timer::{spawn_study_time_uploader, StudyTimeEntry, StudyTimer, TimerGuard, TimerSink};
