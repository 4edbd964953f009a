//! Wire types shared by the HTTP routes and the typed client.

use prep_algo::{LearningStyle, QuestionFormat, SubjectScore};
use serde::{Deserialize, Serialize};

// ========== Question bank ==========

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticQuestion {
    pub id: String,
    pub text: String,
    pub options: Vec<String>,
    pub subject: String,
    pub format: QuestionFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_ref: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticSessionView {
    pub session_id: String,
    pub question_set: String,
    pub questions: Vec<DiagnosticQuestion>,
}

// ========== Answers & grading ==========

/// One answer; `format` and `subject` are copied from the question.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub question_id: String,
    pub selected_option: usize,
    pub format: QuestionFormat,
    pub subject: String,
}

impl Answer {
    pub fn for_question(question: &DiagnosticQuestion, selected_option: usize) -> Self {
        Self {
            question_id: question.id.clone(),
            selected_option,
            format: question.format,
            subject: question.subject.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeRequest {
    pub answers: Vec<Answer>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeResult {
    pub question_id: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeResponse {
    pub results: Vec<GradeResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitDiagnosticRequest {
    pub answers: Vec<Answer>,
    pub learning_style: LearningStyle,
}

// ========== Study plan ==========

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskCadence {
    Daily,
    Weekly,
}

impl TaskCadence {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
        }
    }

    pub fn from_db_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "WEEKLY" => Self::Weekly,
            _ => Self::Daily,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
        }
    }

    pub fn from_db_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "IN_PROGRESS" => Self::InProgress,
            "COMPLETED" => Self::Completed,
            _ => Self::Pending,
        }
    }
}

/// Kind of study material a task points the learner at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudyMaterial {
    DiagramWalkthrough,
    AudioLesson,
    WrittenSummary,
    HandsOnPractice,
    PracticeTest,
}

impl StudyMaterial {
    pub fn for_style(style: LearningStyle) -> Self {
        match style {
            LearningStyle::Visual => Self::DiagramWalkthrough,
            LearningStyle::Auditory => Self::AudioLesson,
            LearningStyle::ReadingWriting => Self::WrittenSummary,
            LearningStyle::Kinesthetic => Self::HandsOnPractice,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DiagramWalkthrough => "diagram_walkthrough",
            Self::AudioLesson => "audio_lesson",
            Self::WrittenSummary => "written_summary",
            Self::HandsOnPractice => "hands_on_practice",
            Self::PracticeTest => "practice_test",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "diagram_walkthrough" => Some(Self::DiagramWalkthrough),
            "audio_lesson" => Some(Self::AudioLesson),
            "written_summary" => Some(Self::WrittenSummary),
            "hands_on_practice" => Some(Self::HandsOnPractice),
            "practice_test" => Some(Self::PracticeTest),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyTask {
    pub id: String,
    pub cadence: TaskCadence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week_index: Option<u32>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub material: StudyMaterial,
    pub status: TaskStatus,
    pub time_spent_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyPlan {
    pub id: String,
    pub session_id: String,
    pub learning_style: LearningStyle,
    pub tasks: Vec<StudyTask>,
    pub progress_percent: f64,
    pub created_at: String,
    pub updated_at: String,
}

impl StudyPlan {
    pub fn daily_tasks(&self) -> impl Iterator<Item = &StudyTask> {
        self.tasks.iter().filter(|t| t.cadence == TaskCadence::Daily)
    }

    pub fn weekly_tasks(&self) -> impl Iterator<Item = &StudyTask> {
        self.tasks.iter().filter(|t| t.cadence == TaskCadence::Weekly)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanProgress {
    pub completed: u32,
    pub total: u32,
    pub progress_percent: f64,
}

impl PlanProgress {
    pub fn from_statuses<'a, I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = &'a TaskStatus>,
    {
        let (completed, total) = statuses.into_iter().fold((0u32, 0u32), |(done, all), s| {
            (done + u32::from(*s == TaskStatus::Completed), all + 1)
        });
        let progress_percent = if total == 0 {
            0.0
        } else {
            (completed as f64 / total as f64 * 100.0 * 100.0).round() / 100.0
        };
        Self {
            completed,
            total,
            progress_percent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub plan: StudyPlan,
    pub subject_breakdown: Vec<SubjectScore>,
    pub learning_style: LearningStyle,
    pub replayed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskStatusRequest {
    pub status: TaskStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordStudyTimeRequest {
    pub seconds: u64,
}

// ========== Learning profile ==========

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProfileSource {
    Diagnostic,
    Manual,
}

impl ProfileSource {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            Self::Diagnostic => "DIAGNOSTIC",
            Self::Manual => "MANUAL",
        }
    }

    pub fn from_db_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "MANUAL" => Self::Manual,
            _ => Self::Diagnostic,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningProfile {
    pub learning_style: LearningStyle,
    pub source: ProfileSource,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetLearningStyleRequest {
    pub learning_style: LearningStyle,
}
