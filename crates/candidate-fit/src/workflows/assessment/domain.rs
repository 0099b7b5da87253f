use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier wrapper for questionnaire questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(pub Uuid);

/// Identifier wrapper for the selectable alternatives of a choice question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlternativeId(pub Uuid);

/// Identifier wrapper for stored candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(pub Uuid);

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for AlternativeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Questionnaire categories. Each non-empty category becomes one intake step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionCategory {
    Performance,
    Energy,
    Culture,
}

impl QuestionCategory {
    pub const fn ordered() -> [Self; 3] {
        [Self::Performance, Self::Energy, Self::Culture]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Performance => "Performance",
            Self::Energy => "Energy",
            Self::Culture => "Culture",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Performance => "Professional performance and delivery habits",
            Self::Energy => "Motivation and energy under sustained demand",
            Self::Culture => "Values and collaboration style",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    SingleChoice,
    MultipleChoice,
    OpenText,
}

impl QuestionType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::SingleChoice => "single_choice",
            Self::MultipleChoice => "multiple_choice",
            Self::OpenText => "open_text",
        }
    }
}

/// Selectable option carrying the points awarded when chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alternative {
    pub id: AlternativeId,
    pub question_id: QuestionId,
    pub text: String,
    pub value: i32,
    pub order_index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub category: QuestionCategory,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub order_index: u32,
    pub is_active: bool,
    #[serde(default)]
    pub alternatives: Vec<Alternative>,
}

impl Question {
    pub fn alternative(&self, id: &AlternativeId) -> Option<&Alternative> {
        self.alternatives
            .iter()
            .find(|alternative| &alternative.id == id)
    }
}

/// Identity fields exactly as the candidate typed them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Partial update applied while the candidate fills in the personal step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CandidatePatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// The typed response to a question. Which variant is valid is decided by the
/// owning question's declared type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnswerResponse {
    SingleChoice { alternative_id: AlternativeId },
    MultipleChoice { alternative_ids: Vec<AlternativeId> },
    OpenText { text: String },
}

impl AnswerResponse {
    pub const fn kind(&self) -> QuestionType {
        match self {
            Self::SingleChoice { .. } => QuestionType::SingleChoice,
            Self::MultipleChoice { .. } => QuestionType::MultipleChoice,
            Self::OpenText { .. } => QuestionType::OpenText,
        }
    }
}

/// In-memory answer collected during the interview, with its provisional score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormAnswer {
    pub question_id: QuestionId,
    pub response: AnswerResponse,
    pub score: u32,
}

/// Alternative selection as it arrives on the wire: one id or a list of ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AlternativeSelection {
    One(String),
    Many(Vec<String>),
}

/// Unvalidated answer payload. Validation turns it into a [`FormAnswer`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerInput {
    pub question_id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<QuestionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative_id: Option<AlternativeSelection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_answer: Option<String>,
    /// Client-side score. Advisory only; submissions are rescored.
    #[serde(default)]
    pub score: f64,
}

impl From<&FormAnswer> for AnswerInput {
    fn from(answer: &FormAnswer) -> Self {
        let (alternative_id, text_answer) = match &answer.response {
            AnswerResponse::SingleChoice { alternative_id } => (
                Some(AlternativeSelection::One(alternative_id.to_string())),
                None,
            ),
            AnswerResponse::MultipleChoice { alternative_ids } => (
                Some(AlternativeSelection::Many(
                    alternative_ids.iter().map(ToString::to_string).collect(),
                )),
                None,
            ),
            AnswerResponse::OpenText { text } => (None, Some(text.clone())),
        };

        Self {
            question_id: answer.question_id.to_string(),
            kind: Some(answer.response.kind()),
            alternative_id,
            text_answer,
            score: f64::from(answer.score),
        }
    }
}

/// Complete intake payload: personal details plus one answer per active question.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormInput {
    pub candidate: CandidateDetails,
    pub answers: Vec<AnswerInput>,
}

/// Qualitative band derived from the aggregate fit score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FitLabel {
    #[serde(rename = "out of profile")]
    OutOfProfile,
    #[serde(rename = "questionable fit")]
    QuestionableFit,
    #[serde(rename = "approved fit")]
    ApprovedFit,
    #[serde(rename = "highest fit")]
    HighestFit,
}

impl FitLabel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::OutOfProfile => "out of profile",
            Self::QuestionableFit => "questionable fit",
            Self::ApprovedFit => "approved fit",
            Self::HighestFit => "highest fit",
        }
    }
}

impl fmt::Display for FitLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Stored candidate row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub id: CandidateId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub fit_score: Option<u32>,
    pub fit_label: Option<FitLabel>,
}

impl CandidateRecord {
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

/// Fields written to the candidate once the submission is scored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateCompletion {
    pub fit_score: u32,
    pub fit_label: FitLabel,
    pub completed_at: DateTime<Utc>,
}

/// Normalized answer row. Multiple-choice answers produce one row per selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedAnswer {
    pub candidate_id: CandidateId,
    pub question_id: QuestionId,
    pub alternative_id: Option<AlternativeId>,
    pub text_answer: Option<String>,
    pub score: u32,
}

/// Outcome reported to whoever submitted the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate_id: Option<CandidateId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fit_score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fit_label: Option<FitLabel>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl SubmissionResult {
    pub fn completed(candidate_id: CandidateId, fit_score: u32, fit_label: FitLabel) -> Self {
        Self {
            success: true,
            candidate_id: Some(candidate_id),
            fit_score: Some(fit_score),
            fit_label: Some(fit_label),
            message: "Form submitted successfully.".to_string(),
            errors: None,
        }
    }

    pub fn rejected(message: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            success: false,
            candidate_id: None,
            fit_score: None,
            fit_label: None,
            message: message.into(),
            errors: if errors.is_empty() { None } else { Some(errors) },
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::rejected(message, Vec::new())
    }
}
