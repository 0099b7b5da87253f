use serde::{Deserialize, Serialize};

use super::domain::{
    CandidateCompletion, CandidateDetails, CandidateId, CandidateRecord, FitLabel, PersistedAnswer,
};
use super::questionnaire::Questionnaire;

/// Read side of the question bank.
pub trait QuestionSource: Send + Sync {
    fn active_questionnaire(&self) -> Result<Questionnaire, StoreError>;
}

/// Candidate storage. Email uniqueness is enforced here, not by callers.
pub trait CandidateStore: Send + Sync {
    fn create(&self, candidate: CandidateDetails) -> Result<CandidateRecord, StoreError>;
    fn update(&self, id: &CandidateId, completion: CandidateCompletion) -> Result<(), StoreError>;
    fn delete(&self, id: &CandidateId) -> Result<(), StoreError>;
    fn fetch(&self, id: &CandidateId) -> Result<Option<CandidateRecord>, StoreError>;
}

/// Answer row storage. A batch is written in a single call.
pub trait AnswerStore: Send + Sync {
    fn insert_batch(&self, rows: Vec<PersistedAnswer>) -> Result<(), StoreError>;
}

/// Outbound notification hook (admin inbox, e-mail, chat).
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: AssessmentNotification) -> Result<(), NotificationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("email already used")]
    DuplicateEmail,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    FormCompleted,
    HighScoreAchieved,
}

impl NotificationKind {
    pub const fn label(self) -> &'static str {
        match self {
            NotificationKind::FormCompleted => "form_completed",
            NotificationKind::HighScoreAchieved => "high_score_achieved",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentNotification {
    pub kind: NotificationKind,
    pub candidate_id: CandidateId,
    pub candidate_name: String,
    pub fit_score: u32,
    pub fit_label: FitLabel,
}

impl AssessmentNotification {
    pub fn title(&self) -> String {
        match self.kind {
            NotificationKind::FormCompleted => {
                format!("{} completed the assessment", self.candidate_name)
            }
            NotificationKind::HighScoreAchieved => {
                format!("{} reached {} points", self.candidate_name, self.fit_score)
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
