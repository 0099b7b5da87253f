//! Candidate fit assessment: questionnaire steps, answer validation, scoring,
//! classification, and the submission workflow that persists the result.

pub mod boundary;
pub mod domain;
pub mod evaluation;
pub mod questionnaire;
pub mod repository;
pub mod router;
pub mod service;
pub mod session;
pub mod validation;

#[cfg(test)]
mod tests;

pub use boundary::{RecordAnswersError, RecordAnswersRequest, RecordedAnswer, RecordedScore};
pub use domain::{
    Alternative, AlternativeId, AlternativeSelection, AnswerInput, AnswerResponse,
    CandidateCompletion, CandidateDetails, CandidateId, CandidatePatch, CandidateRecord, FitLabel,
    FormAnswer, FormInput, PersistedAnswer, Question, QuestionCategory, QuestionId, QuestionType,
    SubmissionResult,
};
pub use evaluation::{
    classify, score_answer, score_response, EvaluationConfig, EvaluationEngine, EvaluationOutcome,
    ScoreOutOfRange, Selection,
};
pub use questionnaire::{CategoryStep, Questionnaire};
pub use repository::{
    AnswerStore, AssessmentNotification, CandidateStore, NotificationError, NotificationKind,
    NotificationSink, QuestionSource, StoreError,
};
pub use router::assessment_router;
pub use service::{expand_answers, PersistenceStage, SubmissionCoordinator, SubmissionError};
pub use session::{FormSession, SessionError};
pub use validation::{
    sanitize_candidate, validate_answer, validate_candidate, validate_complete_form,
    validate_multiple_choice_limit, FieldError, FieldErrors, FormRejection,
};
