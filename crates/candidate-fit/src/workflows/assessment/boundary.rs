//! Alternate entry point that records pre-scored answers for an existing
//! candidate.
//!
//! Unlike [`SubmissionCoordinator::try_submit`], the total here is the flat sum
//! of the provided scores: the multiple-choice cap and open-text tiers are not
//! reapplied.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::domain::{AlternativeId, CandidateCompletion, CandidateId, FitLabel, PersistedAnswer};
use super::evaluation::classify;
use super::repository::{
    AnswerStore, CandidateStore, NotificationSink, QuestionSource, StoreError,
};
use super::service::SubmissionCoordinator;
use super::validation::parse_question_id;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordAnswersRequest {
    pub candidate_id: String,
    #[serde(default)]
    pub answers: Vec<RecordedAnswer>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedAnswer {
    pub question_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_value: Option<String>,
    pub score: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedScore {
    pub success: bool,
    pub total_score: u32,
    pub fit_label: FitLabel,
}

#[derive(Debug, thiserror::Error)]
pub enum RecordAnswersError {
    #[error("invalid submission data: {0}")]
    Invalid(String),
    #[error("candidate not found")]
    CandidateNotFound,
    #[error("candidate already completed the assessment")]
    AlreadyCompleted,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl<Q, C, A, N> SubmissionCoordinator<Q, C, A, N>
where
    Q: QuestionSource + 'static,
    C: CandidateStore + 'static,
    A: AnswerStore + 'static,
    N: NotificationSink + 'static,
{
    /// Store one row per provided answer and complete the candidate with the
    /// flat sum of the provided scores.
    pub fn record_answers(
        &self,
        request: RecordAnswersRequest,
    ) -> Result<RecordedScore, RecordAnswersError> {
        if request.answers.is_empty() {
            return Err(RecordAnswersError::Invalid(
                "at least one answer is required".to_string(),
            ));
        }

        let candidate_id = Uuid::parse_str(request.candidate_id.trim())
            .map(CandidateId)
            .map_err(|_| RecordAnswersError::Invalid("candidate id must be a UUID".to_string()))?;

        let candidate = self
            .candidates
            .fetch(&candidate_id)?
            .ok_or(RecordAnswersError::CandidateNotFound)?;
        if candidate.is_completed() {
            warn!(%candidate_id, "refusing to rescore a completed candidate");
            return Err(RecordAnswersError::AlreadyCompleted);
        }

        let mut rows = Vec::with_capacity(request.answers.len());
        let mut total: u64 = 0;
        for (index, answer) in request.answers.into_iter().enumerate() {
            let position = index + 1;
            let question_id = parse_question_id(&answer.question_id).map_err(|_| {
                RecordAnswersError::Invalid(format!(
                    "answer {position}: question id must be a UUID"
                ))
            })?;
            let alternative_id = answer
                .alternative_id
                .as_deref()
                .map(|raw| Uuid::parse_str(raw.trim()).map(AlternativeId))
                .transpose()
                .map_err(|_| {
                    RecordAnswersError::Invalid(format!(
                        "answer {position}: alternative id must be a UUID"
                    ))
                })?;
            let score = u32::try_from(answer.score).map_err(|_| {
                RecordAnswersError::Invalid(format!(
                    "answer {position}: score must be a non-negative integer"
                ))
            })?;

            total += u64::from(score);
            rows.push(PersistedAnswer {
                candidate_id,
                question_id,
                alternative_id,
                text_answer: answer.text_value,
                score,
            });
        }

        let total_score = u32::try_from(total)
            .map_err(|_| RecordAnswersError::Invalid("total score overflow".to_string()))?;
        let fit_label = classify(total_score);

        self.answers.insert_batch(rows)?;
        self.candidates.update(
            &candidate_id,
            CandidateCompletion {
                fit_score: total_score,
                fit_label,
                completed_at: Utc::now(),
            },
        )?;

        info!(%candidate_id, total_score, %fit_label, "recorded pre-scored answers");

        Ok(RecordedScore {
            success: true,
            total_score,
            fit_label,
        })
    }
}
