use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use super::domain::{
    AnswerInput, AnswerResponse, CandidateCompletion, CandidateId, CandidateRecord, FitLabel,
    FormAnswer, FormInput, PersistedAnswer, SubmissionResult,
};
use super::evaluation::{self, EvaluationConfig, EvaluationEngine, EvaluationOutcome};
use super::questionnaire::Questionnaire;
use super::repository::{
    AnswerStore, AssessmentNotification, CandidateStore, NotificationKind, NotificationSink,
    QuestionSource, StoreError,
};
use super::validation::{
    parse_question_id, sanitize_candidate, validate_answer_for, validate_complete_form,
    FormRejection,
};

/// Orchestrates a submission: validation, candidate creation, answer rows,
/// scoring, and the compensating delete when answer storage fails.
pub struct SubmissionCoordinator<Q, C, A, N> {
    pub(super) questions: Arc<Q>,
    pub(super) candidates: Arc<C>,
    pub(super) answers: Arc<A>,
    notifications: Arc<N>,
    engine: Arc<EvaluationEngine>,
}

impl<Q, C, A, N> SubmissionCoordinator<Q, C, A, N>
where
    Q: QuestionSource + 'static,
    C: CandidateStore + 'static,
    A: AnswerStore + 'static,
    N: NotificationSink + 'static,
{
    pub fn new(
        questions: Arc<Q>,
        candidates: Arc<C>,
        answers: Arc<A>,
        notifications: Arc<N>,
        config: EvaluationConfig,
    ) -> Self {
        Self {
            questions,
            candidates,
            answers,
            notifications,
            engine: Arc::new(EvaluationEngine::new(config)),
        }
    }

    pub fn questionnaire(&self) -> Result<Questionnaire, StoreError> {
        self.questions.active_questionnaire()
    }

    /// Submit a completed form. Every failure is folded into the result.
    pub fn submit(&self, form: FormInput) -> SubmissionResult {
        self.try_submit(form).unwrap_or_else(SubmissionResult::from)
    }

    /// Submit a completed form, keeping the failure category visible so HTTP
    /// callers can pick a status code.
    pub fn try_submit(&self, form: FormInput) -> Result<SubmissionResult, SubmissionError> {
        let questionnaire = self
            .questions
            .active_questionnaire()
            .map_err(|source| {
                error!(error = %source, "failed to load active questionnaire");
                SubmissionError::Persistence {
                    stage: PersistenceStage::LoadQuestionnaire,
                    source,
                }
            })?;

        validate_complete_form(&form, questionnaire.total_questions()).map_err(|rejection| {
            debug!(message = %rejection.message, "form rejected");
            SubmissionError::from(rejection)
        })?;

        let candidate = sanitize_candidate(&form.candidate);
        let answers = score_answers(&questionnaire, &form.answers)?;

        let record = self.candidates.create(candidate).map_err(|err| match err {
            StoreError::DuplicateEmail => {
                info!("submission rejected for duplicate email");
                SubmissionError::DuplicateEmail
            }
            source => {
                error!(error = %source, "failed to create candidate");
                SubmissionError::Persistence {
                    stage: PersistenceStage::CreateCandidate,
                    source,
                }
            }
        })?;

        let rows = expand_answers(&record.id, &answers);

        let outcome = match self.engine.evaluate(&answers) {
            Ok(outcome) => outcome,
            Err(violation) => {
                error!(candidate_id = %record.id, %violation, "aggregate score out of bounds");
                self.compensate(&record.id);
                return Err(SubmissionError::Consistency {
                    total: violation.total,
                    max: violation.max,
                });
            }
        };

        if let Err(source) = self.answers.insert_batch(rows) {
            error!(candidate_id = %record.id, error = %source, "failed to store answers");
            self.compensate(&record.id);
            return Err(SubmissionError::Persistence {
                stage: PersistenceStage::InsertAnswers,
                source,
            });
        }

        let completion = CandidateCompletion {
            fit_score: outcome.total_score,
            fit_label: outcome.fit_label,
            completed_at: Utc::now(),
        };
        if let Err(err) = self.candidates.update(&record.id, completion) {
            // The answers are stored; the result still reports the computed score.
            warn!(
                candidate_id = %record.id,
                error = %err,
                "failed to store fit score on candidate"
            );
        }

        info!(
            candidate_id = %record.id,
            fit_score = outcome.total_score,
            fit_label = %outcome.fit_label,
            "assessment submitted"
        );
        self.announce(&record, &outcome);

        Ok(SubmissionResult::completed(
            record.id,
            outcome.total_score,
            outcome.fit_label,
        ))
    }

    /// Best-effort delete of a candidate created earlier in the same submission.
    fn compensate(&self, id: &CandidateId) {
        match self.candidates.delete(id) {
            Ok(()) => info!(candidate_id = %id, "rolled back candidate after failed submission"),
            Err(err) => error!(
                candidate_id = %id,
                error = %err,
                "compensating delete failed, unscored candidate left behind"
            ),
        }
    }

    fn announce(&self, record: &CandidateRecord, outcome: &EvaluationOutcome) {
        let mut kinds = vec![NotificationKind::FormCompleted];
        if outcome.fit_label == FitLabel::HighestFit {
            kinds.push(NotificationKind::HighScoreAchieved);
        }

        for kind in kinds {
            let notification = AssessmentNotification {
                kind,
                candidate_id: record.id,
                candidate_name: record.name.clone(),
                fit_score: outcome.total_score,
                fit_label: outcome.fit_label,
            };
            if let Err(err) = self.notifications.notify(notification) {
                warn!(
                    candidate_id = %record.id,
                    kind = kind.label(),
                    error = %err,
                    "notification dispatch failed"
                );
            }
        }
    }
}

/// Validate each answer against its question and replace the provisional
/// score with the authoritative one. All problems are collected.
pub(crate) fn score_answers(
    questionnaire: &Questionnaire,
    inputs: &[AnswerInput],
) -> Result<Vec<FormAnswer>, SubmissionError> {
    let mut errors = Vec::new();
    let mut answers = Vec::with_capacity(inputs.len());
    let mut seen = HashSet::new();

    for (index, input) in inputs.iter().enumerate() {
        let position = index + 1;
        let question = parse_question_id(&input.question_id)
            .ok()
            .and_then(|id| questionnaire.question(&id));

        let Some(question) = question else {
            errors.push(format!(
                "Answer {position} - question_id: question is not part of the active questionnaire"
            ));
            continue;
        };

        if !seen.insert(question.id) {
            errors.push(format!(
                "Answer {position} - question_id: question answered more than once"
            ));
            continue;
        }

        match validate_answer_for(question, input) {
            Ok(mut answer) => {
                let score = evaluation::score_response(question, &answer.response);
                if score != answer.score {
                    debug!(
                        question_id = %question.id,
                        provided = answer.score,
                        computed = score,
                        "replacing provisional answer score"
                    );
                }
                answer.score = score;
                answers.push(answer);
            }
            Err(field_errors) => errors.extend(
                field_errors
                    .iter()
                    .map(|error| format!("Answer {position} - {error}")),
            ),
        }
    }

    if !errors.is_empty() {
        return Err(SubmissionError::Validation {
            message: "Some answers are invalid".to_string(),
            errors,
        });
    }

    Ok(answers)
}

/// Turn scored answers into storage rows. A multiple-choice answer with `k`
/// selections becomes `k` rows, each carrying `round(score / k)`.
pub fn expand_answers(candidate_id: &CandidateId, answers: &[FormAnswer]) -> Vec<PersistedAnswer> {
    let mut rows = Vec::with_capacity(answers.len());

    for answer in answers {
        match &answer.response {
            AnswerResponse::MultipleChoice { alternative_ids } if !alternative_ids.is_empty() => {
                let share = (f64::from(answer.score) / alternative_ids.len() as f64).round() as u32;
                rows.extend(alternative_ids.iter().map(|alternative_id| PersistedAnswer {
                    candidate_id: *candidate_id,
                    question_id: answer.question_id,
                    alternative_id: Some(*alternative_id),
                    text_answer: None,
                    score: share,
                }));
            }
            AnswerResponse::MultipleChoice { .. } => {}
            AnswerResponse::SingleChoice { alternative_id } => rows.push(PersistedAnswer {
                candidate_id: *candidate_id,
                question_id: answer.question_id,
                alternative_id: Some(*alternative_id),
                text_answer: None,
                score: answer.score,
            }),
            AnswerResponse::OpenText { text } => rows.push(PersistedAnswer {
                candidate_id: *candidate_id,
                question_id: answer.question_id,
                alternative_id: None,
                text_answer: Some(text.clone()),
                score: answer.score,
            }),
        }
    }

    rows
}

/// Storage step that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistenceStage {
    LoadQuestionnaire,
    CreateCandidate,
    InsertAnswers,
}

impl fmt::Display for PersistenceStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            PersistenceStage::LoadQuestionnaire => "load the questionnaire",
            PersistenceStage::CreateCandidate => "create the candidate",
            PersistenceStage::InsertAnswers => "store the answers",
        };
        f.write_str(stage)
    }
}

/// Error raised by the submission workflow.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("{message}")]
    Validation {
        message: String,
        errors: Vec<String>,
    },
    #[error("email already used")]
    DuplicateEmail,
    #[error("failed to {stage}: {source}")]
    Persistence {
        stage: PersistenceStage,
        #[source]
        source: StoreError,
    },
    #[error("aggregate score {total} outside 0..={max}")]
    Consistency { total: u64, max: u32 },
}

impl From<FormRejection> for SubmissionError {
    fn from(rejection: FormRejection) -> Self {
        SubmissionError::Validation {
            message: rejection.message,
            errors: rejection.errors,
        }
    }
}

impl From<SubmissionError> for SubmissionResult {
    fn from(error: SubmissionError) -> Self {
        match error {
            SubmissionError::Validation { message, errors } => {
                SubmissionResult::rejected(message, errors)
            }
            SubmissionError::DuplicateEmail => SubmissionResult::failed(
                "This email has already been used. Try a different email.",
            ),
            SubmissionError::Persistence { stage, .. } => SubmissionResult::failed(match stage {
                PersistenceStage::LoadQuestionnaire => {
                    "Failed to load the questionnaire. Try again later."
                }
                PersistenceStage::CreateCandidate => {
                    "Failed to save candidate data. Check the data and try again."
                }
                PersistenceStage::InsertAnswers => "Failed to save answers. Try again.",
            }),
            SubmissionError::Consistency { .. } => {
                SubmissionResult::failed("Invalid total score.")
            }
        }
    }
}
