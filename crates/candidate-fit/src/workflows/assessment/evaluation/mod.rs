mod config;
mod policy;
mod rules;

pub use config::{EvaluationConfig, DEFAULT_MAX_TOTAL_SCORE};
pub use policy::{
    classify, APPROVED_FIT_THRESHOLD, HIGHEST_FIT_THRESHOLD, QUESTIONABLE_FIT_THRESHOLD,
};
pub use rules::{
    MULTIPLE_CHOICE_CAP, OPEN_TEXT_FULL_SCORE, OPEN_TEXT_MEDIUM_SCORE, OPEN_TEXT_SHORT_SCORE,
};

use super::domain::{
    Alternative, AlternativeId, AnswerResponse, FitLabel, FormAnswer, Question, QuestionId,
    QuestionType,
};
use serde::{Deserialize, Serialize};

/// Alternative selection handed to [`score_answer`].
#[derive(Debug, Clone, Copy)]
pub enum Selection<'a> {
    Single(&'a AlternativeId),
    Multiple(&'a [AlternativeId]),
}

/// Score one answer. Pure: a selection or text that does not fit `kind`
/// scores zero.
pub fn score_answer(
    kind: QuestionType,
    selection: Option<Selection<'_>>,
    alternatives: &[Alternative],
    text: Option<&str>,
) -> u32 {
    if selection.is_none() && text.is_none() {
        return 0;
    }

    match (kind, selection) {
        (QuestionType::SingleChoice, Some(Selection::Single(id))) => {
            rules::single_choice(id, alternatives)
        }
        (QuestionType::MultipleChoice, Some(Selection::Multiple(ids))) => {
            rules::multiple_choice(ids, alternatives)
        }
        (QuestionType::OpenText, _) => text.map(rules::open_text).unwrap_or(0),
        _ => 0,
    }
}

/// Score a typed response against the question it answers.
pub fn score_response(question: &Question, response: &AnswerResponse) -> u32 {
    let (selection, text) = match response {
        AnswerResponse::SingleChoice { alternative_id } => {
            (Some(Selection::Single(alternative_id)), None)
        }
        AnswerResponse::MultipleChoice { alternative_ids } => {
            (Some(Selection::Multiple(alternative_ids.as_slice())), None)
        }
        AnswerResponse::OpenText { text } => (None, Some(text.as_str())),
    };

    score_answer(question.kind, selection, &question.alternatives, text)
}

/// Per-answer ceiling for each question type.
pub const fn max_score_for(kind: QuestionType) -> u32 {
    match kind {
        QuestionType::SingleChoice => 100,
        QuestionType::MultipleChoice => MULTIPLE_CHOICE_CAP,
        QuestionType::OpenText => OPEN_TEXT_FULL_SCORE,
    }
}

pub fn is_within_ceiling(score: u32, kind: QuestionType) -> bool {
    score <= max_score_for(kind)
}

/// Stateless evaluator that totals scored answers and classifies the result.
pub struct EvaluationEngine {
    config: EvaluationConfig,
}

impl EvaluationEngine {
    pub fn new(config: EvaluationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Sum the per-answer scores and classify the total.
    pub fn evaluate(&self, answers: &[FormAnswer]) -> Result<EvaluationOutcome, ScoreOutOfRange> {
        let components: Vec<ScoreComponent> = answers
            .iter()
            .map(|answer| ScoreComponent {
                question_id: answer.question_id,
                kind: answer.response.kind(),
                score: answer.score,
            })
            .collect();

        let total: u64 = components
            .iter()
            .map(|component| u64::from(component.score))
            .sum();

        let max = self.config.max_total_score;
        let total_score = u32::try_from(total)
            .ok()
            .filter(|total| *total <= max)
            .ok_or(ScoreOutOfRange { total, max })?;

        Ok(EvaluationOutcome {
            total_score,
            fit_label: classify(total_score),
            components,
        })
    }
}

/// One answer's contribution to the total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub question_id: QuestionId,
    pub kind: QuestionType,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationOutcome {
    pub total_score: u32,
    pub fit_label: FitLabel,
    pub components: Vec<ScoreComponent>,
}

/// Aggregate score fell outside the configured bounds.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("aggregate score {total} outside 0..={max}")]
pub struct ScoreOutOfRange {
    pub total: u64,
    pub max: u32,
}
