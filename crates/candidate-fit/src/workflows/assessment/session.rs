//! Step-by-step intake state.
//!
//! Step 0 collects personal details; steps `1..=N` map to the questionnaire's
//! category steps in order. Forward navigation requires the current step to be
//! complete, backward navigation is always allowed except from step 0.

use std::collections::HashMap;

use super::domain::{
    AnswerInput, AnswerResponse, CandidateDetails, CandidatePatch, FormAnswer, FormInput,
    QuestionId,
};
use super::evaluation::score_response;
use super::questionnaire::{CategoryStep, Questionnaire};
use super::validation::{
    validate_answer_for, validate_candidate, validate_complete_form, FormRejection,
    OPEN_TEXT_MIN_CHARS,
};

#[derive(Debug, Clone)]
pub struct FormSession {
    questionnaire: Questionnaire,
    candidate: CandidateDetails,
    answers: HashMap<QuestionId, FormAnswer>,
    current_step: usize,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("question {0} is not part of this questionnaire")]
    UnknownQuestion(QuestionId),
}

impl FormSession {
    pub fn new(questionnaire: Questionnaire) -> Self {
        Self {
            questionnaire,
            candidate: CandidateDetails::default(),
            answers: HashMap::new(),
            current_step: 0,
        }
    }

    pub fn questionnaire(&self) -> &Questionnaire {
        &self.questionnaire
    }

    pub fn candidate(&self) -> &CandidateDetails {
        &self.candidate
    }

    pub fn answer(&self, question_id: &QuestionId) -> Option<&FormAnswer> {
        self.answers.get(question_id)
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    /// Personal details plus one step per category.
    pub fn total_steps(&self) -> usize {
        self.questionnaire.steps().len() + 1
    }

    pub fn total_questions(&self) -> usize {
        self.questionnaire.total_questions()
    }

    pub fn is_terminal(&self) -> bool {
        self.current_step + 1 >= self.total_steps()
    }

    /// Category step shown at `step`, `None` for the personal step.
    pub fn category_step(&self, step: usize) -> Option<&CategoryStep> {
        step.checked_sub(1)
            .and_then(|index| self.questionnaire.step(index))
    }

    pub fn update_candidate_info(&mut self, patch: CandidatePatch) {
        if let Some(name) = patch.name {
            self.candidate.name = name;
        }
        if let Some(email) = patch.email {
            self.candidate.email = email;
        }
        if let Some(phone) = patch.phone {
            self.candidate.phone = phone;
        }
    }

    /// Store a response and rescore it. A response whose shape does not fit
    /// the question is kept but scores zero and leaves its step incomplete.
    pub fn update_answer(
        &mut self,
        question_id: QuestionId,
        response: AnswerResponse,
    ) -> Result<u32, SessionError> {
        let question = self
            .questionnaire
            .question(&question_id)
            .ok_or(SessionError::UnknownQuestion(question_id))?;

        let score = score_response(question, &response);
        self.answers.insert(
            question_id,
            FormAnswer {
                question_id,
                response,
                score,
            },
        );
        Ok(score)
    }

    pub fn is_step_completed(&self, step: usize) -> bool {
        if step == 0 {
            return validate_candidate(&self.candidate).is_ok();
        }

        let Some(category) = self.category_step(step) else {
            return false;
        };

        category.questions.iter().all(|question| {
            let Some(answer) = self.answers.get(&question.id) else {
                return false;
            };
            if validate_answer_for(question, &AnswerInput::from(answer)).is_err() {
                return false;
            }
            match &answer.response {
                AnswerResponse::OpenText { text } => {
                    text.trim().chars().count() >= OPEN_TEXT_MIN_CHARS
                }
                AnswerResponse::MultipleChoice { alternative_ids } => !alternative_ids.is_empty(),
                AnswerResponse::SingleChoice { .. } => true,
            }
        })
    }

    pub fn can_proceed(&self) -> bool {
        self.is_step_completed(self.current_step)
    }

    /// Advance one step. Returns whether the step changed.
    pub fn next_step(&mut self) -> bool {
        if self.is_terminal() || !self.can_proceed() {
            return false;
        }
        self.current_step += 1;
        true
    }

    /// Go back one step. Returns whether the step changed.
    pub fn prev_step(&mut self) -> bool {
        if self.current_step == 0 {
            return false;
        }
        self.current_step -= 1;
        true
    }

    /// Itemized problems blocking the current step.
    pub fn validate_current_step(&self) -> Vec<String> {
        if self.current_step == 0 {
            return match validate_candidate(&self.candidate) {
                Ok(_) => Vec::new(),
                Err(errors) => errors.messages(),
            };
        }

        let Some(category) = self.category_step(self.current_step) else {
            return Vec::new();
        };

        let mut errors = Vec::new();
        for question in &category.questions {
            match self.answers.get(&question.id) {
                None => errors.push(format!("Question \"{}\" must be answered", question.title)),
                Some(answer) => {
                    if let Err(field_errors) =
                        validate_answer_for(question, &AnswerInput::from(answer))
                    {
                        errors.extend(field_errors.iter().map(|error| {
                            format!("Question \"{}\" - {}", question.title, error.message)
                        }));
                    }
                }
            }
        }
        errors
    }

    /// Answers in questionnaire order, ready for submission.
    pub fn to_form_input(&self) -> FormInput {
        FormInput {
            candidate: self.candidate.clone(),
            answers: self
                .questionnaire
                .questions()
                .filter_map(|question| self.answers.get(&question.id))
                .map(AnswerInput::from)
                .collect(),
        }
    }

    pub fn is_form_valid(&self) -> Result<(), FormRejection> {
        validate_complete_form(&self.to_form_input(), self.total_questions())
    }
}
