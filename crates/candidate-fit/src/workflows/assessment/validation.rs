//! Shape, length, and range checks for candidate identity and answers.
//!
//! Every check collects all failing fields instead of stopping at the first
//! one, so callers can render an itemized error list.

use std::collections::HashSet;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use super::domain::{
    AlternativeId, AlternativeSelection, AnswerInput, AnswerResponse, CandidateDetails, FormAnswer,
    FormInput, Question, QuestionId, QuestionType,
};

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 255;
pub const EMAIL_MAX_CHARS: usize = 255;
pub const PHONE_MAX_CHARS: usize = 20;
pub const PHONE_MIN_DIGITS: usize = 10;
pub const PHONE_MAX_DIGITS: usize = 11;
pub const OPEN_TEXT_MIN_CHARS: usize = 10;
pub const OPEN_TEXT_MAX_CHARS: usize = 1000;
pub const MAX_SELECTIONS: usize = 10;
pub const MAX_FORM_ANSWERS: usize = 50;

static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-ZÀ-ÿ\s]+$").expect("Invalid candidate name regex"));

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@(?:[A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
        .expect("Invalid email regex")
});

static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9\s()+\-]+$").expect("Invalid phone regex"));

/// A single failed check, addressed by a dotted field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError {
            path: path.into(),
            message: message.into(),
        });
    }

    /// Re-root every path under `prefix`, e.g. `email` becomes `candidate.email`.
    pub fn nest(self, prefix: &str) -> Self {
        Self(
            self.0
                .into_iter()
                .map(|error| FieldError {
                    path: format!("{prefix}.{}", error.path),
                    message: error.message,
                })
                .collect(),
        )
    }

    pub fn extend(&mut self, other: FieldErrors) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn has_path(&self, path: &str) -> bool {
        self.0.iter().any(|error| error.path == path)
    }

    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }

    fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.messages().join("; "))
    }
}

impl std::error::Error for FieldErrors {}

/// Whole-form rejection: a summary message plus the itemized field errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormRejection {
    pub message: String,
    pub errors: Vec<String>,
}

/// Validate the identity fields, returning the trimmed details with a
/// lower-cased email.
pub fn validate_candidate(details: &CandidateDetails) -> Result<CandidateDetails, FieldErrors> {
    let mut errors = FieldErrors::default();

    let name = details.name.trim();
    let name_chars = name.chars().count();
    if name_chars < NAME_MIN_CHARS {
        errors.push(
            "name",
            format!("name must have at least {NAME_MIN_CHARS} characters"),
        );
    } else if name_chars > NAME_MAX_CHARS {
        errors.push(
            "name",
            format!("name must have at most {NAME_MAX_CHARS} characters"),
        );
    } else if !NAME_PATTERN.is_match(name) {
        errors.push("name", "name must contain only letters and spaces");
    }

    let email = details.email.trim();
    if email.chars().count() > EMAIL_MAX_CHARS {
        errors.push(
            "email",
            format!("email must have at most {EMAIL_MAX_CHARS} characters"),
        );
    } else if !is_valid_email(email) {
        errors.push("email", "invalid email address");
    }

    let phone = details.phone.as_str();
    if !PHONE_PATTERN.is_match(phone) {
        errors.push(
            "phone",
            "phone may only contain digits, spaces, and ( ) - + characters",
        );
    } else if phone.chars().count() > PHONE_MAX_CHARS {
        errors.push(
            "phone",
            format!("phone must have at most {PHONE_MAX_CHARS} characters"),
        );
    } else {
        let digits = digits_only(phone).len();
        if !(PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digits) {
            errors.push(
                "phone",
                format!("phone must have between {PHONE_MIN_DIGITS} and {PHONE_MAX_DIGITS} digits"),
            );
        }
    }

    errors.into_result(CandidateDetails {
        name: name.to_string(),
        email: email.to_lowercase(),
        phone: details.phone.clone(),
    })
}

/// Normalize identity fields for storage. Applying it twice changes nothing.
pub fn sanitize_candidate(details: &CandidateDetails) -> CandidateDetails {
    CandidateDetails {
        name: details.name.trim().to_string(),
        email: details.email.trim().to_lowercase(),
        phone: digits_only(&details.phone),
    }
}

pub fn is_valid_email(email: &str) -> bool {
    !email.starts_with('.') && !email.contains("..") && EMAIL_PATTERN.is_match(email)
}

pub(crate) fn digits_only(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Validate an answer whose question is not at hand: the declared `type` wins,
/// otherwise the type is inferred from the populated field.
pub fn validate_answer(input: &AnswerInput) -> Result<FormAnswer, FieldErrors> {
    match input.kind.or_else(|| infer_kind(input)) {
        Some(kind) => validate_answer_as(input, kind),
        None => {
            let mut errors = FieldErrors::default();
            validate_common(input, &mut errors);
            errors.push(
                "alternative_id",
                "answer must select an alternative or provide text",
            );
            Err(errors)
        }
    }
}

/// Validate an answer against the question it belongs to, using the
/// question's declared type.
pub fn validate_answer_for(
    question: &Question,
    input: &AnswerInput,
) -> Result<FormAnswer, FieldErrors> {
    let mut errors = FieldErrors::default();

    if let Some(declared) = input.kind {
        if declared != question.kind {
            errors.push(
                "type",
                format!(
                    "answer declared as {} but question is {}",
                    declared.label(),
                    question.kind.label()
                ),
            );
        }
    }

    if let Ok(question_id) = parse_question_id(&input.question_id) {
        if question_id != question.id {
            errors.push("question_id", "answer does not belong to this question");
        }
    }

    match validate_answer_as(input, question.kind) {
        Ok(answer) => errors.into_result(answer),
        Err(shape_errors) => {
            errors.extend(shape_errors);
            Err(errors)
        }
    }
}

/// Check a multiple-choice selection: non-empty, at most `max`, no duplicates.
pub fn validate_multiple_choice_limit(ids: &[AlternativeId], max: usize) -> Result<(), String> {
    if ids.is_empty() {
        return Err("at least one option must be selected".to_string());
    }

    if ids.len() > max {
        return Err(format!("at most {max} options are allowed"));
    }

    let unique: HashSet<&AlternativeId> = ids.iter().collect();
    if unique.len() != ids.len() {
        return Err("duplicate options detected".to_string());
    }

    Ok(())
}

/// Validate the whole intake payload and require exactly one answer per
/// active question.
pub fn validate_complete_form(
    form: &FormInput,
    expected_answer_count: usize,
) -> Result<(), FormRejection> {
    let mut errors = FieldErrors::default();

    if let Err(candidate_errors) = validate_candidate(&form.candidate) {
        errors.extend(candidate_errors.nest("candidate"));
    }

    if form.answers.is_empty() {
        errors.push("answers", "at least one answer is required");
    } else if form.answers.len() > MAX_FORM_ANSWERS {
        errors.push(
            "answers",
            format!("at most {MAX_FORM_ANSWERS} answers are allowed"),
        );
    }

    for (index, answer) in form.answers.iter().enumerate() {
        if let Err(answer_errors) = validate_answer(answer) {
            errors.extend(answer_errors.nest(&format!("answers.{index}")));
        }
    }

    if !errors.is_empty() {
        return Err(FormRejection {
            message: "Invalid form data".to_string(),
            errors: errors.messages(),
        });
    }

    if form.answers.len() != expected_answer_count {
        return Err(FormRejection {
            message: format!(
                "Expected {expected_answer_count} answers, received {}",
                form.answers.len()
            ),
            errors: Vec::new(),
        });
    }

    Ok(())
}

pub(crate) fn parse_question_id(raw: &str) -> Result<QuestionId, uuid::Error> {
    Uuid::parse_str(raw.trim()).map(QuestionId)
}

fn infer_kind(input: &AnswerInput) -> Option<QuestionType> {
    match (&input.alternative_id, &input.text_answer) {
        (Some(AlternativeSelection::Many(_)), _) => Some(QuestionType::MultipleChoice),
        (Some(AlternativeSelection::One(_)), _) => Some(QuestionType::SingleChoice),
        (None, Some(_)) => Some(QuestionType::OpenText),
        (None, None) => None,
    }
}

fn validate_common(input: &AnswerInput, errors: &mut FieldErrors) -> Option<QuestionId> {
    if !input.score.is_finite() || input.score < 0.0 {
        errors.push("score", "score must not be negative");
    }

    match parse_question_id(&input.question_id) {
        Ok(id) => Some(id),
        Err(_) => {
            errors.push("question_id", "question id must be a valid UUID");
            None
        }
    }
}

fn validate_answer_as(input: &AnswerInput, kind: QuestionType) -> Result<FormAnswer, FieldErrors> {
    let mut errors = FieldErrors::default();
    let question_id = validate_common(input, &mut errors);

    let response = match kind {
        QuestionType::SingleChoice => single_choice_response(input, &mut errors),
        QuestionType::MultipleChoice => multiple_choice_response(input, &mut errors),
        QuestionType::OpenText => open_text_response(input, &mut errors),
    };

    match (question_id, response) {
        (Some(question_id), Some(response)) if errors.is_empty() => Ok(FormAnswer {
            question_id,
            response,
            score: input.score.round() as u32,
        }),
        _ => Err(errors),
    }
}

fn single_choice_response(input: &AnswerInput, errors: &mut FieldErrors) -> Option<AnswerResponse> {
    if input.text_answer.is_some() {
        errors.push("text_answer", "single choice answers must not include text");
    }

    match &input.alternative_id {
        Some(AlternativeSelection::One(raw)) => match parse_alternative_id(raw) {
            Some(alternative_id) => Some(AnswerResponse::SingleChoice { alternative_id }),
            None => {
                errors.push("alternative_id", "alternative id must be a valid UUID");
                None
            }
        },
        Some(AlternativeSelection::Many(_)) => {
            errors.push(
                "alternative_id",
                "single choice answers take exactly one alternative",
            );
            None
        }
        None => {
            errors.push("alternative_id", "an alternative must be selected");
            None
        }
    }
}

fn multiple_choice_response(
    input: &AnswerInput,
    errors: &mut FieldErrors,
) -> Option<AnswerResponse> {
    if input.text_answer.is_some() {
        errors.push(
            "text_answer",
            "multiple choice answers must not include text",
        );
    }

    let raw_ids = match &input.alternative_id {
        Some(AlternativeSelection::Many(raw_ids)) => raw_ids,
        Some(AlternativeSelection::One(_)) => {
            errors.push(
                "alternative_id",
                "multiple choice answers take a list of alternatives",
            );
            return None;
        }
        None => {
            errors.push("alternative_id", "at least one alternative must be selected");
            return None;
        }
    };

    let mut alternative_ids = Vec::with_capacity(raw_ids.len());
    let mut malformed = false;
    for (index, raw) in raw_ids.iter().enumerate() {
        match parse_alternative_id(raw) {
            Some(id) => alternative_ids.push(id),
            None => {
                malformed = true;
                errors.push(
                    format!("alternative_id.{index}"),
                    "alternative id must be a valid UUID",
                );
            }
        }
    }

    if malformed {
        return None;
    }

    if let Err(message) = validate_multiple_choice_limit(&alternative_ids, MAX_SELECTIONS) {
        errors.push("alternative_id", message);
        return None;
    }

    Some(AnswerResponse::MultipleChoice { alternative_ids })
}

fn open_text_response(input: &AnswerInput, errors: &mut FieldErrors) -> Option<AnswerResponse> {
    if input.alternative_id.is_some() {
        errors.push(
            "alternative_id",
            "open text answers must not select an alternative",
        );
    }

    let Some(text) = &input.text_answer else {
        errors.push("text_answer", "an answer text is required");
        return None;
    };

    // Padding does not count toward the minimum but does count toward the maximum.
    if text.trim().chars().count() < OPEN_TEXT_MIN_CHARS {
        errors.push(
            "text_answer",
            format!("answer must have at least {OPEN_TEXT_MIN_CHARS} characters"),
        );
        return None;
    }
    if text.chars().count() > OPEN_TEXT_MAX_CHARS {
        errors.push(
            "text_answer",
            format!("answer must have at most {OPEN_TEXT_MAX_CHARS} characters"),
        );
        return None;
    }

    Some(AnswerResponse::OpenText { text: text.clone() })
}

fn parse_alternative_id(raw: &str) -> Option<AlternativeId> {
    Uuid::parse_str(raw.trim()).ok().map(AlternativeId)
}
