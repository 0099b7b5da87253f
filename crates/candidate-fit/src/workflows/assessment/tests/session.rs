use super::common::*;
use crate::workflows::assessment::domain::{AnswerResponse, CandidatePatch, QuestionId};
use crate::workflows::assessment::session::{FormSession, SessionError};

fn session_with_candidate() -> FormSession {
    let mut session = FormSession::new(questionnaire());
    let details = candidate();
    session.update_candidate_info(CandidatePatch {
        name: Some(details.name),
        email: Some(details.email),
        phone: Some(details.phone),
    });
    session
}

fn answer_everything(session: &mut FormSession) {
    session
        .update_answer(
            question_id(1),
            AnswerResponse::SingleChoice {
                alternative_id: alternative_id(1, 1),
            },
        )
        .expect("known question");
    session
        .update_answer(
            question_id(2),
            AnswerResponse::MultipleChoice {
                alternative_ids: vec![alternative_id(2, 1)],
            },
        )
        .expect("known question");
    session
        .update_answer(
            question_id(3),
            AnswerResponse::OpenText {
                text: "I talk it through calmly.".to_string(),
            },
        )
        .expect("known question");
}

#[test]
fn new_session_starts_on_personal_step() {
    let session = FormSession::new(questionnaire());

    assert_eq!(session.current_step(), 0);
    assert_eq!(session.total_steps(), 4);
    assert_eq!(session.total_questions(), 3);
    assert!(session.category_step(0).is_none());
    assert!(!session.can_proceed());
}

#[test]
fn next_step_is_blocked_until_the_current_step_completes() {
    let mut session = FormSession::new(questionnaire());

    assert!(!session.next_step());
    assert_eq!(session.current_step(), 0);

    session.update_candidate_info(CandidatePatch {
        name: Some("Ana Silva".to_string()),
        ..CandidatePatch::default()
    });
    assert!(!session.next_step(), "email and phone still missing");
    assert_eq!(session.current_step(), 0);

    session.update_candidate_info(CandidatePatch {
        email: Some("ana@x.com".to_string()),
        phone: Some("11988887777".to_string()),
        ..CandidatePatch::default()
    });
    assert!(session.next_step());
    assert_eq!(session.current_step(), 1);

    assert!(!session.next_step(), "step 1 question unanswered");
    assert_eq!(session.current_step(), 1);
}

#[test]
fn prev_step_is_allowed_regardless_of_completeness() {
    let mut session = session_with_candidate();
    assert!(session.next_step());
    assert!(!session.can_proceed());

    assert!(session.prev_step());
    assert_eq!(session.current_step(), 0);
    assert!(!session.prev_step(), "cannot go back from the first step");
    assert_eq!(session.current_step(), 0);
}

#[test]
fn navigation_stops_at_the_terminal_step() {
    let mut session = session_with_candidate();
    answer_everything(&mut session);

    while session.next_step() {}

    assert_eq!(session.current_step(), 3);
    assert!(session.is_terminal());
    assert!(session.can_proceed());
    assert!(!session.next_step());
    assert_eq!(session.current_step(), 3);
}

#[test]
fn update_answer_rescores_against_the_question() {
    let mut session = session_with_candidate();

    let capped = session
        .update_answer(
            question_id(2),
            AnswerResponse::MultipleChoice {
                alternative_ids: vec![alternative_id(2, 3), alternative_id(2, 4)],
            },
        )
        .expect("known question");
    assert_eq!(capped, 50);

    let rescored = session
        .update_answer(
            question_id(2),
            AnswerResponse::MultipleChoice {
                alternative_ids: vec![alternative_id(2, 2)],
            },
        )
        .expect("known question");
    assert_eq!(rescored, 20);
    assert_eq!(
        session.answer(&question_id(2)).map(|answer| answer.score),
        Some(20)
    );
}

#[test]
fn update_answer_rejects_unknown_questions() {
    let mut session = session_with_candidate();
    let stranger = QuestionId(uuid::Uuid::nil());

    let error = session
        .update_answer(
            stranger,
            AnswerResponse::OpenText {
                text: "irrelevant text".to_string(),
            },
        )
        .expect_err("unknown question");
    assert_eq!(error, SessionError::UnknownQuestion(stranger));
}

#[test]
fn short_open_text_leaves_its_step_incomplete() {
    let mut session = session_with_candidate();
    session
        .update_answer(
            question_id(3),
            AnswerResponse::OpenText {
                text: "   brief   ".to_string(),
            },
        )
        .expect("known question");

    assert!(!session.is_step_completed(3));
    assert!(!session.is_step_completed(9), "out of range steps are never complete");
}

#[test]
fn mismatched_response_shape_leaves_step_incomplete() {
    let mut session = session_with_candidate();
    let score = session
        .update_answer(
            question_id(1),
            AnswerResponse::OpenText {
                text: "this is not a choice".to_string(),
            },
        )
        .expect("known question");

    assert_eq!(score, 0);
    assert!(!session.is_step_completed(1));
}

#[test]
fn validate_current_step_lists_every_problem() {
    let mut session = FormSession::new(questionnaire());
    let personal = session.validate_current_step();
    assert_eq!(personal.len(), 3);

    let mut session_on_questions = session_with_candidate();
    assert!(session_on_questions.next_step());
    let errors = session_on_questions.validate_current_step();
    assert_eq!(errors, vec!["Question \"Question 1\" must be answered".to_string()]);

    session.update_candidate_info(CandidatePatch {
        name: Some("Ana".to_string()),
        email: Some("ana@x.com".to_string()),
        phone: Some("11988887777".to_string()),
    });
    assert!(session.validate_current_step().is_empty());
}

#[test]
fn form_input_follows_questionnaire_order() {
    let mut session = session_with_candidate();
    answer_everything(&mut session);

    let form = session.to_form_input();
    let order: Vec<_> = form
        .answers
        .iter()
        .map(|answer| answer.question_id.clone())
        .collect();
    assert_eq!(
        order,
        vec![
            question_id(1).to_string(),
            question_id(2).to_string(),
            question_id(3).to_string(),
        ]
    );
    assert!(session.is_form_valid().is_ok());
}

#[test]
fn incomplete_form_is_invalid() {
    let mut session = session_with_candidate();
    session
        .update_answer(
            question_id(1),
            AnswerResponse::SingleChoice {
                alternative_id: alternative_id(1, 2),
            },
        )
        .expect("known question");

    let rejection = session.is_form_valid().expect_err("two answers missing");
    assert_eq!(rejection.message, "Expected 3 answers, received 1");
}
