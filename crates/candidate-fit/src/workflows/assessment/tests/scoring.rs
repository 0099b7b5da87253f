use super::common::*;
use crate::workflows::assessment::domain::{
    AlternativeId, AnswerResponse, FitLabel, FormAnswer, QuestionCategory, QuestionType,
};
use crate::workflows::assessment::evaluation::{
    classify, is_within_ceiling, max_score_for, score_answer, score_response, EvaluationConfig,
    EvaluationEngine, Selection,
};
use crate::workflows::assessment::questionnaire::Questionnaire;

#[test]
fn single_choice_scores_the_selected_alternative_value() {
    let question = choice_question(
        1,
        QuestionCategory::Performance,
        QuestionType::SingleChoice,
        &[0, 1, 37, 99, 100],
    );

    for (index, alternative) in question.alternatives.iter().enumerate() {
        let score = score_answer(
            QuestionType::SingleChoice,
            Some(Selection::Single(&alternative.id)),
            &question.alternatives,
            None,
        );
        assert_eq!(score, alternative.value as u32, "alternative {index}");
    }
}

#[test]
fn single_choice_with_unknown_alternative_scores_zero() {
    let question = choice_question(
        1,
        QuestionCategory::Performance,
        QuestionType::SingleChoice,
        &[70],
    );
    let stranger = alternative_id(9, 1);

    let score = score_answer(
        QuestionType::SingleChoice,
        Some(Selection::Single(&stranger)),
        &question.alternatives,
        None,
    );
    assert_eq!(score, 0);
}

#[test]
fn out_of_range_alternative_values_score_zero() {
    let question = choice_question(
        1,
        QuestionCategory::Performance,
        QuestionType::SingleChoice,
        &[150, -10],
    );

    for alternative in &question.alternatives {
        let response = AnswerResponse::SingleChoice {
            alternative_id: alternative.id,
        };
        assert_eq!(score_response(&question, &response), 0);
    }
}

#[test]
fn multiple_choice_sums_and_caps_at_fifty() {
    let question = choice_question(
        2,
        QuestionCategory::Energy,
        QuestionType::MultipleChoice,
        &[30, 40, 5, 10],
    );
    let ids: Vec<_> = question.alternatives.iter().map(|alt| alt.id).collect();

    let under_cap = score_answer(
        QuestionType::MultipleChoice,
        Some(Selection::Multiple(&ids[2..4])),
        &question.alternatives,
        None,
    );
    assert_eq!(under_cap, 15);

    let capped = score_answer(
        QuestionType::MultipleChoice,
        Some(Selection::Multiple(&ids[0..2])),
        &question.alternatives,
        None,
    );
    assert_eq!(capped, 50);
}

#[test]
fn invalid_multiple_choice_selections_score_zero() {
    let question = choice_question(
        2,
        QuestionCategory::Energy,
        QuestionType::MultipleChoice,
        &[10, 20],
    );
    let first = question.alternatives[0].id;

    let none: [AlternativeId; 0] = [];
    let empty = score_answer(
        QuestionType::MultipleChoice,
        Some(Selection::Multiple(&none)),
        &question.alternatives,
        None,
    );
    assert_eq!(empty, 0);

    let duplicated = [first, first];
    let score = score_answer(
        QuestionType::MultipleChoice,
        Some(Selection::Multiple(&duplicated)),
        &question.alternatives,
        None,
    );
    assert_eq!(score, 0);
}

#[test]
fn open_text_is_scored_by_trimmed_length_tiers() {
    let cases = [
        (String::new(), 0),
        ("   nine ch   ".to_string(), 0),
        ("123456789".to_string(), 0),
        ("1234567890".to_string(), 5),
        ("a".repeat(49), 5),
        ("a".repeat(50), 8),
        ("a".repeat(99), 8),
        ("a".repeat(100), 10),
        ("a".repeat(1000), 10),
    ];

    for (text, expected) in cases {
        let score = score_answer(QuestionType::OpenText, None, &[], Some(text.as_str()));
        assert_eq!(score, expected, "length {}", text.trim().len());
    }
}

#[test]
fn mismatched_or_missing_inputs_score_zero() {
    let question = choice_question(
        1,
        QuestionCategory::Performance,
        QuestionType::SingleChoice,
        &[70],
    );
    let id = question.alternatives[0].id;
    let ids = [id];

    assert_eq!(
        score_answer(QuestionType::SingleChoice, None, &question.alternatives, None),
        0
    );
    assert_eq!(
        score_answer(
            QuestionType::SingleChoice,
            Some(Selection::Multiple(&ids)),
            &question.alternatives,
            None
        ),
        0
    );
    assert_eq!(
        score_answer(
            QuestionType::MultipleChoice,
            Some(Selection::Single(&id)),
            &question.alternatives,
            None
        ),
        0
    );
}

#[test]
fn per_type_ceilings_hold_for_scored_answers() {
    assert_eq!(max_score_for(QuestionType::SingleChoice), 100);
    assert_eq!(max_score_for(QuestionType::MultipleChoice), 50);
    assert_eq!(max_score_for(QuestionType::OpenText), 10);
    assert!(is_within_ceiling(50, QuestionType::MultipleChoice));
    assert!(!is_within_ceiling(51, QuestionType::MultipleChoice));
}

#[test]
fn classify_respects_band_boundaries() {
    assert_eq!(classify(200), FitLabel::HighestFit);
    assert_eq!(classify(80), FitLabel::HighestFit);
    assert_eq!(classify(79), FitLabel::ApprovedFit);
    assert_eq!(classify(60), FitLabel::ApprovedFit);
    assert_eq!(classify(59), FitLabel::QuestionableFit);
    assert_eq!(classify(40), FitLabel::QuestionableFit);
    assert_eq!(classify(39), FitLabel::OutOfProfile);
    assert_eq!(classify(0), FitLabel::OutOfProfile);
}

#[test]
fn fit_labels_serialize_as_their_display_text() {
    let json = serde_json::to_string(&FitLabel::QuestionableFit).expect("serialize label");
    assert_eq!(json, "\"questionable fit\"");
    assert_eq!(FitLabel::HighestFit.to_string(), "highest fit");
}

#[test]
fn engine_totals_components_and_classifies() {
    let engine = EvaluationEngine::new(EvaluationConfig::default());
    let answers = vec![
        FormAnswer {
            question_id: question_id(1),
            response: AnswerResponse::SingleChoice {
                alternative_id: alternative_id(1, 1),
            },
            score: 45,
        },
        FormAnswer {
            question_id: question_id(3),
            response: AnswerResponse::OpenText {
                text: "a considered answer".to_string(),
            },
            score: 5,
        },
    ];

    let outcome = engine.evaluate(&answers).expect("within bounds");
    assert_eq!(outcome.total_score, 50);
    assert_eq!(outcome.fit_label, FitLabel::QuestionableFit);
    assert_eq!(outcome.components.len(), 2);
}

#[test]
fn engine_rejects_totals_above_the_configured_ceiling() {
    let engine = EvaluationEngine::new(EvaluationConfig {
        max_total_score: 60,
    });
    let answers = vec![FormAnswer {
        question_id: question_id(1),
        response: AnswerResponse::SingleChoice {
            alternative_id: alternative_id(1, 1),
        },
        score: 70,
    }];

    let violation = engine.evaluate(&answers).expect_err("above ceiling");
    assert_eq!(violation.total, 70);
    assert_eq!(violation.max, 60);
}

#[test]
fn standard_questionnaire_maximum_stays_within_default_ceiling() {
    let questionnaire = Questionnaire::standard();
    let maximum: u32 = questionnaire
        .questions()
        .map(|question| match question.kind {
            QuestionType::SingleChoice => question
                .alternatives
                .iter()
                .map(|alt| alt.value as u32)
                .max()
                .unwrap_or(0),
            QuestionType::MultipleChoice => question
                .alternatives
                .iter()
                .map(|alt| alt.value as u32)
                .sum::<u32>()
                .min(max_score_for(QuestionType::MultipleChoice)),
            QuestionType::OpenText => max_score_for(QuestionType::OpenText),
        })
        .sum();

    assert!(maximum <= EvaluationConfig::default().max_total_score);
}

#[test]
fn questionnaire_orders_categories_and_drops_inactive_questions() {
    let mut retired = open_question(7, QuestionCategory::Energy);
    retired.is_active = false;
    let questionnaire = Questionnaire::from_questions(vec![
        open_question(5, QuestionCategory::Culture),
        retired,
        choice_question(
            4,
            QuestionCategory::Performance,
            QuestionType::SingleChoice,
            &[10],
        ),
        open_question(2, QuestionCategory::Culture),
    ]);

    let categories: Vec<_> = questionnaire
        .steps()
        .iter()
        .map(|step| step.category)
        .collect();
    assert_eq!(
        categories,
        vec![QuestionCategory::Performance, QuestionCategory::Culture]
    );

    let culture: Vec<_> = questionnaire.steps()[1]
        .questions
        .iter()
        .map(|question| question.id)
        .collect();
    assert_eq!(culture, vec![question_id(2), question_id(5)]);
    assert_eq!(questionnaire.total_questions(), 3);
}
