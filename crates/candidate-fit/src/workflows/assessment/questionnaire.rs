use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::domain::{
    Alternative, AlternativeId, Question, QuestionCategory, QuestionId, QuestionType,
};

/// One intake page: every active question of a single category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStep {
    pub category: QuestionCategory,
    pub title: String,
    pub description: String,
    pub questions: Vec<Question>,
}

/// Active questions grouped into ordered category steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Questionnaire {
    steps: Vec<CategoryStep>,
}

impl Questionnaire {
    /// Group questions by category in fixed category order. Inactive questions
    /// are dropped, questions and alternatives are sorted by `order_index`, and
    /// categories left empty produce no step.
    pub fn from_questions(questions: impl IntoIterator<Item = Question>) -> Self {
        let mut by_category: BTreeMap<QuestionCategory, Vec<Question>> = BTreeMap::new();
        for mut question in questions.into_iter().filter(|question| question.is_active) {
            question
                .alternatives
                .sort_by_key(|alternative| alternative.order_index);
            by_category
                .entry(question.category)
                .or_default()
                .push(question);
        }

        let steps = QuestionCategory::ordered()
            .into_iter()
            .filter_map(|category| {
                let mut questions = by_category.remove(&category)?;
                questions.sort_by_key(|question| question.order_index);
                Some(CategoryStep {
                    category,
                    title: category.label().to_string(),
                    description: category.description().to_string(),
                    questions,
                })
            })
            .collect();

        Self { steps }
    }

    pub fn standard() -> Self {
        Self::from_questions(standard_questions())
    }

    pub fn steps(&self) -> &[CategoryStep] {
        &self.steps
    }

    pub fn step(&self, index: usize) -> Option<&CategoryStep> {
        self.steps.get(index)
    }

    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.steps.iter().flat_map(|step| step.questions.iter())
    }

    pub fn question(&self, id: &QuestionId) -> Option<&Question> {
        self.questions().find(|question| &question.id == id)
    }

    pub fn total_questions(&self) -> usize {
        self.steps.iter().map(|step| step.questions.len()).sum()
    }
}

const SEED_NAMESPACE: u128 = 0x7c1e_52a0_0000_4000_8000_0000_0000_0000;

fn seeded_uuid(n: u128) -> Uuid {
    Uuid::from_u128(SEED_NAMESPACE | n)
}

fn choice_question(
    seq: u128,
    category: QuestionCategory,
    kind: QuestionType,
    title: &str,
    options: &[(&str, i32)],
) -> Question {
    let id = QuestionId(seeded_uuid(seq << 8));
    let alternatives = options
        .iter()
        .enumerate()
        .map(|(index, (text, value))| Alternative {
            id: AlternativeId(seeded_uuid((seq << 8) | (index as u128 + 1))),
            question_id: id,
            text: (*text).to_string(),
            value: *value,
            order_index: index as u32,
        })
        .collect();

    Question {
        id,
        category,
        title: title.to_string(),
        description: None,
        kind,
        order_index: (seq % 16) as u32,
        is_active: true,
        alternatives,
    }
}

fn open_question(seq: u128, category: QuestionCategory, title: &str, hint: &str) -> Question {
    Question {
        id: QuestionId(seeded_uuid(seq << 8)),
        category,
        title: title.to_string(),
        description: Some(hint.to_string()),
        kind: QuestionType::OpenText,
        order_index: (seq % 16) as u32,
        is_active: true,
        alternatives: Vec::new(),
    }
}

// Values are chosen so a perfect candidate stays within the default aggregate
// ceiling of 200.
fn standard_questions() -> Vec<Question> {
    vec![
        choice_question(
            0x11,
            QuestionCategory::Performance,
            QuestionType::SingleChoice,
            "How do you usually handle a deadline that is at risk?",
            &[
                ("I renegotiate scope early and keep stakeholders informed", 40),
                ("I work extra hours to deliver everything as planned", 30),
                ("I deliver what is ready and explain the gap afterwards", 20),
                ("I wait for someone to notice and reprioritize", 5),
            ],
        ),
        choice_question(
            0x12,
            QuestionCategory::Performance,
            QuestionType::MultipleChoice,
            "Which practices do you use to track your own results?",
            &[
                ("Weekly written goals", 15),
                ("Measurable indicators agreed with my lead", 15),
                ("Regular feedback conversations", 10),
                ("Personal task board", 10),
                ("I do not track results", 0),
            ],
        ),
        choice_question(
            0x21,
            QuestionCategory::Energy,
            QuestionType::SingleChoice,
            "How would you describe your energy at the end of a demanding week?",
            &[
                ("Still motivated and already planning the next week", 40),
                ("Tired but satisfied with what was delivered", 25),
                ("Drained and needing a long break", 10),
                ("Frustrated and questioning the work", 0),
            ],
        ),
        open_question(
            0x22,
            QuestionCategory::Energy,
            "Describe a moment when you felt most motivated at work.",
            "Tell us what happened and why it mattered to you.",
        ),
        choice_question(
            0x31,
            QuestionCategory::Culture,
            QuestionType::MultipleChoice,
            "Which values matter most to you in a team?",
            &[
                ("Transparency", 15),
                ("Ownership", 10),
                ("Continuous learning", 10),
                ("Hierarchy and clear command", 5),
                ("Individual recognition above all", 0),
            ],
        ),
        open_question(
            0x32,
            QuestionCategory::Culture,
            "How do you handle a disagreement with a colleague?",
            "Share a concrete example if you can.",
        ),
    ]
}
