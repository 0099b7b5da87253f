use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::workflows::assessment::domain::{
    Alternative, AlternativeId, AlternativeSelection, AnswerInput, CandidateCompletion,
    CandidateDetails, CandidateId, CandidateRecord, FormInput, PersistedAnswer, Question,
    QuestionCategory, QuestionId, QuestionType,
};
use crate::workflows::assessment::questionnaire::Questionnaire;
use crate::workflows::assessment::repository::{
    AnswerStore, AssessmentNotification, CandidateStore, NotificationError, NotificationSink,
    QuestionSource, StoreError,
};
use crate::workflows::assessment::{assessment_router, EvaluationConfig, SubmissionCoordinator};

pub(super) fn question_id(n: u128) -> QuestionId {
    QuestionId(Uuid::from_u128(0x1000 + n))
}

pub(super) fn alternative_id(question: u128, index: u128) -> AlternativeId {
    AlternativeId(Uuid::from_u128(0x1000 + (question << 8) + index))
}

pub(super) fn choice_question(
    n: u128,
    category: QuestionCategory,
    kind: QuestionType,
    values: &[i32],
) -> Question {
    let id = question_id(n);
    Question {
        id,
        category,
        title: format!("Question {n}"),
        description: None,
        kind,
        order_index: n as u32,
        is_active: true,
        alternatives: values
            .iter()
            .enumerate()
            .map(|(index, value)| Alternative {
                id: alternative_id(n, index as u128 + 1),
                question_id: id,
                text: format!("Option {}", index + 1),
                value: *value,
                order_index: index as u32,
            })
            .collect(),
    }
}

pub(super) fn open_question(n: u128, category: QuestionCategory) -> Question {
    Question {
        id: question_id(n),
        category,
        title: format!("Question {n}"),
        description: None,
        kind: QuestionType::OpenText,
        order_index: n as u32,
        is_active: true,
        alternatives: Vec::new(),
    }
}

/// Three steps, one question each: single choice (70/30/0), multiple choice
/// (10/20/30/40), open text.
pub(super) fn questionnaire() -> Questionnaire {
    Questionnaire::from_questions(vec![
        choice_question(
            1,
            QuestionCategory::Performance,
            QuestionType::SingleChoice,
            &[70, 30, 0],
        ),
        choice_question(
            2,
            QuestionCategory::Energy,
            QuestionType::MultipleChoice,
            &[10, 20, 30, 40],
        ),
        open_question(3, QuestionCategory::Culture),
    ])
}

pub(super) fn candidate() -> CandidateDetails {
    CandidateDetails {
        name: "Ana Silva".to_string(),
        email: "ANA@x.com".to_string(),
        phone: "(11) 9 8888-7777".to_string(),
    }
}

pub(super) fn single_answer(question: u128, index: u128) -> AnswerInput {
    AnswerInput {
        question_id: question_id(question).to_string(),
        kind: Some(QuestionType::SingleChoice),
        alternative_id: Some(AlternativeSelection::One(
            alternative_id(question, index).to_string(),
        )),
        text_answer: None,
        score: 0.0,
    }
}

pub(super) fn multiple_answer(question: u128, indexes: &[u128]) -> AnswerInput {
    AnswerInput {
        question_id: question_id(question).to_string(),
        kind: Some(QuestionType::MultipleChoice),
        alternative_id: Some(AlternativeSelection::Many(
            indexes
                .iter()
                .map(|index| alternative_id(question, *index).to_string())
                .collect(),
        )),
        text_answer: None,
        score: 0.0,
    }
}

pub(super) fn open_answer(question: u128, text: &str) -> AnswerInput {
    AnswerInput {
        question_id: question_id(question).to_string(),
        kind: Some(QuestionType::OpenText),
        alternative_id: None,
        text_answer: Some(text.to_string()),
        score: 0.0,
    }
}

/// Scores 70 + 10 + 5 = 85.
pub(super) fn form() -> FormInput {
    FormInput {
        candidate: candidate(),
        answers: vec![
            single_answer(1, 1),
            multiple_answer(2, &[1]),
            open_answer(3, "I talk it through calmly."),
        ],
    }
}

pub(super) type MemoryCoordinator =
    SubmissionCoordinator<StaticQuestions, MemoryCandidates, MemoryAnswers, MemoryNotifications>;

pub(super) struct Harness {
    pub(super) coordinator: MemoryCoordinator,
    pub(super) candidates: Arc<MemoryCandidates>,
    pub(super) answers: Arc<MemoryAnswers>,
    pub(super) notifications: Arc<MemoryNotifications>,
}

pub(super) fn harness() -> Harness {
    harness_with(MemoryAnswers::default(), EvaluationConfig::default())
}

pub(super) fn harness_with(answers: MemoryAnswers, config: EvaluationConfig) -> Harness {
    harness_with_candidates(MemoryCandidates::default(), answers, config)
}

pub(super) fn harness_with_candidates(
    candidates: MemoryCandidates,
    answers: MemoryAnswers,
    config: EvaluationConfig,
) -> Harness {
    let candidates = Arc::new(candidates);
    let answers = Arc::new(answers);
    let notifications = Arc::new(MemoryNotifications::default());
    let coordinator = SubmissionCoordinator::new(
        Arc::new(StaticQuestions(questionnaire())),
        candidates.clone(),
        answers.clone(),
        notifications.clone(),
        config,
    );
    Harness {
        coordinator,
        candidates,
        answers,
        notifications,
    }
}

pub(super) fn router_with(coordinator: MemoryCoordinator) -> axum::Router {
    assessment_router(Arc::new(coordinator))
}

pub(super) struct StaticQuestions(pub(super) Questionnaire);

impl QuestionSource for StaticQuestions {
    fn active_questionnaire(&self) -> Result<Questionnaire, StoreError> {
        Ok(self.0.clone())
    }
}

pub(super) struct OfflineQuestions;

impl QuestionSource for OfflineQuestions {
    fn active_questionnaire(&self) -> Result<Questionnaire, StoreError> {
        Err(StoreError::Unavailable("question bank offline".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemoryCandidates {
    records: Mutex<HashMap<CandidateId, CandidateRecord>>,
    deleted: Mutex<Vec<CandidateId>>,
    fail_update: bool,
    fail_delete: bool,
}

impl MemoryCandidates {
    pub(super) fn failing_update() -> Self {
        Self {
            fail_update: true,
            ..Self::default()
        }
    }

    pub(super) fn failing_delete() -> Self {
        Self {
            fail_delete: true,
            ..Self::default()
        }
    }

    pub(super) fn records(&self) -> Vec<CandidateRecord> {
        self.records
            .lock()
            .expect("candidate mutex poisoned")
            .values()
            .cloned()
            .collect()
    }

    pub(super) fn deleted(&self) -> Vec<CandidateId> {
        self.deleted
            .lock()
            .expect("candidate mutex poisoned")
            .clone()
    }

    pub(super) fn seed(&self, details: CandidateDetails) -> CandidateRecord {
        self.create(details).expect("seed candidate")
    }
}

impl CandidateStore for MemoryCandidates {
    fn create(&self, candidate: CandidateDetails) -> Result<CandidateRecord, StoreError> {
        let mut guard = self.records.lock().expect("candidate mutex poisoned");
        if guard.values().any(|record| record.email == candidate.email) {
            return Err(StoreError::DuplicateEmail);
        }
        let record = CandidateRecord {
            id: CandidateId(Uuid::new_v4()),
            name: candidate.name,
            email: candidate.email,
            phone: candidate.phone,
            created_at: Utc::now(),
            completed_at: None,
            fit_score: None,
            fit_label: None,
        };
        guard.insert(record.id, record.clone());
        Ok(record)
    }

    fn update(&self, id: &CandidateId, completion: CandidateCompletion) -> Result<(), StoreError> {
        if self.fail_update {
            return Err(StoreError::Unavailable("candidate table read-only".to_string()));
        }
        let mut guard = self.records.lock().expect("candidate mutex poisoned");
        let record = guard.get_mut(id).ok_or(StoreError::NotFound)?;
        record.fit_score = Some(completion.fit_score);
        record.fit_label = Some(completion.fit_label);
        record.completed_at = Some(completion.completed_at);
        Ok(())
    }

    fn delete(&self, id: &CandidateId) -> Result<(), StoreError> {
        self.deleted
            .lock()
            .expect("candidate mutex poisoned")
            .push(*id);
        if self.fail_delete {
            return Err(StoreError::Unavailable("candidate table read-only".to_string()));
        }
        self.records
            .lock()
            .expect("candidate mutex poisoned")
            .remove(id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    fn fetch(&self, id: &CandidateId) -> Result<Option<CandidateRecord>, StoreError> {
        let guard = self.records.lock().expect("candidate mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

#[derive(Default)]
pub(super) struct MemoryAnswers {
    rows: Mutex<Vec<PersistedAnswer>>,
    offline: bool,
}

impl MemoryAnswers {
    pub(super) fn offline() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            offline: true,
        }
    }

    pub(super) fn rows(&self) -> Vec<PersistedAnswer> {
        self.rows.lock().expect("answer mutex poisoned").clone()
    }
}

impl AnswerStore for MemoryAnswers {
    fn insert_batch(&self, rows: Vec<PersistedAnswer>) -> Result<(), StoreError> {
        if self.offline {
            return Err(StoreError::Unavailable("answer table locked".to_string()));
        }
        self.rows
            .lock()
            .expect("answer mutex poisoned")
            .extend(rows);
        Ok(())
    }
}

#[derive(Default)]
pub(super) struct MemoryNotifications {
    events: Mutex<Vec<AssessmentNotification>>,
}

impl MemoryNotifications {
    pub(super) fn events(&self) -> Vec<AssessmentNotification> {
        self.events
            .lock()
            .expect("notification mutex poisoned")
            .clone()
    }
}

impl NotificationSink for MemoryNotifications {
    fn notify(&self, notification: AssessmentNotification) -> Result<(), NotificationError> {
        self.events
            .lock()
            .expect("notification mutex poisoned")
            .push(notification);
        Ok(())
    }
}

pub(super) struct FailingNotifications;

impl NotificationSink for FailingNotifications {
    fn notify(&self, _notification: AssessmentNotification) -> Result<(), NotificationError> {
        Err(NotificationError::Transport("smtp timeout".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
