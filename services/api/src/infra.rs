use candidate_fit::config::AssessmentConfig;
use candidate_fit::workflows::assessment::{
    AnswerStore, AssessmentNotification, CandidateCompletion, CandidateDetails, CandidateId,
    CandidateRecord, CandidateStore, NotificationError, NotificationSink, PersistedAnswer,
    QuestionSource, Questionnaire, StoreError, SubmissionCoordinator,
};
use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;
use uuid::Uuid;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type ApiCoordinator = SubmissionCoordinator<
    StaticQuestionSource,
    InMemoryCandidateStore,
    InMemoryAnswerStore,
    LoggingNotificationSink,
>;

/// Wire the coordinator to the in-process adapters.
pub(crate) fn build_coordinator(
    config: &AssessmentConfig,
) -> (
    ApiCoordinator,
    Arc<InMemoryCandidateStore>,
    Arc<InMemoryAnswerStore>,
) {
    let candidates = Arc::new(InMemoryCandidateStore::default());
    let answers = Arc::new(InMemoryAnswerStore::default());
    let coordinator = SubmissionCoordinator::new(
        Arc::new(StaticQuestionSource::standard()),
        candidates.clone(),
        answers.clone(),
        Arc::new(LoggingNotificationSink),
        config.evaluation_config(),
    );
    (coordinator, candidates, answers)
}

#[derive(Clone)]
pub(crate) struct StaticQuestionSource {
    questionnaire: Questionnaire,
}

impl StaticQuestionSource {
    pub(crate) fn standard() -> Self {
        Self {
            questionnaire: Questionnaire::standard(),
        }
    }
}

impl QuestionSource for StaticQuestionSource {
    fn active_questionnaire(&self) -> Result<Questionnaire, StoreError> {
        Ok(self.questionnaire.clone())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryCandidateStore {
    records: Arc<Mutex<HashMap<CandidateId, CandidateRecord>>>,
}

impl InMemoryCandidateStore {
    pub(crate) fn get(&self, id: &CandidateId) -> Option<CandidateRecord> {
        self.records
            .lock()
            .expect("candidate mutex poisoned")
            .get(id)
            .cloned()
    }

    pub(crate) fn len(&self) -> usize {
        self.records.lock().expect("candidate mutex poisoned").len()
    }
}

impl CandidateStore for InMemoryCandidateStore {
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
        let mut guard = self.records.lock().expect("candidate mutex poisoned");
        let record = guard.get_mut(id).ok_or(StoreError::NotFound)?;
        record.fit_score = Some(completion.fit_score);
        record.fit_label = Some(completion.fit_label);
        record.completed_at = Some(completion.completed_at);
        Ok(())
    }

    fn delete(&self, id: &CandidateId) -> Result<(), StoreError> {
        let mut guard = self.records.lock().expect("candidate mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(StoreError::NotFound)
    }

    fn fetch(&self, id: &CandidateId) -> Result<Option<CandidateRecord>, StoreError> {
        Ok(self.get(id))
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryAnswerStore {
    rows: Arc<Mutex<Vec<PersistedAnswer>>>,
}

impl InMemoryAnswerStore {
    pub(crate) fn rows_for(&self, candidate_id: &CandidateId) -> Vec<PersistedAnswer> {
        self.rows
            .lock()
            .expect("answer mutex poisoned")
            .iter()
            .filter(|row| &row.candidate_id == candidate_id)
            .cloned()
            .collect()
    }
}

impl AnswerStore for InMemoryAnswerStore {
    fn insert_batch(&self, rows: Vec<PersistedAnswer>) -> Result<(), StoreError> {
        let mut guard = self.rows.lock().expect("answer mutex poisoned");
        guard.extend(rows);
        Ok(())
    }
}

/// Writes notifications to the log instead of an admin inbox.
pub(crate) struct LoggingNotificationSink;

impl NotificationSink for LoggingNotificationSink {
    fn notify(&self, notification: AssessmentNotification) -> Result<(), NotificationError> {
        info!(
            kind = notification.kind.label(),
            candidate_id = %notification.candidate_id,
            fit_score = notification.fit_score,
            fit_label = %notification.fit_label,
            "{}",
            notification.title()
        );
        Ok(())
    }
}
