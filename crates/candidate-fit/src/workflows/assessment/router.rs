use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::boundary::{RecordAnswersError, RecordAnswersRequest};
use super::domain::{FormInput, SubmissionResult};
use super::questionnaire::CategoryStep;
use super::repository::{AnswerStore, CandidateStore, NotificationSink, QuestionSource};
use super::service::{SubmissionCoordinator, SubmissionError};
use crate::error::AppError;

/// Router builder exposing the questionnaire, submission, and pre-scored
/// answer endpoints.
pub fn assessment_router<Q, C, A, N>(
    coordinator: Arc<SubmissionCoordinator<Q, C, A, N>>,
) -> Router
where
    Q: QuestionSource + 'static,
    C: CandidateStore + 'static,
    A: AnswerStore + 'static,
    N: NotificationSink + 'static,
{
    Router::new()
        .route("/api/v1/assessment/steps", get(steps_handler::<Q, C, A, N>))
        .route(
            "/api/v1/assessment/submissions",
            post(submit_handler::<Q, C, A, N>),
        )
        .route(
            "/api/v1/assessment/answers",
            post(record_answers_handler::<Q, C, A, N>),
        )
        .with_state(coordinator)
}

pub(crate) async fn steps_handler<Q, C, A, N>(
    State(coordinator): State<Arc<SubmissionCoordinator<Q, C, A, N>>>,
) -> Result<Json<Vec<CategoryStep>>, AppError>
where
    Q: QuestionSource + 'static,
    C: CandidateStore + 'static,
    A: AnswerStore + 'static,
    N: NotificationSink + 'static,
{
    let questionnaire = coordinator.questionnaire()?;
    Ok(Json(questionnaire.steps().to_vec()))
}

pub(crate) async fn submit_handler<Q, C, A, N>(
    State(coordinator): State<Arc<SubmissionCoordinator<Q, C, A, N>>>,
    payload: Result<Json<FormInput>, JsonRejection>,
) -> Response
where
    Q: QuestionSource + 'static,
    C: CandidateStore + 'static,
    A: AnswerStore + 'static,
    N: NotificationSink + 'static,
{
    // Malformed bodies get the same result shape as validation failures.
    let form = match payload {
        Ok(Json(form)) => form,
        Err(rejection) => {
            let result =
                SubmissionResult::rejected("Invalid form data", vec![rejection.body_text()]);
            return (rejection.status(), Json(result)).into_response();
        }
    };

    match coordinator.try_submit(form) {
        Ok(result) => (StatusCode::CREATED, Json(result)).into_response(),
        Err(error) => {
            let status = match &error {
                SubmissionError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                SubmissionError::DuplicateEmail => StatusCode::CONFLICT,
                SubmissionError::Persistence { .. } | SubmissionError::Consistency { .. } => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            (status, Json(SubmissionResult::from(error))).into_response()
        }
    }
}

pub(crate) async fn record_answers_handler<Q, C, A, N>(
    State(coordinator): State<Arc<SubmissionCoordinator<Q, C, A, N>>>,
    Json(request): Json<RecordAnswersRequest>,
) -> Response
where
    Q: QuestionSource + 'static,
    C: CandidateStore + 'static,
    A: AnswerStore + 'static,
    N: NotificationSink + 'static,
{
    match coordinator.record_answers(request) {
        Ok(score) => (StatusCode::OK, Json(score)).into_response(),
        Err(error) => {
            let status = match &error {
                RecordAnswersError::Invalid(_) => StatusCode::BAD_REQUEST,
                RecordAnswersError::CandidateNotFound => StatusCode::NOT_FOUND,
                RecordAnswersError::AlreadyCompleted => StatusCode::CONFLICT,
                RecordAnswersError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            let payload = json!({
                "error": error.to_string(),
            });
            (status, Json(payload)).into_response()
        }
    }
}
