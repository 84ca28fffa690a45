use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{CandidateId, Registration};
use super::repository::{CandidateRepository, RepositoryError};
use super::search::SearchQuery;
use super::service::{CandidateService, CandidateServiceError};
use crate::notify::{ContactNotifier, NotifyError};
use crate::scoring::QuestionnaireResponse;
use crate::sealing::FieldSealer;

type SharedService<R, S, N> = Arc<CandidateService<R, S, N>>;

/// Router exposing registration, search, statistics, contact and scoring endpoints.
pub fn candidate_router<R, S, N>(service: SharedService<R, S, N>) -> Router
where
    R: CandidateRepository + 'static,
    S: FieldSealer + 'static,
    N: ContactNotifier + 'static,
{
    Router::new()
        .route("/api/v1/candidates", post(register_handler::<R, S, N>))
        .route("/api/v1/candidates/search", get(search_handler::<R, S, N>))
        .route(
            "/api/v1/candidates/:candidate_id",
            get(candidate_handler::<R, S, N>),
        )
        .route(
            "/api/v1/candidates/:candidate_id/contact",
            post(contact_handler::<R, S, N>),
        )
        .route("/api/v1/roles", get(roles_handler::<R, S, N>))
        .route(
            "/api/v1/roles/statistics",
            get(statistics_handler::<R, S, N>),
        )
        .route("/api/v1/scores", post(score_handler::<R, S, N>))
        .route(
            "/api/v1/scores/features",
            post(feature_score_handler::<R, S, N>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContactRequest {
    pub(crate) role: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FeatureRequest {
    features: Vec<f64>,
}

pub(crate) async fn register_handler<R, S, N>(
    State(service): State<SharedService<R, S, N>>,
    Json(registration): Json<Registration>,
) -> Response
where
    R: CandidateRepository + 'static,
    S: FieldSealer + 'static,
    N: ContactNotifier + 'static,
{
    match off_runtime(move || service.register(registration)).await {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(response) => response,
    }
}

pub(crate) async fn search_handler<R, S, N>(
    State(service): State<SharedService<R, S, N>>,
    Query(query): Query<SearchQuery>,
) -> Response
where
    R: CandidateRepository + 'static,
    S: FieldSealer + 'static,
    N: ContactNotifier + 'static,
{
    match service.search(&query) {
        Ok(hits) => {
            let payload = json!({
                "role": query.role.trim(),
                "min_score": query.min_score,
                "total": hits.len(),
                "candidates": hits,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn candidate_handler<R, S, N>(
    State(service): State<SharedService<R, S, N>>,
    Path(candidate_id): Path<String>,
) -> Response
where
    R: CandidateRepository + 'static,
    S: FieldSealer + 'static,
    N: ContactNotifier + 'static,
{
    match service.get(&CandidateId(candidate_id)) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn contact_handler<R, S, N>(
    State(service): State<SharedService<R, S, N>>,
    Path(candidate_id): Path<String>,
    Json(request): Json<ContactRequest>,
) -> Response
where
    R: CandidateRepository + 'static,
    S: FieldSealer + 'static,
    N: ContactNotifier + 'static,
{
    let id = CandidateId(candidate_id);
    match off_runtime(move || service.contact(&id, &request.role)).await {
        Ok(message) => (StatusCode::ACCEPTED, Json(message)).into_response(),
        Err(response) => response,
    }
}

pub(crate) async fn roles_handler<R, S, N>(
    State(service): State<SharedService<R, S, N>>,
) -> Response
where
    R: CandidateRepository + 'static,
    S: FieldSealer + 'static,
    N: ContactNotifier + 'static,
{
    (StatusCode::OK, Json(json!({ "roles": service.catalog() }))).into_response()
}

pub(crate) async fn statistics_handler<R, S, N>(
    State(service): State<SharedService<R, S, N>>,
) -> Response
where
    R: CandidateRepository + 'static,
    S: FieldSealer + 'static,
    N: ContactNotifier + 'static,
{
    match service.statistics() {
        Ok(statistics) => {
            (StatusCode::OK, Json(json!({ "roles": statistics }))).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn score_handler<R, S, N>(
    State(service): State<SharedService<R, S, N>>,
    Json(responses): Json<QuestionnaireResponse>,
) -> Response
where
    R: CandidateRepository + 'static,
    S: FieldSealer + 'static,
    N: ContactNotifier + 'static,
{
    match service.score_preview(&responses) {
        Ok(scores) => (StatusCode::OK, Json(json!({ "scores": scores }))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn feature_score_handler<R, S, N>(
    State(service): State<SharedService<R, S, N>>,
    Json(request): Json<FeatureRequest>,
) -> Response
where
    R: CandidateRepository + 'static,
    S: FieldSealer + 'static,
    N: ContactNotifier + 'static,
{
    match service.score_features(request.features) {
        Ok(scores) => (StatusCode::OK, Json(json!({ "scores": scores }))).into_response(),
        Err(error) => error_response(error),
    }
}

/// Runs sealing, store writes and SMTP delivery on the blocking pool.
async fn off_runtime<T, F>(work: F) -> Result<T, Response>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, CandidateServiceError> + Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(result) => result.map_err(error_response),
        Err(join_error) => {
            let payload = json!({ "error": format!("request worker failed: {join_error}") });
            Err((StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response())
        }
    }
}

fn error_response(error: CandidateServiceError) -> Response {
    let status = match &error {
        CandidateServiceError::MissingField(_)
        | CandidateServiceError::TraitTooLong { .. }
        | CandidateServiceError::UnknownRole(_)
        | CandidateServiceError::Features(_)
        | CandidateServiceError::Notify(NotifyError::InvalidAddress { .. }) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        CandidateServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        CandidateServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        CandidateServiceError::Notify(NotifyError::NotConfigured) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        CandidateServiceError::Notify(NotifyError::Transport(_)) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, Json(payload)).into_response()
}
