//! Podcast search endpoints.
//!
//! Search and history calls never fail at the HTTP level. Their service
//! results pass through [`settle`], the one place that decides whether a
//! failure is reported in the envelope or quietly replaced by an empty value.
//! Lookup and random endpoints map errors to [`ApiError`] like the rest of
//! the API.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use std::sync::Arc;
use tracing::warn;

use super::validation::{validate_collection_id, validate_limit, validate_search_query};
use super::{ApiError, ApiResponse, AppState, RandomQuery, SearchQuery, SearchRequest};
use crate::models::{PodcastResult, SearchRecord};
use crate::services::{MAX_RANDOM_LIMIT, SearchError};

const DEFAULT_RANDOM_LIMIT: usize = 8;

/// What [`settle`] does with a failure it cannot recover from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnFailure {
    /// `success: false`, an empty payload and the error message.
    Report,
    /// `success: true` with an empty payload. The error is only logged.
    Empty,
}

/// Turns a service result into the response envelope.
///
/// Results the catalog returned but the store rejected are still delivered,
/// as transient rows.
pub fn settle<T>(
    operation: &'static str,
    result: Result<T, SearchError>,
    on_failure: OnFailure,
) -> ApiResponse<T>
where
    T: Default + FromUnpersisted,
{
    match result {
        Ok(data) => ApiResponse::success(data),
        Err(SearchError::Persistence {
            term,
            podcasts,
            message,
        }) => {
            warn!(
                operation,
                term = %term,
                error = %message,
                "Search results not stored, returning transient rows"
            );
            metrics::counter!("search_persist_failures_total").increment(1);
            let rows = podcasts
                .into_iter()
                .map(|p| PodcastResult::transient(p, &term))
                .collect();
            ApiResponse::success(T::from_unpersisted(rows))
        }
        Err(e) => {
            warn!(operation, error = %e, "Request degraded");
            match on_failure {
                OnFailure::Report => ApiResponse::failure(T::default(), e.to_string()),
                OnFailure::Empty => ApiResponse::success(T::default()),
            }
        }
    }
}

/// Payloads that can be built from rows the store never accepted.
pub trait FromUnpersisted {
    fn from_unpersisted(rows: Vec<PodcastResult>) -> Self;
}

impl FromUnpersisted for Vec<PodcastResult> {
    fn from_unpersisted(rows: Vec<PodcastResult>) -> Self {
        rows
    }
}

impl FromUnpersisted for Vec<SearchRecord> {
    fn from_unpersisted(_: Vec<PodcastResult>) -> Self {
        Vec::new()
    }
}

async fn run_search(state: &AppState, term: &str) -> Result<Json<ApiResponse<Vec<PodcastResult>>>, ApiError> {
    let term = validate_search_query(term)?;
    let result = state
        .search_service()
        .search(term)
        .await
        .map(|record| record.results);

    Ok(Json(settle("search", result, OnFailure::Report)))
}

/// `POST /api/podcasts/search`
pub async fn search(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<ApiResponse<Vec<PodcastResult>>>, ApiError> {
    run_search(&state, &request.term).await
}

/// `GET /api/podcasts/search?term=`
pub async fn search_get(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<PodcastResult>>>, ApiError> {
    run_search(&state, &query.term).await
}

/// `GET /api/podcasts/recent`
///
/// Up to ten searches, newest first. An unreachable store yields an empty list.
pub async fn recent(State(state): State<Arc<AppState>>) -> Json<ApiResponse<Vec<SearchRecord>>> {
    let result = state.search_service().recent_searches().await;
    Json(settle("recent_searches", result, OnFailure::Empty))
}

/// `GET /api/podcasts/random?term=&limit=`
pub async fn random(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RandomQuery>,
) -> Result<Json<ApiResponse<Vec<PodcastResult>>>, ApiError> {
    let limit = validate_limit(
        query.limit.unwrap_or(DEFAULT_RANDOM_LIMIT),
        MAX_RANDOM_LIMIT,
    )?;

    let podcasts = state
        .search_service()
        .random_podcasts(query.term.as_deref(), limit)
        .await?;

    Ok(Json(ApiResponse::success(podcasts)))
}

/// `GET /api/podcasts/{collection_id}`
///
/// `data` is `null` when neither the store nor the catalog knows the id.
pub async fn get_podcast(
    State(state): State<Arc<AppState>>,
    Path(collection_id): Path<i64>,
) -> Result<Json<ApiResponse<Option<PodcastResult>>>, ApiError> {
    let collection_id = validate_collection_id(collection_id)?;

    let podcast = state
        .search_service()
        .podcast_by_id(collection_id)
        .await?;

    Ok(Json(ApiResponse::success(podcast)))
}
