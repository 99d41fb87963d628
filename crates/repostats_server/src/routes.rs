//! HTTP routes.
//!
//! - `GET /ping` - liveness, `{"status": "pong"}`
//! - `GET /repos?license=&language=&since=` - newest repositories
//! - `GET /stats?license=&language=&since=` - newest repositories with stars and languages
//!
//! The caller's `Authorization` header is forwarded upstream unchanged.

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::routing::get;
use axum::{Json, Router};
use repostats::{Authorization, Filters, RepoListing, RepoQuery, Stats, StatsPipeline};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

use crate::error::ApiError;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: StatsPipeline,
}

/// Query parameters shared by `/repos` and `/stats`.
#[derive(Debug, Default, Deserialize)]
pub struct RepoParams {
    pub license: Option<String>,
    pub language: Option<String>,
    /// Kept as text so a bad value yields our own 400 body.
    pub since: Option<String>,
}

impl RepoParams {
    fn into_query(self) -> Result<RepoQuery, ApiError> {
        let since = match self.since.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<u64>()
                    .map_err(|_| ApiError::InvalidSince(raw.to_string()))?,
            ),
        };

        Ok(RepoQuery::new(since, Filters::new(self.license, self.language)))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/repos", get(repos))
        .route("/stats", get(stats))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn ping() -> Json<Value> {
    Json(json!({ "status": "pong" }))
}

async fn repos(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<RepoParams>,
) -> Result<Json<Vec<RepoListing>>, ApiError> {
    let query = params.into_query()?;
    let auth = authorization(&headers);

    let repos = state.pipeline.fetch_repos(&auth, &query).await?;
    Ok(Json(repos))
}

async fn stats(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<RepoParams>,
) -> Result<Json<Vec<Stats>>, ApiError> {
    let query = params.into_query()?;
    let auth = authorization(&headers);

    let stats = state.pipeline.fetch_stats(&auth, &query).await?;
    Ok(Json(stats))
}

fn authorization(headers: &HeaderMap) -> Authorization {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(Authorization::from_header_value)
        .unwrap_or_default()
}
