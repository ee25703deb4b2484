// Copyright (c) 2026 MindEase Contributors
// SPDX-License-Identifier: AGPL-3.0
//! HTTP boundary for the chat client, dashboard and admin tooling.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET | `/api/health` | liveness plus stats |
//! | POST | `/api/vent` | ingest |
//! | GET | `/api/cohort/{cohort_id}/health` | cohort health |
//! | POST | `/api/search/emotion` | search by anchor |
//! | POST | `/api/search/phrase` | search by phrase |
//! | GET | `/api/crisis/check?threshold=` | crisis gate (admin) |
//! | GET | `/api/emotions/anchors` | anchor listing |
//! | GET | `/api/stats` | stats |
//! | POST | `/api/identity/erase` | identity erasure |
//!
//! Authorization for the crisis route is the deployment's responsibility.
//! Failures render as `{"success": false, "code": ..., "error": ...}` with a
//! generic message; the detailed error is only logged. Malformed bodies and
//! query strings take the same path as `INVALID_INPUT`.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::application::EmotionEngine;
use crate::domain::entry::{EntryMetadata, IngestRequest};
use crate::domain::error::{EngineError, ErrorCategory};
use crate::domain::report::{CohortHealthReport, EngineStats};

pub type AppState = Arc<dyn EmotionEngine>;

pub fn app(engine: Arc<dyn EmotionEngine>) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/vent", post(vent_handler))
        .route("/api/cohort/{cohort_id}/health", get(cohort_health_handler))
        .route("/api/search/emotion", post(search_emotion_handler))
        .route("/api/search/phrase", post(search_phrase_handler))
        .route("/api/crisis/check", get(crisis_check_handler))
        .route("/api/emotions/anchors", get(anchors_handler))
        .route("/api/stats", get(stats_handler))
        .route("/api/identity/erase", post(erase_identity_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(engine)
}

/// Engine failure rendered at the HTTP boundary
pub struct ApiError(EngineError);

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(EngineError::InvalidInput(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(EngineError::InvalidInput(rejection.body_text()))
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            EngineError::InvalidInput(_) | EngineError::UnknownAnchor(_) => StatusCode::BAD_REQUEST,
            EngineError::InvalidCrisisThreshold { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            EngineError::EmptyCohort(_) => StatusCode::NOT_FOUND,
            EngineError::EmbeddingUnavailable(_) | EngineError::NotReady => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            EngineError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> &'static str {
        match self.0.category() {
            ErrorCategory::Input => "Invalid request",
            ErrorCategory::Dependency => "Insight unavailable, please try again later",
            ErrorCategory::State => "No data available for this cohort yet",
            ErrorCategory::Internal => "Service unavailable",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        warn!(code = self.0.code(), status = status.as_u16(), "Request failed: {}", self.0);
        let body = json!({
            "success": false,
            "code": self.0.code(),
            "error": self.public_message(),
        });
        (status, Json(body)).into_response()
    }
}

type ApiResult = Result<Json<Value>, ApiError>;

#[derive(Debug, Deserialize)]
pub struct VentRequest {
    pub user_id_hash: String,
    pub cohort_id: String,
    pub text: String,
    #[serde(default)]
    pub metadata: EntryMetadata,
}

#[derive(Debug, Deserialize)]
pub struct EmotionSearchRequest {
    pub emotion: String,
    pub threshold: Option<f64>,
    pub top_k: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct PhraseSearchRequest {
    pub text: String,
    pub threshold: Option<f64>,
    pub top_k: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct CrisisQuery {
    pub threshold: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct EraseRequest {
    pub user_id_hash: String,
}

async fn health_handler(State(engine): State<AppState>) -> ApiResult {
    let stats = engine.stats().await?;
    Ok(Json(json!({
        "status": "healthy",
        "database": stats,
        "timestamp": Utc::now().to_rfc3339(),
    })))
}

async fn vent_handler(
    State(engine): State<AppState>,
    payload: Result<Json<VentRequest>, JsonRejection>,
) -> ApiResult {
    let Json(payload) = payload?;
    let request = IngestRequest::new(payload.cohort_id, payload.user_id_hash, payload.text)
        .with_metadata(payload.metadata);
    let entry_id = engine.ingest(request).await?;

    Ok(Json(json!({
        "success": true,
        "entry_id": entry_id,
        "timestamp": Utc::now().to_rfc3339(),
    })))
}

async fn cohort_health_handler(
    State(engine): State<AppState>,
    Path(cohort_id): Path<String>,
) -> Result<Json<CohortHealthReport>, ApiError> {
    Ok(Json(engine.cohort_health(&cohort_id).await?))
}

async fn search_emotion_handler(
    State(engine): State<AppState>,
    payload: Result<Json<EmotionSearchRequest>, JsonRejection>,
) -> ApiResult {
    let Json(payload) = payload?;
    let matches = engine
        .search_by_emotion(&payload.emotion, payload.threshold, payload.top_k)
        .await?;

    Ok(Json(json!({
        "emotion": payload.emotion.trim().to_lowercase(),
        "count": matches.len(),
        "matches": matches,
    })))
}

async fn search_phrase_handler(
    State(engine): State<AppState>,
    payload: Result<Json<PhraseSearchRequest>, JsonRejection>,
) -> ApiResult {
    let Json(payload) = payload?;
    let matches = engine
        .search_by_phrase(&payload.text, payload.threshold, payload.top_k)
        .await?;

    Ok(Json(json!({
        "count": matches.len(),
        "matches": matches,
    })))
}

async fn crisis_check_handler(
    State(engine): State<AppState>,
    query: Result<Query<CrisisQuery>, QueryRejection>,
) -> ApiResult {
    let Query(query) = query?;
    let flagged = engine.crisis_check(query.threshold).await?;

    Ok(Json(json!({
        "count": flagged.len(),
        "flagged_users": flagged,
        "timestamp": Utc::now().to_rfc3339(),
    })))
}

async fn anchors_handler(State(engine): State<AppState>) -> Json<Value> {
    let summaries = engine.anchors();
    let anchors: BTreeMap<String, String> = summaries
        .iter()
        .map(|a| (a.name.to_string(), a.reference_text.clone()))
        .collect();
    let emotions: Vec<String> = summaries.iter().map(|a| a.name.to_string()).collect();

    Json(json!({
        "emotions": emotions,
        "anchors": anchors,
    }))
}

async fn stats_handler(State(engine): State<AppState>) -> Result<Json<EngineStats>, ApiError> {
    Ok(Json(engine.stats().await?))
}

async fn erase_identity_handler(
    State(engine): State<AppState>,
    payload: Result<Json<EraseRequest>, JsonRejection>,
) -> ApiResult {
    let Json(payload) = payload?;
    let erased = engine.erase_identity(&payload.user_id_hash).await?;
    Ok(Json(json!({
        "success": true,
        "entries_affected": erased,
    })))
}
