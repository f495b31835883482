//! REST endpoints for evaluating and recording task assignments.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tracing::error;

use super::service::AssignmentService;
use crate::error::{AssignmentError, Error};

/// Shared state for assignment routes.
#[derive(Clone)]
pub struct AssignmentRouteState {
    pub service: Arc<AssignmentService>,
}

/// Build the assignment REST routes.
pub fn assignment_routes(service: Arc<AssignmentService>) -> Router {
    let state = AssignmentRouteState { service };

    Router::new()
        .route("/health", get(health))
        .route("/api/assign", post(assign))
        .route("/api/assign/evaluate", post(evaluate))
        .route("/api/assign/rank", post(rank))
        .route("/api/assign/batch", post(assign_batch))
        .route("/api/tasks/{id}", get(task_details))
        .route("/api/developers/{id}/availability", get(developer_availability))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct PairRequest {
    task_id: i64,
    developer_id: i64,
}

#[derive(Debug, Deserialize)]
struct RankRequest {
    task_id: i64,
    #[serde(default)]
    developer_ids: Vec<i64>,
}

/// Map a service error onto a status code and `{"error": ..}` body.
fn error_response(err: Error) -> Response {
    let (status, message) = match err {
        Error::Assignment(e) => {
            let status = match e {
                AssignmentError::TaskNotFound(_) | AssignmentError::DeveloperNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                AssignmentError::DeveloperUnavailable(_)
                | AssignmentError::AlreadyAssigned { .. } => StatusCode::CONFLICT,
            };
            (status, e.to_string())
        }
        other => {
            error!(error = %other, "Assignment request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    };

    (status, Json(serde_json::json!({"error": message}))).into_response()
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "task-assign"
    }))
}

// ── Evaluation ──────────────────────────────────────────────────────────

/// POST /api/assign/evaluate
///
/// 200 with the verdict, or 400 with `{error, task_id, developer_id}` when an
/// id does not resolve.
async fn evaluate(
    State(state): State<AssignmentRouteState>,
    Json(body): Json<PairRequest>,
) -> Response {
    match state.service.evaluate(body.task_id, body.developer_id).await {
        Ok(result) if result.is_error() => (StatusCode::BAD_REQUEST, Json(result)).into_response(),
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/assign/rank
async fn rank(State(state): State<AssignmentRouteState>, Json(body): Json<RankRequest>) -> Response {
    match state
        .service
        .rank_candidates(body.task_id, &body.developer_ids)
        .await
    {
        Ok(ranked) => (StatusCode::OK, Json(ranked)).into_response(),
        Err(e) => error_response(e),
    }
}

// ── Assignment ──────────────────────────────────────────────────────────

/// POST /api/assign
async fn assign(State(state): State<AssignmentRouteState>, Json(body): Json<PairRequest>) -> Response {
    match state.service.assign(body.task_id, body.developer_id).await {
        Ok(receipt) => (StatusCode::OK, Json(receipt)).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/assign/batch
async fn assign_batch(State(state): State<AssignmentRouteState>) -> Response {
    match state.service.assign_batch().await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(e) => error_response(e),
    }
}

// ── Lookups ─────────────────────────────────────────────────────────────

/// GET /api/tasks/{id}
async fn task_details(State(state): State<AssignmentRouteState>, Path(id): Path<i64>) -> Response {
    match state.service.task_details(id).await {
        Ok(task) => (StatusCode::OK, Json(task)).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /api/developers/{id}/availability
async fn developer_availability(
    State(state): State<AssignmentRouteState>,
    Path(id): Path<i64>,
) -> Response {
    match state.service.developer_availability(id).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => error_response(e),
    }
}
