//! Health and metrics handlers.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    pub files: usize,
    pub total_points: usize,
    pub years: Vec<i32>,
}

/// GET /health - Basic health check
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// GET /ready - Index summary
///
/// The router only exists once the startup scan has finished, so a response
/// here always means the index is complete.
pub async fn ready_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> ApiResult<Json<ReadyResponse>> {
    Ok(Json(ReadyResponse {
        ready: true,
        files: state.service.files().len(),
        total_points: state.service.total_points()?,
        years: state.service.years(),
    }))
}

/// GET /metrics - Prometheus metrics
pub async fn metrics_handler(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    let body = state
        .prometheus
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default();

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
}
