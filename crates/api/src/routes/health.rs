//! Health and metrics routes

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::AppState;

/// Health response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub stored_readings: Option<u64>,
    pub provider: String,
    pub pdf_renderer: String,
}

/// Health check handler
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let stored_readings = match state.repository.count().await {
        Ok(count) => Some(count),
        Err(e) => {
            warn!("Health check could not read store: {}", e);
            None
        }
    };

    Json(HealthResponse {
        status: if stored_readings.is_some() { "healthy" } else { "degraded" }.to_string(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        stored_readings,
        provider: state.provider.name().to_string(),
        pdf_renderer: state.reports.active_renderer().to_string(),
    })
}

/// Prometheus exposition
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics disabled".to_string()),
    }
}
