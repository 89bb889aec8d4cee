use axum::{extract::State, Json};
use serde::Serialize;

use crate::metrics::Metrics;
use crate::state::SharedState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_seconds: u64,
    pub version: &'static str,
}

/// GET /health
pub async fn health_check(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_seconds: state.metrics.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /metrics
pub async fn metrics(State(state): State<SharedState>) -> Json<Metrics> {
    Json(state.metrics.get_metrics())
}
