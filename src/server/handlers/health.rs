use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use super::super::state::AppState;

/// Handle GET /health - liveness probe.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptimeSeconds": state.started.elapsed().as_secs(),
        "bodyLimitBytes": state.config.body_limit_bytes,
    }))
}
