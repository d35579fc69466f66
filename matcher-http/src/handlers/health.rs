use axum::{extract::State, Json};
use std::sync::Arc;

use super::AppState;

/// Health check endpoint
pub async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let index = state.matcher.client().index_config();
    Json(serde_json::json!({
        "status": "ok",
        "message": "API is running",
        "index": index.name,
        "index_ready": state.index_ready,
        "uptime_secs": state.start_time.elapsed().as_secs(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
