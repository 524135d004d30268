use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use std::time::SystemTime;

/// Global server start time for uptime calculation
static SERVER_START_TIME: once_cell::sync::Lazy<SystemTime> =
    once_cell::sync::Lazy::new(SystemTime::now);

fn uptime_seconds() -> u64 {
    SERVER_START_TIME
        .elapsed()
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Health check endpoint (liveness)
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "deptclass-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds(),
    }))
}

/// Readiness check endpoint
///
/// Always 200; `profile` tells whether classification can run without an
/// uploaded keywords file.
pub async fn readiness_check(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let profile = state.classifier.current_profile();
    let embedder = state.classifier.embedder();

    Json(json!({
        "status": "ready",
        "service": "deptclass-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds(),
        "components": {
            "embedder": {
                "encoder": embedder.encoder_name(),
                "segmenter": embedder.segmenter_name(),
                "hidden_size": embedder.hidden_size(),
            },
            "profile": {
                "loaded": profile.is_some(),
                "departments": profile.as_ref().map(|p| p.len()).unwrap_or(0),
            },
            "knowledge_base": {
                "keywords": state.knowledge.len(),
            },
        }
    }))
}
