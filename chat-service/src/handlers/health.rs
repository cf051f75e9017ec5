use crate::startup::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;
use service_core::error::AppError;

/// Liveness probe.
pub async fn ping() -> &'static str {
    "pong"
}

/// Service status, including whether replies currently come from Gemini.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "chat-service",
        "version": env!("CARGO_PKG_VERSION"),
        "mode": state.chat.mode(),
        "model": state.chat.model(),
    }))
}

/// Prometheus exposition; 404 when no recorder was installed.
pub async fn metrics(State(state): State<AppState>) -> Result<String, AppError> {
    state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Metrics are not enabled")))
}
