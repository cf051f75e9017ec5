use crate::models::{ChatRequest, ChatResponse};
use crate::startup::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use service_core::error::AppError;

/// `POST /chat`: answer one message, from Gemini or the fallback rules.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::bad_request(e.body_text()))?;

    let outcome = state.chat.handle(&request.message).await?;

    Ok(Json(outcome.into()))
}
