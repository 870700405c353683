// libs/chat-cell/src/handlers.rs
use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::debug;

use assistant_cell::AppState;
use shared_models::{AppError, Channel};

/// One synchronous chat turn: utterance in, assistant reply out. A missing
/// or empty message is the only hard client error; everything downstream
/// degrades to apologetic text inside a success envelope.
pub async fn chat_turn(
    State(state): State<Arc<AppState>>,
    Json(request): Json<crate::models::ChatRequest>,
) -> Result<Json<Value>, AppError> {
    let message = request.message.unwrap_or_default();
    if message.trim().is_empty() {
        return Err(AppError::BadRequest("Message is required".to_string()));
    }

    let session_id = request.session_id.unwrap_or_else(|| "default".to_string());
    debug!("chat turn for session {}", session_id);

    let response = state
        .engine
        .respond(&session_id, &message, Channel::Chat, Utc::now())
        .await;

    Ok(Json(json!({
        "response": response,
        "source": "pharmacy_chat_assistant",
        "session_id": session_id,
    })))
}
