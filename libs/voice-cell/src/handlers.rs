// libs/voice-cell/src/handlers.rs
use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::debug;

use assistant_cell::AppState;
use shared_models::Channel;

use crate::services::functions;

/// Webhook for the camelCase voice platform. Only `function-call` events are
/// acted on; everything else is acknowledged so the platform keeps talking.
pub async fn camel_webhook(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let event_type = body
        .pointer("/message/type")
        .and_then(Value::as_str)
        .unwrap_or_default();

    if event_type == "function-call" {
        let name = body
            .pointer("/message/functionCall/name")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let parameters = body
            .pointer("/message/functionCall/parameters")
            .cloned()
            .unwrap_or_else(|| json!({}));

        let result =
            functions::dispatch(&state, name, &parameters, Channel::VoiceCamel, Utc::now()).await;
        return Json(json!({ "result": result }));
    }

    if matches!(event_type, "conversation-update" | "status-update") {
        debug!("voice platform event: {}", event_type);
    }

    Json(json!({ "received": true }))
}

/// Webhook for the snake_case voice platform; replies echo the
/// `function_call_id` so the platform can correlate the result.
pub async fn snake_webhook(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let event_type = body.get("type").and_then(Value::as_str).unwrap_or_default();

    if event_type == "function_call" {
        let name = body
            .get("function_name")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let parameters = body.get("parameters").cloned().unwrap_or_else(|| json!({}));
        let function_call_id = body.get("function_call_id").cloned().unwrap_or(Value::Null);

        let result =
            functions::dispatch(&state, name, &parameters, Channel::VoiceSnake, Utc::now()).await;
        return Json(json!({
            "function_call_id": function_call_id,
            "result": result,
        }));
    }

    if matches!(event_type, "call_started" | "call_ended") {
        debug!(
            "voice call event {} for {}",
            event_type,
            body.get("call_id").and_then(serde_json::Value::as_str).unwrap_or("unknown")
        );
    }

    Json(json!({ "received": true }))
}
