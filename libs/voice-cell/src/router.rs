// libs/voice-cell/src/router.rs
use std::sync::Arc;

use axum::{routing::post, Router};

use assistant_cell::AppState;

use crate::handlers;

pub fn voice_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/vapi/webhook", post(handlers::camel_webhook))
        .route("/retell/webhook", post(handlers::snake_webhook))
        .with_state(state)
}
