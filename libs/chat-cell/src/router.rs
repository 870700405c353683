// libs/chat-cell/src/router.rs
use std::sync::Arc;

use axum::{routing::post, Router};

use assistant_cell::AppState;

use crate::handlers;

pub fn chat_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", post(handlers::chat_turn))
        .with_state(state)
}
