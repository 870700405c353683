use std::sync::Arc;

use axum::{routing::get, Router};

use assistant_cell::AppState;
use chat_cell::chat_routes;
use voice_cell::voice_routes;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "CareWell Pharmacy assistant API is running!" }))
        .nest("/chat", chat_routes(state.clone()))
        .nest("/voice", voice_routes(state))
}
