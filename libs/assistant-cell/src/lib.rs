pub mod services;
pub mod state;

pub use services::engine::ConversationEngine;
pub use state::AppState;
