// libs/chat-cell/src/models.rs
use serde::Deserialize;

/// Inbound envelope of the synchronous text channel.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, alias = "sessionId")]
    pub session_id: Option<String>,
}
