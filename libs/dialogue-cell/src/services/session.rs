// libs/dialogue-cell/src/services/session.rs
use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::models::ConversationSession;

/// Owns every live conversation. Callers get a per-session mutex back, so
/// two turns arriving for the same key serialize on that session while turns
/// for different keys proceed independently.
///
/// Sessions are created lazily on first use and never evicted.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<Mutex<ConversationSession>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_create(&self, key: &str) -> Arc<Mutex<ConversationSession>> {
        if let Some(session) = self.sessions.read().await.get(key) {
            return Arc::clone(session);
        }

        let mut sessions = self.sessions.write().await;
        // Another writer may have raced us between the read and write locks.
        Arc::clone(sessions.entry(key.to_string()).or_insert_with(|| {
            debug!("creating conversation session {}", key);
            Arc::new(Mutex::new(ConversationSession::new(key)))
        }))
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    #[tokio::test]
    async fn get_or_create_returns_the_same_session_for_a_key() {
        let store = SessionStore::new();

        {
            let session = store.get_or_create("abc").await;
            session.lock().await.push_turn(Role::Patient, "hello");
        }

        let session = store.get_or_create("abc").await;
        assert_eq!(session.lock().await.turns.len(), 1);
        assert_eq!(store.session_count().await, 1);
    }

    #[tokio::test]
    async fn different_keys_get_independent_sessions() {
        let store = SessionStore::new();

        store.get_or_create("a").await.lock().await.push_turn(Role::Patient, "hi");
        let b = store.get_or_create("b").await;

        assert!(b.lock().await.turns.is_empty());
        assert_eq!(store.session_count().await, 2);
    }

    #[tokio::test]
    async fn concurrent_turns_for_one_key_serialize() {
        let store = Arc::new(SessionStore::new());

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let session = store.get_or_create("shared").await;
                let mut guard = session.lock().await;
                guard.push_turn(Role::Patient, format!("turn {}", i));
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let session = store.get_or_create("shared").await;
        assert_eq!(session.lock().await.turns.len(), 8);
    }
}
