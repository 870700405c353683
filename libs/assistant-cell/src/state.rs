// libs/assistant-cell/src/state.rs
use std::sync::Arc;

use appointment_cell::{AppointmentStore, BookingService, InMemoryAppointmentStore};
use dialogue_cell::SessionStore;
use scheduling_cell::{CalendarApi, HttpCalendarClient};
use shared_config::AppConfig;

use crate::services::engine::ConversationEngine;

/// Process-wide state shared by every channel adapter: the configuration,
/// the conversation sessions, and the one booking orchestrator all channels
/// funnel into.
pub struct AppState {
    pub config: AppConfig,
    pub sessions: Arc<SessionStore>,
    pub booking: Arc<BookingService>,
    pub engine: ConversationEngine,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let calendar: Arc<dyn CalendarApi> = Arc::new(HttpCalendarClient::new(&config));
        let store: Arc<dyn AppointmentStore> = Arc::new(InMemoryAppointmentStore::new());
        Self::with_collaborators(config, calendar, store)
    }

    /// Wiring seam for tests and alternative collaborator backends.
    pub fn with_collaborators(
        config: AppConfig,
        calendar: Arc<dyn CalendarApi>,
        store: Arc<dyn AppointmentStore>,
    ) -> Self {
        let sessions = Arc::new(SessionStore::new());
        let booking = Arc::new(BookingService::new(&config, store, calendar));
        let engine = ConversationEngine::new(
            Arc::clone(&sessions),
            Arc::clone(&booking),
            config.pharmacy_name.clone(),
        );

        Self { config, sessions, booking, engine }
    }
}
