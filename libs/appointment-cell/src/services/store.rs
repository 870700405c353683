// libs/appointment-cell/src/services/store.rs
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::models::{Appointment, AppointmentUpdate, NewAppointment, StoreError};

/// The appointment repository contract. Only the read/write surface matters
/// here; the backing technology lives behind this trait.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn create(&self, new: NewAppointment) -> Result<Appointment, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>, StoreError>;

    /// Name match is case-insensitive; phone and email must match exactly
    /// when supplied.
    async fn find_by_patient(
        &self,
        name: &str,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<Appointment>, StoreError>;

    /// Returns `None` when the id is unknown. A successful update stamps
    /// `updated_at`.
    async fn update(&self, id: Uuid, update: AppointmentUpdate) -> Result<Option<Appointment>, StoreError>;

    async fn list(&self) -> Result<Vec<Appointment>, StoreError>;
}

#[derive(Default)]
pub struct InMemoryAppointmentStore {
    appointments: RwLock<Vec<Appointment>>,
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn create(&self, new: NewAppointment) -> Result<Appointment, StoreError> {
        let appointment = Appointment {
            id: Uuid::new_v4(),
            patient_name: new.patient_name,
            phone: new.phone,
            email: new.email,
            kind: new.kind,
            preferred_datetime: new.preferred_datetime,
            confirmed_datetime: new.confirmed_datetime,
            status: new.status,
            agent_notes: new.agent_notes,
            created_at: Utc::now(),
            updated_at: None,
        };

        debug!("storing appointment {}", appointment.id);
        self.appointments.write().await.push(appointment.clone());
        Ok(appointment)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>, StoreError> {
        Ok(self
            .appointments
            .read()
            .await
            .iter()
            .find(|apt| apt.id == id)
            .cloned())
    }

    async fn find_by_patient(
        &self,
        name: &str,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<Appointment>, StoreError> {
        Ok(self
            .appointments
            .read()
            .await
            .iter()
            .find(|apt| {
                apt.patient_name.eq_ignore_ascii_case(name.trim())
                    && phone.map_or(true, |p| apt.phone == p)
                    && email.map_or(true, |e| apt.email == e)
            })
            .cloned())
    }

    async fn update(&self, id: Uuid, update: AppointmentUpdate) -> Result<Option<Appointment>, StoreError> {
        let mut appointments = self.appointments.write().await;
        let Some(appointment) = appointments.iter_mut().find(|apt| apt.id == id) else {
            return Ok(None);
        };

        if let Some(status) = update.status {
            appointment.status = status;
        }
        if let Some(confirmed) = update.confirmed_datetime {
            appointment.confirmed_datetime = Some(confirmed);
        }
        if let Some(note) = update.append_note {
            if appointment.agent_notes.is_empty() {
                appointment.agent_notes = note;
            } else {
                appointment.agent_notes.push_str(" | ");
                appointment.agent_notes.push_str(&note);
            }
        }
        appointment.updated_at = Some(Utc::now());

        debug!("updated appointment {}", id);
        Ok(Some(appointment.clone()))
    }

    async fn list(&self) -> Result<Vec<Appointment>, StoreError> {
        Ok(self.appointments.read().await.clone())
    }
}
