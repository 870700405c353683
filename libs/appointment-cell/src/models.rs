// libs/appointment-cell/src/models.rs
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use scheduling_cell::TimeSlot;
use shared_models::AppointmentKind;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_name: String,
    pub phone: String,
    pub email: String,
    pub kind: AppointmentKind,
    pub preferred_datetime: DateTime<Utc>,
    pub confirmed_datetime: Option<DateTime<Utc>>,
    pub status: AppointmentStatus,
    /// Append-only audit trail; entries are ` | `-separated.
    pub agent_notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Appointment {
    /// The instant the patient should show up at: the confirmed time once
    /// one exists, otherwise what they asked for.
    pub fn effective_datetime(&self) -> DateTime<Utc> {
        self.confirmed_datetime.unwrap_or(self.preferred_datetime)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
    Rescheduled,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::Rescheduled => write!(f, "rescheduled"),
        }
    }
}

/// Appointment fields as the orchestrator hands them to the store; the store
/// assigns the id and creation timestamp.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub patient_name: String,
    pub phone: String,
    pub email: String,
    pub kind: AppointmentKind,
    pub preferred_datetime: DateTime<Utc>,
    pub confirmed_datetime: Option<DateTime<Utc>>,
    pub status: AppointmentStatus,
    pub agent_notes: String,
}

#[derive(Debug, Clone, Default)]
pub struct AppointmentUpdate {
    pub status: Option<AppointmentStatus>,
    pub confirmed_datetime: Option<DateTime<Utc>>,
    pub append_note: Option<String>,
}

/// How a patient identifies an existing appointment: confirmation number, or
/// name plus optional phone/email disambiguators.
#[derive(Debug, Clone)]
pub enum AppointmentKey {
    Id(Uuid),
    Patient {
        name: String,
        phone: Option<String>,
        email: Option<String>,
    },
}

impl AppointmentKey {
    /// Build a key from the loosely-typed identifiers a channel hands over.
    /// An unparsable id falls through to the name when one is present.
    pub fn from_parts(id: Option<&str>, name: Option<&str>) -> Option<Self> {
        if let Some(id) = id.filter(|v| !v.trim().is_empty()) {
            if let Ok(uuid) = Uuid::parse_str(id.trim()) {
                return Some(AppointmentKey::Id(uuid));
            }
        }
        name.filter(|n| !n.trim().is_empty()).map(|n| AppointmentKey::Patient {
            name: n.trim().to_string(),
            phone: None,
            email: None,
        })
    }
}

// ==============================================================================
// ORCHESTRATOR REQUEST/OUTCOME MODELS
// ==============================================================================

#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub patient_name: String,
    pub phone: String,
    pub email: String,
    pub kind: AppointmentKind,
    pub preferred_datetime: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub enum AvailabilityOutcome {
    /// At least one bookable slot that day. `degraded` marks fallback data
    /// served while the calendar collaborator is unreachable.
    Open {
        date: NaiveDate,
        starts: Vec<DateTime<Utc>>,
        degraded: bool,
    },
    /// Nothing open that day; `next` is the nearest future alternative, if
    /// any exists inside the search horizon.
    DayFull {
        date: NaiveDate,
        next: Option<TimeSlot>,
    },
    Weekend {
        date: NaiveDate,
    },
}

#[derive(Debug, Clone)]
pub enum BookingOutcome {
    Confirmed {
        appointment: Appointment,
    },
    /// The preferred hour is taken; carries a suggestion when the horizon
    /// search found one. Never auto-books the alternative.
    SlotTaken {
        preferred: DateTime<Utc>,
        suggestion: Option<TimeSlot>,
    },
    /// The calendar write failed; nothing was persisted.
    CalendarUnavailable,
    /// The appointment store failed after the calendar accepted the event.
    Failed,
}

#[derive(Debug, Clone)]
pub enum FindOutcome {
    Found {
        appointment: Appointment,
    },
    NotFound {
        name: String,
        phone: Option<String>,
    },
    Failed,
}

#[derive(Debug, Clone)]
pub enum CancelOutcome {
    Cancelled { appointment: Appointment },
    NotFound,
    MissingIdentifier,
    Failed,
}

#[derive(Debug, Clone)]
pub enum RescheduleOutcome {
    Rescheduled {
        appointment: Appointment,
        new_start: DateTime<Utc>,
    },
    SlotTaken {
        suggestion: Option<TimeSlot>,
    },
    NotFound,
    MissingIdentifier,
    Failed,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("appointment store error: {0}")]
    Backend(String),
}
