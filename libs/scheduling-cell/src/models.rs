// libs/scheduling-cell/src/models.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==============================================================================
// AVAILABILITY MODELS
// ==============================================================================

/// A bookable calendar interval, half-open [start, end).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub available: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Whether a day's slots came from the live calendar or from the static
/// fallback pattern used when the collaborator is unreachable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvailabilitySource {
    Live,
    Degraded(String),
}

impl AvailabilitySource {
    pub fn is_degraded(&self) -> bool {
        matches!(self, AvailabilitySource::Degraded(_))
    }
}

#[derive(Debug, Clone)]
pub struct DayAvailability {
    pub date: NaiveDate,
    pub slots: Vec<TimeSlot>,
    pub source: AvailabilitySource,
}

impl DayAvailability {
    pub fn open_slots(&self) -> impl Iterator<Item = &TimeSlot> {
        self.slots.iter().filter(|slot| slot.available)
    }
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CalendarError {
    #[error("calendar request failed: {0}")]
    Request(String),

    #[error("calendar API error ({status}): {message}")]
    Api { status: u16, message: String },
}
