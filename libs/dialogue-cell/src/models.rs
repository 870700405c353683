// libs/dialogue-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shared_models::AppointmentKind;

// ==============================================================================
// CONVERSATION MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Patient,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// One continuous conversation, identified by a caller-supplied or generated
/// key. Lives for the process lifetime; there is no eviction.
#[derive(Debug, Clone)]
pub struct ConversationSession {
    pub key: String,
    pub turns: Vec<Turn>,
    pub slots: SlotSet,
    pub current_step: String,
}

impl ConversationSession {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            turns: Vec::new(),
            slots: SlotSet::default(),
            current_step: "greeting".to_string(),
        }
    }

    pub fn push_turn(&mut self, role: Role, text: impl Into<String>) {
        self.turns.push(Turn {
            role,
            text: text.into(),
            timestamp: Utc::now(),
        });
    }

    /// Texts of the most recent patient/assistant turns, newest last.
    pub fn recent_texts(&self, count: usize) -> impl Iterator<Item = &str> {
        let skip = self.turns.len().saturating_sub(count);
        self.turns.iter().skip(skip).map(|t| t.text.as_str())
    }
}

// ==============================================================================
// INTENTS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    Booking,
    FluShot,
    Consultation,
    MedicationReview,
    ProvidingInfo,
    DatetimeInfo,
    CheckAvailability,
    ModifyAppointment,
    Confirmation,
    GeneralInquiry,
}

impl Intent {
    /// Service-specific intents carry an appointment kind with them.
    pub fn implied_kind(&self) -> Option<AppointmentKind> {
        match self {
            Intent::FluShot => Some(AppointmentKind::FluShot),
            Intent::Consultation => Some(AppointmentKind::Consultation),
            Intent::MedicationReview => Some(AppointmentKind::MedicationReview),
            _ => None,
        }
    }
}

// ==============================================================================
// SLOT-FILLING MODELS
// ==============================================================================

/// The accumulated booking request. Fields are independent and
/// last-write-wins: a later turn only replaces a field when it supplies a new
/// non-empty value for it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotSet {
    pub patient_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub kind: Option<AppointmentKind>,
    pub preferred_datetime: Option<DateTime<Utc>>,
}

/// Fields pulled out of a single utterance, to be merged into a session's
/// SlotSet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotPatch {
    pub patient_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub kind: Option<AppointmentKind>,
    pub preferred_datetime: Option<DateTime<Utc>>,
}

impl SlotPatch {
    pub fn is_empty(&self) -> bool {
        self.patient_name.is_none()
            && self.phone.is_none()
            && self.email.is_none()
            && self.kind.is_none()
            && self.preferred_datetime.is_none()
    }
}

impl SlotSet {
    pub fn merge(&mut self, patch: SlotPatch) {
        if let Some(name) = patch.patient_name.filter(|n| !n.trim().is_empty()) {
            self.patient_name = Some(name);
        }
        if let Some(phone) = patch.phone.filter(|p| !p.trim().is_empty()) {
            self.phone = Some(phone);
        }
        if let Some(email) = patch.email.filter(|e| !e.trim().is_empty()) {
            self.email = Some(email);
        }
        if let Some(kind) = patch.kind {
            self.kind = Some(kind);
        }
        if let Some(datetime) = patch.preferred_datetime {
            self.preferred_datetime = Some(datetime);
        }
    }

    pub fn is_complete(&self) -> bool {
        self.patient_name.is_some()
            && self.phone.is_some()
            && self.email.is_some()
            && self.kind.is_some()
            && self.preferred_datetime.is_some()
    }

    /// Human-readable labels for every unset field, used to prompt for
    /// exactly the missing pieces.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.patient_name.is_none() {
            missing.push("full name");
        }
        if self.phone.is_none() {
            missing.push("phone number");
        }
        if self.email.is_none() {
            missing.push("email address");
        }
        if self.kind.is_none() {
            missing.push("appointment type (flu shot, consultation, or medication review)");
        }
        if self.preferred_datetime.is_none() {
            missing.push("preferred date and time");
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn merge_keeps_existing_fields_when_patch_is_partial() {
        let mut slots = SlotSet {
            patient_name: Some("Jane Doe".to_string()),
            phone: Some("555-123-4567".to_string()),
            ..SlotSet::default()
        };

        slots.merge(SlotPatch {
            email: Some("jane@x.com".to_string()),
            ..SlotPatch::default()
        });

        assert_eq!(slots.patient_name.as_deref(), Some("Jane Doe"));
        assert_eq!(slots.phone.as_deref(), Some("555-123-4567"));
        assert_eq!(slots.email.as_deref(), Some("jane@x.com"));
    }

    #[test]
    fn merge_is_last_write_wins_per_field() {
        let mut slots = SlotSet::default();
        slots.merge(SlotPatch {
            email: Some("first@x.com".to_string()),
            ..SlotPatch::default()
        });
        slots.merge(SlotPatch {
            email: Some("second@x.com".to_string()),
            ..SlotPatch::default()
        });

        assert_eq!(slots.email.as_deref(), Some("second@x.com"));
    }

    #[test]
    fn merge_ignores_empty_values() {
        let mut slots = SlotSet {
            patient_name: Some("Jane Doe".to_string()),
            ..SlotSet::default()
        };
        slots.merge(SlotPatch {
            patient_name: Some("   ".to_string()),
            ..SlotPatch::default()
        });

        assert_eq!(slots.patient_name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn complete_requires_all_five_fields() {
        let mut slots = SlotSet {
            patient_name: Some("Jane Doe".to_string()),
            phone: Some("555-123-4567".to_string()),
            email: Some("jane@x.com".to_string()),
            kind: Some(shared_models::AppointmentKind::FluShot),
            preferred_datetime: None,
        };
        assert!(!slots.is_complete());
        assert_eq!(slots.missing_fields(), vec!["preferred date and time"]);

        slots.preferred_datetime = Some(Utc.with_ymd_and_hms(2025, 6, 2, 18, 0, 0).unwrap());
        assert!(slots.is_complete());
        assert!(slots.missing_fields().is_empty());
    }
}
