use std::fmt;

use serde::{Deserialize, Serialize};

/// Which entry transport a turn or booking came through. Recorded in
/// appointment audit notes so staff can see where a change originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Chat,
    VoiceCamel,
    VoiceSnake,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Chat => write!(f, "chat assistant"),
            Channel::VoiceCamel => write!(f, "voice agent"),
            Channel::VoiceSnake => write!(f, "phone agent"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentKind {
    #[serde(alias = "fluShot", alias = "flu shot")]
    FluShot,
    #[serde(alias = "consult")]
    Consultation,
    #[serde(alias = "medicationReview", alias = "medication review", alias = "med_review")]
    MedicationReview,
    #[serde(alias = "vaccine")]
    Vaccination,
}

impl AppointmentKind {
    /// Human wording used in patient-facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            AppointmentKind::FluShot => "flu shot",
            AppointmentKind::Consultation => "consultation",
            AppointmentKind::MedicationReview => "medication review",
            AppointmentKind::Vaccination => "vaccination",
        }
    }
}

impl fmt::Display for AppointmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentKind::FluShot => write!(f, "flu_shot"),
            AppointmentKind::Consultation => write!(f, "consultation"),
            AppointmentKind::MedicationReview => write!(f, "medication_review"),
            AppointmentKind::Vaccination => write!(f, "vaccination"),
        }
    }
}

impl std::str::FromStr for AppointmentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "flu_shot" | "flushot" => Ok(AppointmentKind::FluShot),
            "consultation" | "consult" => Ok(AppointmentKind::Consultation),
            "medication_review" | "med_review" => Ok(AppointmentKind::MedicationReview),
            "vaccination" | "vaccine" => Ok(AppointmentKind::Vaccination),
            other => Err(format!("unknown appointment kind: {}", other)),
        }
    }
}
