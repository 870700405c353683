// libs/voice-cell/src/models.rs
//
// Function-call parameter shapes shared by both voice platforms. One dialect
// sends camelCase keys, the other snake_case; serde aliases accept both so a
// single dispatch path serves the two webhooks.
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AvailabilityParams {
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct BookingParams {
    #[serde(alias = "patientName")]
    pub patient_name: String,
    pub email: String,
    pub phone: String,
    #[serde(alias = "appointmentType")]
    pub appointment_type: String,
    #[serde(alias = "preferredDateTime")]
    pub preferred_datetime: String,
}

#[derive(Debug, Deserialize)]
pub struct FindParams {
    #[serde(alias = "patientName")]
    pub patient_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CancelParams {
    #[serde(default, alias = "appointmentId")]
    pub appointment_id: Option<String>,
    #[serde(default, alias = "patientName")]
    pub patient_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RescheduleParams {
    #[serde(default, alias = "appointmentId")]
    pub appointment_id: Option<String>,
    #[serde(default, alias = "patientName")]
    pub patient_name: Option<String>,
    #[serde(alias = "newDateTime")]
    pub new_datetime: String,
}
