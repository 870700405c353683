// libs/voice-cell/src/services/functions.rs
use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde_json::Value;
use tracing::{info, warn};

use appointment_cell::{AppointmentKey, BookingRequest};
use assistant_cell::AppState;
use shared_models::{AppointmentKind, Channel};

use crate::models::{
    AvailabilityParams, BookingParams, CancelParams, FindParams, RescheduleParams,
};

const INVALID_DATE_MESSAGE: &str = "I apologize, but that date format isn't valid. Could you \
     please provide the date in a format like \"January 15th\" or \"01/15/2025\"?";

const INVALID_DATETIME_MESSAGE: &str = "I apologize, but there seems to be an issue with the \
     date format. Could you please tell me your preferred date and time again?";

const UNKNOWN_FUNCTION_MESSAGE: &str = "I apologize, but I don't recognize that function. How \
     can I help you with appointment scheduling?";

/// Route one platform function call into the shared booking orchestrator and
/// reduce its outcome to the spoken reply text. Parameter problems come back
/// as polite re-prompts, never as transport errors.
pub async fn dispatch(
    state: &AppState,
    function_name: &str,
    parameters: &Value,
    channel: Channel,
    now: DateTime<Utc>,
) -> String {
    info!("executing voice function {} via {}", function_name, channel);

    let tz = state.booking.timezone();
    let phone = state.booking.pharmacy_phone().to_string();

    match function_name {
        "checkAvailability" | "check_availability" => {
            let Ok(params) = serde_json::from_value::<AvailabilityParams>(parameters.clone()) else {
                return INVALID_DATE_MESSAGE.to_string();
            };
            let Some(date) = parse_date(&params.date, tz) else {
                return INVALID_DATE_MESSAGE.to_string();
            };

            let outcome = state.booking.check_availability(date, now).await;
            outcome.patient_message(tz, &phone)
        }

        "bookAppointment" | "book_appointment" => {
            let Ok(params) = serde_json::from_value::<BookingParams>(parameters.clone()) else {
                return INVALID_DATETIME_MESSAGE.to_string();
            };
            let Some(preferred) = parse_instant(&params.preferred_datetime, tz) else {
                return INVALID_DATETIME_MESSAGE.to_string();
            };
            let Ok(kind) = params.appointment_type.parse::<AppointmentKind>() else {
                return "Which service would you like to book: a flu shot, a consultation, a \
                        medication review, or a vaccination?"
                    .to_string();
            };

            let request = BookingRequest {
                patient_name: params.patient_name,
                phone: params.phone,
                email: params.email,
                kind,
                preferred_datetime: preferred,
            };

            let outcome = state.booking.book(request, channel, now).await;
            outcome.patient_message(tz, &phone)
        }

        "findAppointment" | "find_appointment" => {
            let Ok(params) = serde_json::from_value::<FindParams>(parameters.clone()) else {
                return "Could you give me the full name the appointment was booked under?"
                    .to_string();
            };

            let outcome = state
                .booking
                .find(
                    &params.patient_name,
                    params.phone.as_deref(),
                    params.email.as_deref(),
                )
                .await;
            outcome.patient_message(tz, &phone)
        }

        "cancelAppointment" | "cancel_appointment" => {
            let Ok(params) = serde_json::from_value::<CancelParams>(parameters.clone()) else {
                return "Could you give me your confirmation number or full name so I can look \
                        up the appointment?"
                    .to_string();
            };
            let key = AppointmentKey::from_parts(
                params.appointment_id.as_deref(),
                params.patient_name.as_deref(),
            );

            let outcome = state.booking.cancel(key, channel, now).await;
            outcome.patient_message(tz, &phone)
        }

        "rescheduleAppointment" | "reschedule_appointment" => {
            let Ok(params) = serde_json::from_value::<RescheduleParams>(parameters.clone()) else {
                return INVALID_DATETIME_MESSAGE.to_string();
            };
            let Some(new_datetime) = parse_instant(&params.new_datetime, tz) else {
                return INVALID_DATETIME_MESSAGE.to_string();
            };
            let key = AppointmentKey::from_parts(
                params.appointment_id.as_deref(),
                params.patient_name.as_deref(),
            );

            let outcome = state.booking.reschedule(key, new_datetime, channel, now).await;
            outcome.patient_message(tz, &phone)
        }

        other => {
            warn!("unknown voice function requested: {}", other);
            UNKNOWN_FUNCTION_MESSAGE.to_string()
        }
    }
}

/// ISO date, or a full timestamp whose date part is used.
fn parse_date(raw: &str, tz: Tz) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    parse_instant(raw, tz).map(|dt| dt.with_timezone(&tz).date_naive())
}

/// RFC 3339 timestamp, or a naive ISO timestamp interpreted in the business
/// time zone.
fn parse_instant(raw: &str, tz: Tz) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M"))
        .ok()?;

    match tz.from_local_datetime(&naive) {
        LocalResult::Single(local) => Some(local.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use chrono_tz::America::New_York;

    #[test]
    fn dates_parse_from_iso_and_timestamps() {
        assert_eq!(
            parse_date("2025-06-03", New_York),
            NaiveDate::from_ymd_opt(2025, 6, 3)
        );
        assert_eq!(
            parse_date("2025-06-03T14:00:00-04:00", New_York),
            NaiveDate::from_ymd_opt(2025, 6, 3)
        );
        assert_eq!(parse_date("June 3rd", New_York), None);
    }

    #[test]
    fn naive_timestamps_resolve_in_the_business_time_zone() {
        let instant = parse_instant("2025-06-03T14:00:00", New_York).expect("should parse");
        assert_eq!(instant.with_timezone(&New_York).hour(), 14);
        assert_eq!(instant, Utc.with_ymd_and_hms(2025, 6, 3, 18, 0, 0).unwrap());
    }
}
