// libs/dialogue-cell/src/services/slots.rs
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use regex::Regex;
use tracing::debug;

use shared_models::AppointmentKind;

use crate::models::{ConversationSession, SlotPatch};
use crate::services::datetime;

/// How far back the kind back-fill looks in the transcript.
const KIND_LOOKBACK_TURNS: usize = 5;

/// Pull structured booking fields out of a free-text utterance. Each pattern
/// is applied independently; the appointment kind additionally back-fills
/// from recent transcript turns when the session hasn't pinned one yet.
pub fn extract(
    utterance: &str,
    session: &ConversationSession,
    now: DateTime<Utc>,
    tz: Tz,
) -> SlotPatch {
    let email = Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").unwrap();
    let phone = Regex::new(r"\d{3}[-.]?\d{3}[-.]?\d{4}").unwrap();
    let name = Regex::new(
        r"(?i)(?:my name is|name is|i'm|i am|my name)\s+([A-Za-z][A-Za-z ]*?)(?:,|\s+phone|\s+email|\s+\d|$)",
    )
    .unwrap();

    let mut patch = SlotPatch {
        email: email.find(utterance).map(|m| m.as_str().to_string()),
        phone: phone.find(utterance).map(|m| m.as_str().to_string()),
        patient_name: name
            .captures(utterance)
            .map(|c| c[1].trim().to_string())
            .filter(|n| !n.is_empty()),
        kind: kind_from_text(utterance),
        preferred_datetime: datetime::parse_datetime(utterance, now, tz),
    };

    if patch.kind.is_none() && session.slots.kind.is_none() {
        patch.kind = session
            .recent_texts(KIND_LOOKBACK_TURNS)
            .filter_map(kind_from_text)
            .next();
    }

    if !patch.is_empty() {
        debug!("extracted slot patch from utterance: {:?}", patch);
    }

    patch
}

/// Appointment kind keywords, checked most-specific first so "flu shot"
/// isn't swallowed by the generic vaccination wording.
pub fn kind_from_text(text: &str) -> Option<AppointmentKind> {
    let lowercased = text.to_lowercase();

    if lowercased.contains("flu shot") {
        Some(AppointmentKind::FluShot)
    } else if lowercased.contains("medication review") || lowercased.contains("med review") {
        Some(AppointmentKind::MedicationReview)
    } else if lowercased.contains("consultation") || lowercased.contains("consult") {
        Some(AppointmentKind::Consultation)
    } else if lowercased.contains("vaccination") || lowercased.contains("vaccine") {
        Some(AppointmentKind::Vaccination)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use chrono::TimeZone;
    use chrono_tz::America::New_York;

    fn empty_session() -> ConversationSession {
        ConversationSession::new("test")
    }

    // Monday 2025-06-02 10:00 ET.
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 14, 0, 0).unwrap()
    }

    #[test]
    fn extracts_email_exactly_as_matched() {
        let patch = extract("reach me at jane.doe+rx@mail.example.org thanks", &empty_session(), now(), New_York);
        assert_eq!(patch.email.as_deref(), Some("jane.doe+rx@mail.example.org"));
    }

    #[test]
    fn extracts_phone_with_mixed_separators() {
        let patch = extract("call 555.123-4567 after lunch", &empty_session(), now(), New_York);
        assert_eq!(patch.phone.as_deref(), Some("555.123-4567"));
    }

    #[test]
    fn extracts_name_from_self_identification() {
        let patch = extract("Hi, my name is Jane Doe, phone 555-123-4567", &empty_session(), now(), New_York);
        assert_eq!(patch.patient_name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn name_capture_stops_before_email_keyword() {
        let patch = extract("I'm John Smith email john@x.com", &empty_session(), now(), New_York);
        assert_eq!(patch.patient_name.as_deref(), Some("John Smith"));
        assert_eq!(patch.email.as_deref(), Some("john@x.com"));
    }

    #[test]
    fn full_single_utterance_fills_every_field() {
        let patch = extract(
            "My name is Jane Doe, phone 555-123-4567, email jane@x.com, tomorrow at 2pm, flu shot",
            &empty_session(),
            now(),
            New_York,
        );

        assert_eq!(patch.patient_name.as_deref(), Some("Jane Doe"));
        assert_eq!(patch.phone.as_deref(), Some("555-123-4567"));
        assert_eq!(patch.email.as_deref(), Some("jane@x.com"));
        assert_eq!(patch.kind, Some(AppointmentKind::FluShot));
        let local = patch.preferred_datetime.expect("datetime").with_timezone(&New_York);
        assert_eq!(local.format("%Y-%m-%d %H:%M").to_string(), "2025-06-03 14:00");
    }

    #[test]
    fn kind_backfills_from_recent_turns() {
        let mut session = empty_session();
        session.push_turn(Role::Patient, "I'd like a flu shot");
        session.push_turn(Role::Assistant, "Happy to help with that.");

        let patch = extract("tomorrow at 3pm", &session, now(), New_York);
        assert_eq!(patch.kind, Some(AppointmentKind::FluShot));
    }

    #[test]
    fn kind_backfill_skipped_when_session_already_has_one() {
        let mut session = empty_session();
        session.slots.kind = Some(AppointmentKind::Consultation);
        session.push_turn(Role::Patient, "I'd like a flu shot");

        let patch = extract("tomorrow at 3pm", &session, now(), New_York);
        assert_eq!(patch.kind, None);
    }

    #[test]
    fn no_matches_produce_an_empty_patch() {
        let patch = extract("what are your hours?", &empty_session(), now(), New_York);
        assert!(patch.is_empty());
    }
}
