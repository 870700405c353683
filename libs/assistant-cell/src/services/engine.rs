// libs/assistant-cell/src/services/engine.rs
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use appointment_cell::services::messages::{format_day, format_time};
use appointment_cell::{
    AppointmentKey, AvailabilityOutcome, BookingOutcome, BookingRequest, BookingService,
};
use dialogue_cell::services::{datetime, slots};
use dialogue_cell::{classify, ConversationSession, Intent, Role, SessionStore, SlotSet};
use shared_models::Channel;

/// How many open times the chat rendering lists before collapsing the rest
/// into an "and N more" suffix.
const CHAT_SLOT_DISPLAY_LIMIT: usize = 4;

/// The intent-driven state machine behind the free-text channels. One
/// instance serves every session; per-session serialization comes from the
/// session store's mutexes.
pub struct ConversationEngine {
    sessions: Arc<SessionStore>,
    booking: Arc<BookingService>,
    pharmacy_name: String,
}

impl ConversationEngine {
    pub fn new(sessions: Arc<SessionStore>, booking: Arc<BookingService>, pharmacy_name: String) -> Self {
        Self { sessions, booking, pharmacy_name }
    }

    /// Process one patient turn and produce the assistant's reply. Both
    /// turns are appended to the session transcript; an empty utterance is
    /// answered without mutating any state.
    pub async fn respond(
        &self,
        session_key: &str,
        utterance: &str,
        channel: Channel,
        now: DateTime<Utc>,
    ) -> String {
        let utterance = utterance.trim();
        if utterance.is_empty() {
            return "I didn't catch that. Could you tell me a bit more about what you need?"
                .to_string();
        }

        let session = self.sessions.get_or_create(session_key).await;
        let mut session = session.lock().await;

        session.push_turn(Role::Patient, utterance);
        let intent = classify(utterance, &session);
        debug!("session {} intent {:?}", session_key, intent);

        let reply = match intent {
            Intent::Greeting => self.greeting_message(),
            Intent::Booking | Intent::FluShot | Intent::Consultation | Intent::MedicationReview => {
                if let Some(kind) = intent.implied_kind() {
                    session.slots.kind = Some(kind);
                }
                self.booking_prompt(&session.slots)
            }
            Intent::ProvidingInfo | Intent::DatetimeInfo => {
                self.collect_info(&mut session, utterance, channel, now).await
            }
            Intent::CheckAvailability => self.availability_reply(utterance, now).await,
            Intent::Confirmation => self.confirmation_reply(&mut session, channel, now).await,
            Intent::ModifyAppointment => {
                self.modify_reply(&mut session, utterance, channel, now).await
            }
            Intent::GeneralInquiry => self.general_inquiry_message(utterance),
        };

        session.current_step = step_tag(intent).to_string();
        session.push_turn(Role::Assistant, reply.clone());
        reply
    }

    fn greeting_message(&self) -> String {
        format!(
            "Hello! I'm the {} scheduling assistant.\n\n\
             I can help you with:\n\
             • **Flu shots** and vaccinations\n\
             • **Pharmacist consultations**\n\
             • **Medication reviews**\n\
             • **Appointment scheduling**\n\n\
             What can I help you with today?",
            self.pharmacy_name
        )
    }

    fn booking_prompt(&self, slots: &SlotSet) -> String {
        let service = slots
            .kind
            .map(|kind| format!("a {}", kind.label()))
            .unwrap_or_else(|| "an appointment".to_string());

        format!(
            "Great! I'd be happy to help you book {}.\n\n\
             To get started, I'll need:\n\
             • Your **full name**\n\
             • **Phone number**\n\
             • **Email address**\n\
             • **Preferred date and time**\n\n\
             You can provide this all at once like:\n\
             \"My name is John Smith, phone 555-123-4567, email john@email.com, I'd prefer tomorrow at 2 PM\"\n\n\
             What information can you share with me?",
            service
        )
    }

    /// Merge whatever the utterance yields into the session SlotSet, then
    /// either attempt the booking (if that completed the set) or acknowledge
    /// what's captured and ask for exactly the missing pieces.
    async fn collect_info(
        &self,
        session: &mut ConversationSession,
        utterance: &str,
        channel: Channel,
        now: DateTime<Utc>,
    ) -> String {
        let patch = slots::extract(utterance, session, now, self.booking.timezone());
        session.slots.merge(patch);

        if session.slots.is_complete() {
            return self.attempt_booking(&session.slots, channel, now).await;
        }

        let tz = self.booking.timezone();
        let mut reply = String::from("Perfect! Let me collect your information:\n\n");
        if let Some(name) = &session.slots.patient_name {
            reply.push_str(&format!("• **Name:** {}\n", name));
        }
        if let Some(phone) = &session.slots.phone {
            reply.push_str(&format!("• **Phone:** {}\n", phone));
        }
        if let Some(email) = &session.slots.email {
            reply.push_str(&format!("• **Email:** {}\n", email));
        }
        if let Some(kind) = session.slots.kind {
            reply.push_str(&format!("• **Service:** {}\n", kind.label()));
        }
        if let Some(preferred) = session.slots.preferred_datetime {
            reply.push_str(&format!(
                "• **Preferred Time:** {} at {}\n",
                format_day(preferred.with_timezone(&tz).date_naive()),
                format_time(preferred, tz)
            ));
        }

        reply.push_str(&format!(
            "\n**Still need:** {}\n\nPlease provide the missing information.",
            session.slots.missing_fields().join(", ")
        ));
        reply
    }

    async fn attempt_booking(&self, slots: &SlotSet, channel: Channel, now: DateTime<Utc>) -> String {
        let Some(request) = booking_request_from(slots) else {
            return self.incomplete_confirmation_message(slots);
        };

        let outcome = self.booking.book(request, channel, now).await;
        match &outcome {
            BookingOutcome::Confirmed { appointment } => {
                let tz = self.booking.timezone();
                format!(
                    "**Appointment Confirmed!**\n\n\
                     **Details:**\n\
                     • **Name:** {}\n\
                     • **Service:** {}\n\
                     • **Date & Time:** {} at {}\n\
                     • **Duration:** 1 hour\n\
                     • **Confirmation #:** {}\n\n\
                     **What's Next:**\n\
                     • Please arrive 5 minutes early\n\
                     • Bring valid ID and insurance card\n\
                     • Call {} if you need to make changes\n\n\
                     Is there anything else I can help you with today?",
                    appointment.patient_name,
                    appointment.kind.label(),
                    format_day(appointment.effective_datetime().with_timezone(&tz).date_naive()),
                    format_time(appointment.effective_datetime(), tz),
                    appointment.id,
                    self.booking.pharmacy_phone()
                )
            }
            _ => outcome.patient_message(self.booking.timezone(), self.booking.pharmacy_phone()),
        }
    }

    async fn availability_reply(&self, utterance: &str, now: DateTime<Utc>) -> String {
        let tz = self.booking.timezone();
        let Some(requested) = datetime::parse_datetime(utterance, now, tz) else {
            return "I can check our availability! Our pharmacy hours are:\n\n\
                    **Monday - Friday:** 9:00 AM - 5:00 PM\n\
                    **Weekends:** Closed\n\n\
                    What date are you interested in? You can say:\n\
                    • \"Tomorrow afternoon\"\n\
                    • \"Next Wednesday at 2 PM\""
                .to_string();
        };

        let date = requested.with_timezone(&tz).date_naive();
        let outcome = self.booking.check_availability(date, now).await;

        match &outcome {
            AvailabilityOutcome::Open { date, starts, degraded: false } => {
                let shown = starts
                    .iter()
                    .take(CHAT_SLOT_DISPLAY_LIMIT)
                    .map(|start| format_time(*start, tz))
                    .collect::<Vec<_>>()
                    .join(", ");
                let overflow = if starts.len() > CHAT_SLOT_DISPLAY_LIMIT {
                    format!(" and {} more slots", starts.len() - CHAT_SLOT_DISPLAY_LIMIT)
                } else {
                    String::new()
                };

                format!(
                    "Great! For **{}**, I have these available times:\n\n{}{}\n\n\
                     Which time works best for you?",
                    format_day(*date),
                    shown,
                    overflow
                )
            }
            _ => outcome.patient_message(tz, self.booking.pharmacy_phone()),
        }
    }

    async fn confirmation_reply(
        &self,
        session: &mut ConversationSession,
        channel: Channel,
        now: DateTime<Utc>,
    ) -> String {
        if session.slots.is_complete() {
            self.attempt_booking(&session.slots, channel, now).await
        } else {
            self.incomplete_confirmation_message(&session.slots)
        }
    }

    fn incomplete_confirmation_message(&self, slots: &SlotSet) -> String {
        format!(
            "I'd be happy to confirm your appointment! Let me make sure I have all your \
             information first.\n\nPlease provide:\n{}",
            slots
                .missing_fields()
                .iter()
                .map(|field| format!("• Your **{}**", field))
                .collect::<Vec<_>>()
                .join("\n")
        )
    }

    /// Cancel or reschedule, as soon as an identifier is on hand. The
    /// utterance itself is mined first so "cancel it, my name is Jane Doe"
    /// works in one turn.
    async fn modify_reply(
        &self,
        session: &mut ConversationSession,
        utterance: &str,
        channel: Channel,
        now: DateTime<Utc>,
    ) -> String {
        let tz = self.booking.timezone();
        let patch = slots::extract(utterance, session, now, tz);
        session.slots.merge(patch);

        let wants_cancel = utterance.to_lowercase().contains("cancel");
        let action = if wants_cancel { "cancel" } else { "reschedule" };

        let Some(name) = session.slots.patient_name.clone() else {
            let follow_up = if wants_cancel {
                "cancel it for you"
            } else {
                "help you pick a new time"
            };
            return format!(
                "I can help you {} your appointment.\n\n\
                 To look up your appointment, please provide:\n\
                 • Your **full name**\n\
                 • **Phone number** OR **email address**\n\n\
                 Once I find your appointment, I can {}.",
                action, follow_up
            );
        };

        let key = Some(AppointmentKey::Patient {
            name,
            phone: session.slots.phone.clone(),
            email: session.slots.email.clone(),
        });

        if wants_cancel {
            let outcome = self.booking.cancel(key, channel, now).await;
            return outcome.patient_message(tz, self.booking.pharmacy_phone());
        }

        let Some(new_datetime) = datetime::parse_datetime(utterance, now, tz) else {
            return "Happy to reschedule! What new date and time would you like? You can say \
                    \"tomorrow at 2 PM\" or \"next Wednesday morning\"."
                .to_string();
        };

        let outcome = self.booking.reschedule(key, new_datetime, channel, now).await;
        outcome.patient_message(tz, self.booking.pharmacy_phone())
    }

    fn general_inquiry_message(&self, utterance: &str) -> String {
        format!(
            "I understand you're asking about \"{}\".\n\n\
             As your pharmacy assistant, I'm here to help with:\n\
             • **Booking appointments** (flu shots, consultations, medication reviews)\n\
             • **Checking availability**\n\
             • **Managing existing appointments**\n\n\
             How can I assist you with scheduling today?",
            utterance
        )
    }
}

fn booking_request_from(slots: &SlotSet) -> Option<BookingRequest> {
    Some(BookingRequest {
        patient_name: slots.patient_name.clone()?,
        phone: slots.phone.clone()?,
        email: slots.email.clone()?,
        kind: slots.kind?,
        preferred_datetime: slots.preferred_datetime?,
    })
}

fn step_tag(intent: Intent) -> &'static str {
    match intent {
        Intent::Greeting => "greeting",
        Intent::Booking => "booking",
        Intent::FluShot => "flu_shot",
        Intent::Consultation => "consultation",
        Intent::MedicationReview => "medication_review",
        Intent::ProvidingInfo => "providing_info",
        Intent::DatetimeInfo => "datetime_info",
        Intent::CheckAvailability => "check_availability",
        Intent::ModifyAppointment => "modify_appointment",
        Intent::Confirmation => "confirmation",
        Intent::GeneralInquiry => "general_inquiry",
    }
}
