// libs/appointment-cell/src/services/messages.rs
//
// Channel-neutral patient wording for orchestrator outcomes. Channels that
// need their own framing (the chat assistant) work from the outcome data
// instead; the voice webhooks reply with these strings verbatim.
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::models::{
    AvailabilityOutcome, BookingOutcome, CancelOutcome, FindOutcome, RescheduleOutcome,
};

/// "Tuesday, June 3rd"
pub fn format_day(date: NaiveDate) -> String {
    format!("{}{}", date.format("%A, %B %-d"), ordinal_suffix(date.day()))
}

/// "2:00 PM"
pub fn format_time(datetime: DateTime<Utc>, tz: Tz) -> String {
    datetime.with_timezone(&tz).format("%-I:%M %p").to_string()
}

/// "Tuesday, June 3rd at 2:00 PM"
pub fn format_day_at_time(datetime: DateTime<Utc>, tz: Tz) -> String {
    let local = datetime.with_timezone(&tz);
    format!("{} at {}", format_day(local.date_naive()), format_time(datetime, tz))
}

fn ordinal_suffix(day: u32) -> &'static str {
    match day {
        11..=13 => "th",
        _ => match day % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        },
    }
}

impl AvailabilityOutcome {
    pub fn patient_message(&self, tz: Tz, pharmacy_phone: &str) -> String {
        match self {
            AvailabilityOutcome::Open { date, starts, degraded } => {
                let times = starts
                    .iter()
                    .map(|start| format_time(*start, tz))
                    .collect::<Vec<_>>()
                    .join(", ");

                if *degraded {
                    format!(
                        "Our calendar system is temporarily unreachable, so these are our usual \
                         openings on {}: {}. We'll confirm your exact time with you by phone.",
                        format_day(*date),
                        times
                    )
                } else {
                    format!(
                        "Great! I have several available slots on {}: {}. Which time works best for you?",
                        format_day(*date),
                        times
                    )
                }
            }
            AvailabilityOutcome::DayFull { date, next: Some(next) } => format!(
                "I'm sorry, but we don't have any openings on {}. However, I do have availability \
                 on {}. Would that work for you?",
                format_day(*date),
                format_day_at_time(next.start, tz)
            ),
            AvailabilityOutcome::DayFull { date: _, next: None } => format!(
                "I'm sorry, but our schedule is quite full for the next two weeks. Let me connect \
                 you with our staff who can help find alternative options. Please call us directly \
                 at {}.",
                pharmacy_phone
            ),
            AvailabilityOutcome::Weekend { .. } => {
                "I'm sorry, but we're closed on weekends. Our pharmacy is open Monday through \
                 Friday, 9 AM to 5 PM. Would you like to check availability for a weekday instead?"
                    .to_string()
            }
        }
    }
}

impl BookingOutcome {
    pub fn patient_message(&self, tz: Tz, pharmacy_phone: &str) -> String {
        match self {
            BookingOutcome::Confirmed { appointment } => format!(
                "Perfect! I've successfully booked your {} appointment for {}. Your appointment \
                 confirmation number is {}. You'll receive a calendar invitation at {}. Is there \
                 anything else I can help you with today?",
                appointment.kind.label(),
                format_day_at_time(appointment.effective_datetime(), tz),
                appointment.id,
                appointment.email
            ),
            BookingOutcome::SlotTaken { suggestion: Some(slot), .. } => format!(
                "I'm sorry, but that time slot is no longer available. The next available \
                 appointment is {}. Would you like me to book that instead?",
                format_day_at_time(slot.start, tz)
            ),
            BookingOutcome::SlotTaken { suggestion: None, .. } => format!(
                "I apologize, but we don't have any available slots in the next two weeks. Let me \
                 connect you with our staff to discuss other options. Please call us at {}.",
                pharmacy_phone
            ),
            BookingOutcome::CalendarUnavailable => format!(
                "I encountered an issue while booking your appointment in our calendar. Please try \
                 again or call us directly at {}.",
                pharmacy_phone
            ),
            BookingOutcome::Failed => format!(
                "I apologize, but I encountered an issue while booking your appointment. Please \
                 try again or contact our pharmacy directly at {}.",
                pharmacy_phone
            ),
        }
    }
}

impl FindOutcome {
    pub fn patient_message(&self, tz: Tz, pharmacy_phone: &str) -> String {
        match self {
            FindOutcome::Found { appointment } => format!(
                "I found your appointment! You have a {} scheduled for {}. Your appointment \
                 confirmation number is {}. The status is {}. Would you like to make any changes \
                 to this appointment?",
                appointment.kind.label(),
                format_day_at_time(appointment.effective_datetime(), tz),
                appointment.id,
                appointment.status
            ),
            FindOutcome::NotFound { name, phone } => {
                let phone_clause = phone
                    .as_ref()
                    .map(|p| format!(" with phone number {}", p))
                    .unwrap_or_default();
                let ask_phone = if phone.is_none() {
                    " and provide your phone number"
                } else {
                    ""
                };
                format!(
                    "I couldn't find any appointments under the name {}{}. Could you please \
                     double-check the spelling of your name{}?",
                    name, phone_clause, ask_phone
                )
            }
            FindOutcome::Failed => format!(
                "I apologize, but I'm having trouble accessing our appointment system right now. \
                 Please try again in a moment or call our pharmacy directly at {}.",
                pharmacy_phone
            ),
        }
    }
}

impl CancelOutcome {
    pub fn patient_message(&self, tz: Tz, pharmacy_phone: &str) -> String {
        match self {
            CancelOutcome::Cancelled { appointment } => format!(
                "I've successfully cancelled your {} appointment that was scheduled for {}. If you \
                 need to schedule a new appointment, I'm happy to help you find an available time. \
                 Is there anything else I can assist you with?",
                appointment.kind.label(),
                format_day_at_time(appointment.effective_datetime(), tz)
            ),
            CancelOutcome::NotFound => format!(
                "I couldn't locate that appointment. Please double-check your confirmation number \
                 or name, or call our pharmacy directly at {} for assistance.",
                pharmacy_phone
            ),
            CancelOutcome::MissingIdentifier => {
                "To cancel your appointment, I'll need either your appointment confirmation number \
                 or your full name. Could you please provide one of those?"
                    .to_string()
            }
            CancelOutcome::Failed => format!(
                "I apologize, but I encountered an issue while cancelling your appointment. Please \
                 call our pharmacy directly at {} for immediate assistance.",
                pharmacy_phone
            ),
        }
    }
}

impl RescheduleOutcome {
    pub fn patient_message(&self, tz: Tz, pharmacy_phone: &str) -> String {
        match self {
            RescheduleOutcome::Rescheduled { appointment, new_start } => format!(
                "Perfect! I've successfully rescheduled your {} appointment to {}. You'll receive \
                 an updated calendar invitation. Is there anything else I can help you with today?",
                appointment.kind.label(),
                format_day_at_time(*new_start, tz)
            ),
            RescheduleOutcome::SlotTaken { suggestion: Some(slot) } => format!(
                "I'm sorry, but that new time slot isn't available. The next available appointment \
                 is {}. Would you like me to reschedule to that time instead?",
                format_day_at_time(slot.start, tz)
            ),
            RescheduleOutcome::SlotTaken { suggestion: None } => {
                "I apologize, but we don't have any available slots in the next two weeks. Would \
                 you prefer to keep your current appointment, or shall I connect you with our \
                 staff to discuss other options?"
                    .to_string()
            }
            RescheduleOutcome::NotFound => format!(
                "I couldn't locate that appointment. Please double-check your confirmation number \
                 or name, or call our pharmacy directly at {} for assistance.",
                pharmacy_phone
            ),
            RescheduleOutcome::MissingIdentifier => {
                "To reschedule your appointment, I'll need either your appointment confirmation \
                 number or your full name. Could you please provide one of those?"
                    .to_string()
            }
            RescheduleOutcome::Failed => format!(
                "I apologize, but I encountered an issue while rescheduling your appointment. \
                 Please call our pharmacy directly at {} for immediate assistance.",
                pharmacy_phone
            ),
        }
    }
}
