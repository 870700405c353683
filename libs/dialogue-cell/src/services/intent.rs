// libs/dialogue-cell/src/services/intent.rs
use regex::Regex;
use tracing::debug;

use crate::models::{ConversationSession, Intent};

/// How a single classification rule decides whether it fires.
#[derive(Debug, Clone, Copy)]
pub enum RuleMatcher {
    /// Fires when the lowercased utterance contains any of the tokens.
    AnyToken(&'static [&'static str]),
    /// Fires on an email address, a 10-digit phone number, or a
    /// self-identification phrase.
    ContactDetails,
}

pub struct IntentRule {
    pub intent: Intent,
    pub matcher: RuleMatcher,
}

/// The classification priority chain. Order matters: rules are evaluated
/// top-to-bottom and the first match wins.
pub const INTENT_RULES: &[IntentRule] = &[
    IntentRule {
        intent: Intent::Greeting,
        matcher: RuleMatcher::AnyToken(&["hello", "hi", "hey"]),
    },
    IntentRule {
        intent: Intent::Booking,
        matcher: RuleMatcher::AnyToken(&["book", "appointment", "schedule"]),
    },
    IntentRule {
        intent: Intent::FluShot,
        matcher: RuleMatcher::AnyToken(&["flu shot", "vaccination", "vaccine"]),
    },
    IntentRule {
        intent: Intent::Consultation,
        matcher: RuleMatcher::AnyToken(&["consultation", "consult"]),
    },
    IntentRule {
        intent: Intent::MedicationReview,
        matcher: RuleMatcher::AnyToken(&["medication review", "med review"]),
    },
    IntentRule {
        intent: Intent::ProvidingInfo,
        matcher: RuleMatcher::ContactDetails,
    },
    IntentRule {
        intent: Intent::DatetimeInfo,
        matcher: RuleMatcher::AnyToken(&[
            "tomorrow", "today", "monday", "tuesday", "wednesday", "thursday", "friday", "am",
            "pm", ":",
        ]),
    },
    IntentRule {
        intent: Intent::CheckAvailability,
        matcher: RuleMatcher::AnyToken(&["availability", "available", "free"]),
    },
    IntentRule {
        intent: Intent::ModifyAppointment,
        matcher: RuleMatcher::AnyToken(&["cancel", "reschedule"]),
    },
    IntentRule {
        intent: Intent::Confirmation,
        matcher: RuleMatcher::AnyToken(&["yes", "confirm", "book it"]),
    },
];

fn rule_fires(matcher: &RuleMatcher, utterance: &str, lowercased: &str) -> bool {
    match matcher {
        RuleMatcher::AnyToken(tokens) => tokens.iter().any(|token| lowercased.contains(token)),
        RuleMatcher::ContactDetails => {
            let email = Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").unwrap();
            let phone = Regex::new(r"\d{3}[-.]?\d{3}[-.]?\d{4}").unwrap();
            email.is_match(utterance)
                || phone.is_match(utterance)
                || lowercased.contains("my name is")
                || lowercased.contains("i am")
                || lowercased.contains("i'm")
        }
    }
}

/// Classify a patient utterance. Pure function of the utterance text and the
/// session's turn count: the first turn of a session is always a greeting.
pub fn classify(utterance: &str, session: &ConversationSession) -> Intent {
    let lowercased = utterance.to_lowercase();

    if session.turns.len() <= 1 {
        return Intent::Greeting;
    }

    for rule in INTENT_RULES {
        if rule_fires(&rule.matcher, utterance, &lowercased) {
            debug!("intent {:?} for utterance {:?}", rule.intent, utterance);
            return rule.intent;
        }
    }

    Intent::GeneralInquiry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn session_with_history() -> ConversationSession {
        let mut session = ConversationSession::new("test");
        session.push_turn(Role::Patient, "hello");
        session.push_turn(Role::Assistant, "How can I help?");
        session.push_turn(Role::Patient, "placeholder");
        session
    }

    #[test]
    fn first_turn_is_always_greeting() {
        let mut session = ConversationSession::new("test");
        session.push_turn(Role::Patient, "I need a flu shot");
        assert_eq!(classify("I need a flu shot", &session), Intent::Greeting);
    }

    #[test]
    fn rule_table_classifies_each_intent() {
        let session = session_with_history();
        let cases = [
            ("hello there", Intent::Greeting),
            // "something" would greet: "hi" matches inside "thing".
            ("I want to book a visit", Intent::Booking),
            ("do you do vaccinations?", Intent::FluShot),
            ("I'd like a consultation", Intent::Consultation),
            ("need a medication review", Intent::MedicationReview),
            ("jane@x.com", Intent::ProvidingInfo),
            ("555-123-4567", Intent::ProvidingInfo),
            ("my name is Jane Doe", Intent::ProvidingInfo),
            ("tomorrow works", Intent::DatetimeInfo),
            ("2pm on wednesday", Intent::DatetimeInfo),
            ("what times are available?", Intent::CheckAvailability),
            ("I need to cancel", Intent::ModifyAppointment),
            ("yes", Intent::Confirmation),
            ("where are you located?", Intent::GeneralInquiry),
        ];

        for (utterance, expected) in cases {
            assert_eq!(classify(utterance, &session), expected, "utterance: {}", utterance);
        }
    }

    #[test]
    fn booking_outranks_service_and_datetime_rules() {
        let session = session_with_history();
        assert_eq!(
            classify("I want to schedule a flu shot tomorrow", &session),
            Intent::Booking
        );
    }

    #[test]
    fn service_rule_reachable_without_booking_words() {
        let session = session_with_history();
        assert_eq!(classify("just the flu shot please", &session), Intent::FluShot);
    }

    #[test]
    fn booking_tokens_outrank_modify_tokens() {
        // "cancel my appointment" carries a booking token, which sits higher
        // in the chain; bare "cancel" is what reaches the modify rule.
        let session = session_with_history();
        assert_eq!(classify("cancel my appointment", &session), Intent::Booking);
        assert_eq!(classify("I need to cancel", &session), Intent::ModifyAppointment);
    }
}
