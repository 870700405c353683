// libs/dialogue-cell/src/services/datetime.rs
use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use regex::Regex;

/// Parse a relative natural-language date-time expression into an instant.
///
/// Only two forms are recognized: "tomorrow" (defaulting to 2 PM) and
/// "next <weekday>" (defaulting to 10 AM), each optionally overridden by an
/// "<hour> am/pm" token. Anything else returns `None` so the caller can
/// re-prompt rather than guess. Resolution happens in the business time zone.
pub fn parse_datetime(text: &str, now: DateTime<Utc>, tz: Tz) -> Option<DateTime<Utc>> {
    let lowercased = text.to_lowercase();
    let local_now = now.with_timezone(&tz);

    if lowercased.contains("tomorrow") {
        let date = local_now.date_naive() + Duration::days(1);
        let hour = parse_clock_hour(text).unwrap_or(14);
        return local_instant(date, hour, tz);
    }

    let next_day = Regex::new(r"(?i)next\s+(monday|tuesday|wednesday|thursday|friday)").unwrap();
    if let Some(captures) = next_day.captures(text) {
        let target = weekday_index(&captures[1].to_lowercase());
        let current = local_now.weekday().num_days_from_sunday() as i64;

        let mut days_ahead = target - current;
        if days_ahead <= 0 {
            days_ahead += 7;
        }

        let date = local_now.date_naive() + Duration::days(days_ahead);
        let hour = parse_clock_hour(text).unwrap_or(10);
        return local_instant(date, hour, tz);
    }

    None
}

/// 12-hour clock with an am/pm marker: "2pm" -> 14, "12 am" -> 0, "12pm" -> 12.
pub fn parse_clock_hour(text: &str) -> Option<u32> {
    let clock = Regex::new(r"(?i)(\d{1,2})\s*(am|pm)").unwrap();
    let captures = clock.captures(text)?;

    let mut hour: u32 = captures[1].parse().ok()?;
    if hour > 12 {
        return None;
    }
    let meridiem = captures[2].to_lowercase();

    if meridiem == "pm" && hour != 12 {
        hour += 12;
    }
    if meridiem == "am" && hour == 12 {
        hour = 0;
    }

    Some(hour)
}

fn weekday_index(name: &str) -> i64 {
    // Sunday-based, matching Weekday::num_days_from_sunday.
    match name {
        "sunday" => 0,
        "monday" => 1,
        "tuesday" => 2,
        "wednesday" => 3,
        "thursday" => 4,
        "friday" => 5,
        _ => 6,
    }
}

fn local_instant(date: NaiveDate, hour: u32, tz: Tz) -> Option<DateTime<Utc>> {
    let naive = date.and_hms_opt(hour, 0, 0)?;
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(local) => Some(local.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => None,
    }
}
