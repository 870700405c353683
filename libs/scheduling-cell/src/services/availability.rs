// libs/scheduling-cell/src/services/availability.rs
use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::models::{AvailabilitySource, BusyInterval, DayAvailability, TimeSlot};
use crate::services::calendar::CalendarApi;

const BUSINESS_START_HOUR: u32 = 9;
const BUSINESS_END_HOUR: u32 = 17;

/// Hours shown as busy when the calendar collaborator is unreachable. The
/// conversation keeps moving on a plausible static pattern instead of
/// blocking on an outage.
const FALLBACK_BUSY_HOURS: &[u32] = &[10, 14];

/// How many days forward `find_next_slot` scans before giving up.
const SEARCH_HORIZON_DAYS: i64 = 14;

pub struct AvailabilityService {
    calendar: Arc<dyn CalendarApi>,
    timezone: Tz,
}

impl AvailabilityService {
    pub fn new(calendar: Arc<dyn CalendarApi>, timezone: Tz) -> Self {
        Self { calendar, timezone }
    }

    /// The day's bookable slots: one per business hour, marked available
    /// unless it overlaps a busy interval. Weekend dates short-circuit to an
    /// empty list without touching the collaborator, and slots already in
    /// the past are excluded entirely.
    pub async fn slots_for(&self, date: NaiveDate, now: DateTime<Utc>) -> DayAvailability {
        if is_weekend(date) {
            debug!("{} is a weekend, no slots generated", date);
            return DayAvailability {
                date,
                slots: Vec::new(),
                source: AvailabilitySource::Live,
            };
        }

        let (busy, source) = match self.calendar.list_busy_intervals(date).await {
            Ok(busy) => (busy, AvailabilitySource::Live),
            Err(e) => {
                warn!("calendar lookup failed for {}, using fallback pattern: {}", date, e);
                (self.fallback_busy(date), AvailabilitySource::Degraded(e.to_string()))
            }
        };

        let mut slots = Vec::new();
        for hour in BUSINESS_START_HOUR..BUSINESS_END_HOUR {
            let Some((start, end)) = self.slot_bounds(date, hour) else {
                continue;
            };

            if start < now {
                continue;
            }

            let available = !busy
                .iter()
                .any(|interval| start < interval.end && end > interval.start);

            slots.push(TimeSlot { start, end, available });
        }

        DayAvailability { date, slots, source }
    }

    /// First available slot on or after the preferred instant, scanning
    /// day-by-day (weekends skipped) up to the 14-day horizon.
    pub async fn find_next_slot(
        &self,
        preferred: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Option<TimeSlot> {
        let start_date = preferred.with_timezone(&self.timezone).date_naive();

        for offset in 0..SEARCH_HORIZON_DAYS {
            let date = start_date + Duration::days(offset);
            if is_weekend(date) {
                continue;
            }

            let day = self.slots_for(date, now).await;
            let slot = day.open_slots().next().copied();
            if let Some(slot) = slot {
                return Some(slot);
            }
        }

        None
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    fn slot_bounds(&self, date: NaiveDate, hour: u32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let naive = date.and_hms_opt(hour, 0, 0)?;
        let start = match self.timezone.from_local_datetime(&naive) {
            LocalResult::Single(local) => local.with_timezone(&Utc),
            LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
            LocalResult::None => return None,
        };
        Some((start, start + Duration::hours(1)))
    }

    fn fallback_busy(&self, date: NaiveDate) -> Vec<BusyInterval> {
        FALLBACK_BUSY_HOURS
            .iter()
            .filter_map(|&hour| {
                self.slot_bounds(date, hour)
                    .map(|(start, end)| BusyInterval { start, end })
            })
            .collect()
    }
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CalendarError;
    use async_trait::async_trait;
    use chrono::Timelike;
    use chrono_tz::America::New_York;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubCalendar {
        busy: Vec<BusyInterval>,
        calls: AtomicUsize,
    }

    impl StubCalendar {
        fn with_busy(busy: Vec<BusyInterval>) -> Self {
            Self { busy, calls: AtomicUsize::new(0) }
        }

        fn empty() -> Self {
            Self::with_busy(Vec::new())
        }
    }

    #[async_trait]
    impl CalendarApi for StubCalendar {
        async fn list_busy_intervals(&self, _date: NaiveDate) -> Result<Vec<BusyInterval>, CalendarError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.busy.clone())
        }

        async fn create_event(
            &self,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
            _subject: &str,
            _attendee_email: &str,
        ) -> Result<String, CalendarError> {
            Ok("evt-1".to_string())
        }

        async fn delete_event(&self, _event_id: &str) -> Result<(), CalendarError> {
            Ok(())
        }

        async fn update_event(
            &self,
            _event_id: &str,
            _new_start: DateTime<Utc>,
            _new_end: DateTime<Utc>,
        ) -> Result<(), CalendarError> {
            Ok(())
        }
    }

    struct DownCalendar;

    #[async_trait]
    impl CalendarApi for DownCalendar {
        async fn list_busy_intervals(&self, _date: NaiveDate) -> Result<Vec<BusyInterval>, CalendarError> {
            Err(CalendarError::Request("connection refused".to_string()))
        }

        async fn create_event(
            &self,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
            _subject: &str,
            _attendee_email: &str,
        ) -> Result<String, CalendarError> {
            Err(CalendarError::Request("connection refused".to_string()))
        }

        async fn delete_event(&self, _event_id: &str) -> Result<(), CalendarError> {
            Err(CalendarError::Request("connection refused".to_string()))
        }

        async fn update_event(
            &self,
            _event_id: &str,
            _new_start: DateTime<Utc>,
            _new_end: DateTime<Utc>,
        ) -> Result<(), CalendarError> {
            Err(CalendarError::Request("connection refused".to_string()))
        }
    }

    fn local(date: NaiveDate, hour: u32) -> DateTime<Utc> {
        New_York
            .from_local_datetime(&date.and_hms_opt(hour, 0, 0).unwrap())
            .unwrap()
            .with_timezone(&Utc)
    }

    // Monday 2025-06-02.
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    fn early_morning(date: NaiveDate) -> DateTime<Utc> {
        local(date, 6)
    }

    #[tokio::test]
    async fn generates_one_slot_per_business_hour() {
        let service = AvailabilityService::new(Arc::new(StubCalendar::empty()), New_York);

        let day = service.slots_for(monday(), early_morning(monday())).await;

        assert_eq!(day.slots.len(), 8);
        assert!(day.slots.iter().all(|slot| slot.available));
        assert_eq!(day.source, AvailabilitySource::Live);
        let first = day.slots[0];
        assert_eq!(first.start.with_timezone(&New_York).hour(), 9);
        assert_eq!(first.end - first.start, Duration::hours(1));
    }

    #[tokio::test]
    async fn busy_intervals_mark_overlapping_slots_unavailable() {
        let busy = vec![BusyInterval {
            start: local(monday(), 10),
            end: local(monday(), 11),
        }];
        let service = AvailabilityService::new(Arc::new(StubCalendar::with_busy(busy)), New_York);

        let day = service.slots_for(monday(), early_morning(monday())).await;

        let ten_am = day
            .slots
            .iter()
            .find(|s| s.start.with_timezone(&New_York).hour() == 10)
            .unwrap();
        assert!(!ten_am.available);
        assert_eq!(day.open_slots().count(), 7);
    }

    #[tokio::test]
    async fn weekend_short_circuits_without_collaborator_call() {
        let calendar = Arc::new(StubCalendar::empty());
        let service = AvailabilityService::new(Arc::clone(&calendar) as Arc<dyn CalendarApi>, New_York);

        let saturday = NaiveDate::from_ymd_opt(2025, 6, 7).unwrap();
        let day = service.slots_for(saturday, early_morning(saturday)).await;

        assert!(day.slots.is_empty());
        assert_eq!(calendar.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn past_slots_are_excluded_not_just_marked() {
        let service = AvailabilityService::new(Arc::new(StubCalendar::empty()), New_York);

        // 12:30 local: the 9-12 slots are gone entirely.
        let half_past_noon = local(monday(), 12) + Duration::minutes(30);
        let day = service.slots_for(monday(), half_past_noon).await;

        assert_eq!(day.slots.len(), 4);
        assert!(day.slots.iter().all(|slot| slot.start > half_past_noon));
    }

    #[tokio::test]
    async fn collaborator_failure_degrades_to_fallback_pattern() {
        let service = AvailabilityService::new(Arc::new(DownCalendar), New_York);

        let day = service.slots_for(monday(), early_morning(monday())).await;

        assert!(day.source.is_degraded());
        assert_eq!(day.slots.len(), 8);
        let unavailable: Vec<u32> = day
            .slots
            .iter()
            .filter(|s| !s.available)
            .map(|s| s.start.with_timezone(&New_York).hour())
            .collect();
        assert_eq!(unavailable, vec![10, 14]);
    }

    #[tokio::test]
    async fn find_next_skips_weekends_and_full_days() {
        // Friday fully busy; next candidate after the weekend is Monday.
        let friday = NaiveDate::from_ymd_opt(2025, 6, 6).unwrap();
        let busy = vec![BusyInterval {
            start: local(friday, 9),
            end: local(friday, 17),
        }];
        let service = AvailabilityService::new(Arc::new(StubCalendar::with_busy(busy)), New_York);

        let slot = service
            .find_next_slot(local(friday, 10), early_morning(friday))
            .await
            .expect("should find a slot");

        let local_start = slot.start.with_timezone(&New_York);
        assert_eq!(local_start.date_naive(), NaiveDate::from_ymd_opt(2025, 6, 9).unwrap());
        assert_eq!(local_start.hour(), 9);
    }

    #[tokio::test]
    async fn find_next_never_returns_past_slots() {
        let service = AvailabilityService::new(Arc::new(StubCalendar::empty()), New_York);

        let now = local(monday(), 15) + Duration::minutes(10);
        let slot = service
            .find_next_slot(local(monday(), 9), now)
            .await
            .expect("should find a slot");

        assert!(slot.start > now);
    }

    #[tokio::test]
    async fn find_next_exhausts_the_horizon() {
        // Every weekday slot busy for a month's worth of lookups.
        let mut busy = Vec::new();
        for offset in 0..31 {
            let date = monday() + Duration::days(offset);
            busy.push(BusyInterval {
                start: local(date, 0) + Duration::hours(1),
                end: local(date, 23),
            });
        }
        let service = AvailabilityService::new(Arc::new(StubCalendar::with_busy(busy)), New_York);

        let slot = service
            .find_next_slot(local(monday(), 10), early_morning(monday()))
            .await;

        assert_eq!(slot, None);
    }
}
