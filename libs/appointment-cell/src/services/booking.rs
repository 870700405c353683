// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc, Weekday};
use chrono_tz::Tz;
use tracing::{debug, error, info, warn};

use scheduling_cell::{AvailabilityService, CalendarApi};
use shared_config::AppConfig;
use shared_models::Channel;

use crate::models::{
    Appointment, AppointmentKey, AppointmentStatus, AppointmentUpdate, AvailabilityOutcome,
    BookingOutcome, BookingRequest, CancelOutcome, FindOutcome, NewAppointment, RescheduleOutcome,
    StoreError,
};
use crate::services::store::AppointmentStore;

/// The shared booking orchestrator. Every channel reduces its envelope to one
/// of these operations; collaborator failures never escape as errors, they
/// come back as outcomes the channel renders into an apology.
pub struct BookingService {
    store: Arc<dyn AppointmentStore>,
    calendar: Arc<dyn CalendarApi>,
    availability: AvailabilityService,
    timezone: Tz,
    pharmacy_phone: String,
}

impl BookingService {
    pub fn new(
        config: &AppConfig,
        store: Arc<dyn AppointmentStore>,
        calendar: Arc<dyn CalendarApi>,
    ) -> Self {
        let availability = AvailabilityService::new(Arc::clone(&calendar), config.business_timezone);

        Self {
            store,
            calendar,
            availability,
            timezone: config.business_timezone,
            pharmacy_phone: config.pharmacy_phone.clone(),
        }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn pharmacy_phone(&self) -> &str {
        &self.pharmacy_phone
    }

    pub fn availability(&self) -> &AvailabilityService {
        &self.availability
    }

    /// Read-only day report: open starting times, or the nearest future
    /// alternative when the day is full.
    pub async fn check_availability(&self, date: NaiveDate, now: DateTime<Utc>) -> AvailabilityOutcome {
        if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            return AvailabilityOutcome::Weekend { date };
        }

        let day = self.availability.slots_for(date, now).await;
        let starts: Vec<DateTime<Utc>> = day.open_slots().map(|slot| slot.start).collect();

        if !starts.is_empty() {
            return AvailabilityOutcome::Open {
                date,
                starts,
                degraded: day.source.is_degraded(),
            };
        }

        let from = self.business_day_start(date).unwrap_or(now);
        let next = self.availability.find_next_slot(from, now).await;
        AvailabilityOutcome::DayFull { date, next }
    }

    /// Book the preferred hour if it is open: calendar event first, then the
    /// appointment record, so a calendar failure leaves no orphan rows. An
    /// unavailable hour produces a suggestion, never an automatic booking.
    pub async fn book(&self, request: BookingRequest, channel: Channel, now: DateTime<Utc>) -> BookingOutcome {
        info!(
            "booking attempt for {} ({}) at {}",
            request.patient_name, request.kind, request.preferred_datetime
        );

        let local_preferred = request.preferred_datetime.with_timezone(&self.timezone);
        let day = self.availability.slots_for(local_preferred.date_naive(), now).await;
        let requested_hour = local_preferred.hour();

        let slot = day
            .slots
            .iter()
            .find(|slot| {
                slot.available && slot.start.with_timezone(&self.timezone).hour() == requested_hour
            })
            .copied();

        let Some(slot) = slot else {
            debug!("preferred hour {} not available, searching forward", requested_hour);
            let suggestion = self
                .availability
                .find_next_slot(request.preferred_datetime, now)
                .await;
            return BookingOutcome::SlotTaken {
                preferred: request.preferred_datetime,
                suggestion,
            };
        };

        let subject = format!("{} - {}", request.kind.label(), request.patient_name);
        let event_id = match self
            .calendar
            .create_event(slot.start, slot.end, &subject, &request.email)
            .await
        {
            Ok(event_id) => event_id,
            Err(e) => {
                warn!("calendar event creation failed, not persisting appointment: {}", e);
                return BookingOutcome::CalendarUnavailable;
            }
        };

        let new = NewAppointment {
            patient_name: request.patient_name,
            phone: request.phone,
            email: request.email,
            kind: request.kind,
            preferred_datetime: request.preferred_datetime,
            confirmed_datetime: Some(slot.start),
            status: AppointmentStatus::Confirmed,
            agent_notes: format!("Booked via {}. Calendar event {}", channel, event_id),
        };

        match self.store.create(new).await {
            Ok(appointment) => {
                info!("appointment {} confirmed for {}", appointment.id, slot.start);
                BookingOutcome::Confirmed { appointment }
            }
            Err(e) => {
                error!("appointment store rejected booking: {}", e);
                BookingOutcome::Failed
            }
        }
    }

    pub async fn find(&self, name: &str, phone: Option<&str>, email: Option<&str>) -> FindOutcome {
        match self.store.find_by_patient(name, phone, email).await {
            Ok(Some(appointment)) => FindOutcome::Found { appointment },
            Ok(None) => FindOutcome::NotFound {
                name: name.to_string(),
                phone: phone.map(str::to_string),
            },
            Err(e) => {
                error!("appointment lookup failed: {}", e);
                FindOutcome::Failed
            }
        }
    }

    /// Cancel is idempotent towards unknown appointments: a not-found key
    /// reports non-success without touching the store.
    pub async fn cancel(
        &self,
        key: Option<AppointmentKey>,
        channel: Channel,
        now: DateTime<Utc>,
    ) -> CancelOutcome {
        let Some(key) = key else {
            return CancelOutcome::MissingIdentifier;
        };

        let appointment = match self.resolve(&key).await {
            Ok(Some(appointment)) => appointment,
            Ok(None) => return CancelOutcome::NotFound,
            Err(e) => {
                error!("appointment lookup failed during cancel: {}", e);
                return CancelOutcome::Failed;
            }
        };

        let update = AppointmentUpdate {
            status: Some(AppointmentStatus::Cancelled),
            append_note: Some(format!(
                "Cancelled via {} on {}",
                channel,
                now.with_timezone(&self.timezone).format("%Y-%m-%d %H:%M")
            )),
            ..AppointmentUpdate::default()
        };

        match self.store.update(appointment.id, update).await {
            Ok(Some(updated)) => {
                info!("appointment {} cancelled", updated.id);
                CancelOutcome::Cancelled { appointment: updated }
            }
            Ok(None) => CancelOutcome::NotFound,
            Err(e) => {
                error!("appointment cancel failed: {}", e);
                CancelOutcome::Failed
            }
        }
    }

    /// Re-runs slot resolution against the new instant; the stored
    /// appointment is only touched once an open slot is in hand.
    pub async fn reschedule(
        &self,
        key: Option<AppointmentKey>,
        new_datetime: DateTime<Utc>,
        channel: Channel,
        now: DateTime<Utc>,
    ) -> RescheduleOutcome {
        let Some(key) = key else {
            return RescheduleOutcome::MissingIdentifier;
        };

        let appointment = match self.resolve(&key).await {
            Ok(Some(appointment)) => appointment,
            Ok(None) => return RescheduleOutcome::NotFound,
            Err(e) => {
                error!("appointment lookup failed during reschedule: {}", e);
                return RescheduleOutcome::Failed;
            }
        };

        let local_new = new_datetime.with_timezone(&self.timezone);
        let day = self.availability.slots_for(local_new.date_naive(), now).await;
        let requested_hour = local_new.hour();

        let slot = day
            .slots
            .iter()
            .find(|slot| {
                slot.available && slot.start.with_timezone(&self.timezone).hour() == requested_hour
            })
            .copied();

        let Some(slot) = slot else {
            let suggestion = self.availability.find_next_slot(new_datetime, now).await;
            return RescheduleOutcome::SlotTaken { suggestion };
        };

        let update = AppointmentUpdate {
            status: Some(AppointmentStatus::Rescheduled),
            confirmed_datetime: Some(slot.start),
            append_note: Some(format!(
                "Rescheduled via {} on {}",
                channel,
                now.with_timezone(&self.timezone).format("%Y-%m-%d %H:%M")
            )),
        };

        match self.store.update(appointment.id, update).await {
            Ok(Some(updated)) => {
                info!("appointment {} rescheduled to {}", updated.id, slot.start);
                RescheduleOutcome::Rescheduled {
                    appointment: updated,
                    new_start: slot.start,
                }
            }
            Ok(None) => RescheduleOutcome::NotFound,
            Err(e) => {
                error!("appointment reschedule failed: {}", e);
                RescheduleOutcome::Failed
            }
        }
    }

    async fn resolve(&self, key: &AppointmentKey) -> Result<Option<Appointment>, StoreError> {
        match key {
            AppointmentKey::Id(id) => self.store.find_by_id(*id).await,
            AppointmentKey::Patient { name, phone, email } => {
                self.store
                    .find_by_patient(name, phone.as_deref(), email.as_deref())
                    .await
            }
        }
    }

    fn business_day_start(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        use chrono::{LocalResult, TimeZone};

        let naive = date.and_hms_opt(9, 0, 0)?;
        match self.timezone.from_local_datetime(&naive) {
            LocalResult::Single(local) => Some(local.with_timezone(&Utc)),
            LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
            LocalResult::None => None,
        }
    }
}
