// libs/scheduling-cell/src/services/booking.rs
use chrono::{Duration, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};
use uuid::Uuid;

use crate::interval::{minute_of_day, MinuteInterval};
use crate::models::{
    Appointment, AppointmentSearchQuery, AppointmentStatus, BookAppointmentRequest,
    SchedulingError, parse_date, parse_time,
};
use crate::services::availability::{AvailabilityService, DayAvailability};
use crate::services::clinic_today;
use crate::services::ledger::BookingLedger;
use crate::state::SchedulingState;
use crate::store::AppointmentStore;

/// Furthest bookable date, inclusive, counted from today.
pub const BOOKING_HORIZON_DAYS: i64 = 90;

/// One async mutex per (dentist, date). Admission control holds the day's
/// lock across its check-then-insert sequence so two proposals for the same
/// calendar can never interleave; proposals for different days proceed in
/// parallel.
#[derive(Default)]
pub struct DayLockMap {
    locks: Mutex<HashMap<(Uuid, NaiveDate), Arc<Mutex<()>>>>,
}

impl DayLockMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, dentist_id: Uuid, date: NaiveDate) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            // A strong count of 1 means nobody holds or awaits the entry's
            // mutex; dropping those here keeps the map from accumulating one
            // entry per dentist per booked day over the process lifetime.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(
                locks
                    .entry((dentist_id, date))
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };
        lock.lock_owned().await
    }
}

/// Admission control for booking proposals and the appointment lifecycle.
/// Every write to the ledger funnels through here.
pub struct BookingService {
    availability: AvailabilityService,
    ledger: BookingLedger,
    appointments: Arc<dyn AppointmentStore>,
    day_locks: Arc<DayLockMap>,
}

impl BookingService {
    pub fn new(state: &SchedulingState) -> Self {
        Self {
            availability: AvailabilityService::new(state),
            ledger: BookingLedger::new(state),
            appointments: Arc::clone(&state.appointments),
            day_locks: Arc::clone(&state.day_locks),
        }
    }

    /// Validate a booking proposal and, if every check passes, record it as a
    /// pending appointment.
    ///
    /// Checks run in a fixed order so the caller always learns the earliest
    /// failure: malformed input, then past date, then horizon, then the
    /// dentist's availability policy, then slot occupancy. The per-day lock
    /// is held from the policy checks through the insert.
    pub async fn propose_booking(
        &self,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, SchedulingError> {
        let date = parse_date(&request.date)?;
        let time = parse_time(&request.time)?;

        let today = clinic_today();
        if date < today {
            return Err(SchedulingError::PastDateRejected);
        }
        if date > today + Duration::days(BOOKING_HORIZON_DAYS) {
            return Err(SchedulingError::HorizonExceeded(BOOKING_HORIZON_DAYS));
        }

        let _day_guard = self.day_locks.acquire(request.dentist_id, date).await;

        let open = match self
            .availability
            .day_availability(request.dentist_id, date)
            .await?
        {
            DayAvailability::TimeOff | DayAvailability::NoWindows => {
                return Err(SchedulingError::DentistUnavailable);
            }
            DayAvailability::Open(intervals) => intervals,
        };

        // Membership is checked against the start minute with an inclusive
        // window end, so a proposal at the exact closing time is admitted.
        let start = minute_of_day(time);
        if !open.iter().any(|w| w.contains_inclusive(start)) {
            return Err(SchedulingError::TimeOutsideWindow);
        }

        let slot = MinuteInterval::slot(start);
        let occupied = self
            .ledger
            .occupied_intervals(request.dentist_id, date)
            .await?;
        if occupied.iter().any(|o| o.overlaps(&slot)) {
            debug!(
                "Rejecting booking for dentist {} at {} {}: slot occupied",
                request.dentist_id, date, time
            );
            return Err(SchedulingError::SlotConflict);
        }

        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            patient_id: request.patient_id,
            dentist_id: request.dentist_id,
            date,
            time,
            reason: request.reason.unwrap_or_default(),
            status: AppointmentStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.appointments.insert(appointment.clone()).await?;

        info!(
            "Booking accepted: appointment {} for dentist {} at {} {}",
            appointment.id, appointment.dentist_id, appointment.date, appointment.time
        );
        Ok(appointment)
    }

    /// Move an appointment through its lifecycle, rejecting any transition
    /// the state machine does not allow.
    pub async fn update_status(
        &self,
        id: Uuid,
        next: AppointmentStatus,
    ) -> Result<Appointment, SchedulingError> {
        let current = self.appointments.get(id).await?;
        if !current.status.can_transition_to(next) {
            return Err(SchedulingError::InvalidStatusTransition {
                from: current.status,
                to: next,
            });
        }

        let updated = self.appointments.set_status(id, next).await?;
        info!("Appointment {} moved from {} to {}", id, current.status, next);
        Ok(updated)
    }

    pub async fn get(&self, id: Uuid) -> Result<Appointment, SchedulingError> {
        self.appointments.get(id).await
    }

    pub async fn search(
        &self,
        query: &AppointmentSearchQuery,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        self.appointments.search(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(offset: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, 1).unwrap() + Duration::days(i64::from(offset))
    }

    #[tokio::test]
    async fn day_lock_map_drops_idle_entries() {
        let locks = DayLockMap::new();
        let dentist_id = Uuid::new_v4();

        for offset in 0..5 {
            drop(locks.acquire(dentist_id, day(offset)).await);
        }
        assert_eq!(locks.locks.lock().await.len(), 1);

        // A held entry survives pruning while its guard is alive.
        let held = locks.acquire(dentist_id, day(10)).await;
        drop(locks.acquire(dentist_id, day(11)).await);
        assert!(locks.locks.lock().await.contains_key(&(dentist_id, day(10))));
        drop(held);

        drop(locks.acquire(dentist_id, day(12)).await);
        assert!(!locks.locks.lock().await.contains_key(&(dentist_id, day(10))));
    }

    #[tokio::test]
    async fn day_lock_map_serializes_same_key_acquisitions() {
        let locks = Arc::new(DayLockMap::new());
        let dentist_id = Uuid::new_v4();

        let guard = locks.acquire(dentist_id, day(0)).await;

        let contender = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move { locks.acquire(dentist_id, day(0)).await })
        };
        // A different day is not blocked by the held lock.
        drop(locks.acquire(dentist_id, day(1)).await);
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }
}
