// libs/scheduling-cell/src/services/slots.rs
use chrono::{NaiveDate, NaiveTime};
use std::collections::BTreeSet;
use tracing::debug;
use uuid::Uuid;

use crate::interval::{to_naive_time, MinuteInterval};
use crate::models::SchedulingError;
use crate::services::availability::{AvailabilityService, DayAvailability};
use crate::services::ledger::BookingLedger;
use crate::state::SchedulingState;

/// Derives the bookable start times for a dentist on a date: open intervals
/// minus occupied intervals, stepped by the slot granularity.
pub struct SlotCalculator {
    availability: AvailabilityService,
    ledger: BookingLedger,
}

impl SlotCalculator {
    pub fn new(state: &SchedulingState) -> Self {
        Self {
            availability: AvailabilityService::new(state),
            ledger: BookingLedger::new(state),
        }
    }

    /// Ascending, duplicate-free bookable start times. Time off or a missing
    /// schedule yields an empty list, never an error.
    pub async fn available_slots(
        &self,
        dentist_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<NaiveTime>, SchedulingError> {
        let open = match self.availability.day_availability(dentist_id, date).await? {
            DayAvailability::Open(intervals) => intervals,
            DayAvailability::TimeOff | DayAvailability::NoWindows => return Ok(Vec::new()),
        };

        let occupied = self.ledger.occupied_intervals(dentist_id, date).await?;

        // Overlapping windows may generate the same start twice; the set
        // both deduplicates and keeps candidates ascending for the merge.
        let candidates: BTreeSet<u16> = open.iter().flat_map(|w| w.slot_starts()).collect();

        let mut slots = Vec::with_capacity(candidates.len());
        let mut next_occupied = 0;
        for start in candidates {
            let slot = MinuteInterval::slot(start);
            while next_occupied < occupied.len() && occupied[next_occupied].end <= slot.start {
                next_occupied += 1;
            }
            let conflict =
                next_occupied < occupied.len() && occupied[next_occupied].start < slot.end;
            if !conflict {
                slots.push(to_naive_time(start));
            }
        }

        debug!(
            "Dentist {} has {} available slots on {}",
            dentist_id,
            slots.len(),
            date
        );
        Ok(slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, Utc};
    use std::sync::Arc;

    use crate::models::{Appointment, AppointmentStatus, CreateWindowRequest};
    use crate::state::SchedulingState;
    use crate::store::AppointmentStore;

    fn hm(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    // 2026-09-14 is a Monday
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, 14).unwrap()
    }

    async fn add_window(state: &Arc<SchedulingState>, dentist_id: Uuid, start: NaiveTime, end: NaiveTime) {
        AvailabilityService::new(state)
            .create_window(
                dentist_id,
                CreateWindowRequest {
                    weekday: 0,
                    start_time: start,
                    end_time: end,
                    is_available: None,
                },
            )
            .await
            .unwrap();
    }

    async fn add_appointment(
        state: &Arc<SchedulingState>,
        dentist_id: Uuid,
        time: NaiveTime,
        status: AppointmentStatus,
    ) {
        let now = Utc::now();
        state
            .appointments
            .insert(Appointment {
                id: Uuid::new_v4(),
                patient_id: Uuid::new_v4(),
                dentist_id,
                date: monday(),
                time,
                reason: String::new(),
                status,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn full_window_yields_every_slot() {
        let state = SchedulingState::in_memory();
        let dentist_id = Uuid::new_v4();
        add_window(&state, dentist_id, hm(8, 0), hm(10, 0)).await;

        let slots = SlotCalculator::new(&state)
            .available_slots(dentist_id, monday())
            .await
            .unwrap();

        assert_eq!(slots, vec![hm(8, 0), hm(8, 30), hm(9, 0), hm(9, 30)]);
    }

    #[tokio::test]
    async fn booked_slot_is_withheld() {
        let state = SchedulingState::in_memory();
        let dentist_id = Uuid::new_v4();
        add_window(&state, dentist_id, hm(8, 0), hm(10, 0)).await;
        add_appointment(&state, dentist_id, hm(8, 30), AppointmentStatus::Confirmed).await;

        let slots = SlotCalculator::new(&state)
            .available_slots(dentist_id, monday())
            .await
            .unwrap();

        assert_eq!(slots, vec![hm(8, 0), hm(9, 0), hm(9, 30)]);
    }

    #[tokio::test]
    async fn off_grid_booking_blocks_both_neighbours() {
        let state = SchedulingState::in_memory();
        let dentist_id = Uuid::new_v4();
        add_window(&state, dentist_id, hm(8, 0), hm(10, 0)).await;
        // 08:15-08:45 overlaps the 08:00 and 08:30 slots
        add_appointment(&state, dentist_id, hm(8, 15), AppointmentStatus::Pending).await;

        let slots = SlotCalculator::new(&state)
            .available_slots(dentist_id, monday())
            .await
            .unwrap();

        assert_eq!(slots, vec![hm(9, 0), hm(9, 30)]);
    }

    #[tokio::test]
    async fn cancelled_and_completed_free_their_slot() {
        let state = SchedulingState::in_memory();
        let dentist_id = Uuid::new_v4();
        add_window(&state, dentist_id, hm(8, 0), hm(10, 0)).await;
        add_appointment(&state, dentist_id, hm(8, 0), AppointmentStatus::Cancelled).await;
        add_appointment(&state, dentist_id, hm(8, 30), AppointmentStatus::Completed).await;

        let slots = SlotCalculator::new(&state)
            .available_slots(dentist_id, monday())
            .await
            .unwrap();

        assert_eq!(slots, vec![hm(8, 0), hm(8, 30), hm(9, 0), hm(9, 30)]);
    }

    #[tokio::test]
    async fn overlapping_windows_do_not_duplicate_slots() {
        let state = SchedulingState::in_memory();
        let dentist_id = Uuid::new_v4();
        add_window(&state, dentist_id, hm(8, 0), hm(10, 0)).await;
        add_window(&state, dentist_id, hm(9, 0), hm(11, 0)).await;

        let slots = SlotCalculator::new(&state)
            .available_slots(dentist_id, monday())
            .await
            .unwrap();

        assert_eq!(
            slots,
            vec![hm(8, 0), hm(8, 30), hm(9, 0), hm(9, 30), hm(10, 0), hm(10, 30)]
        );
    }

    #[tokio::test]
    async fn unknown_dentist_has_no_slots() {
        let state = SchedulingState::in_memory();

        let slots = SlotCalculator::new(&state)
            .available_slots(Uuid::new_v4(), monday())
            .await
            .unwrap();

        assert!(slots.is_empty());
    }
}
