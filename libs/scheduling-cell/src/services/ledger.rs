// libs/scheduling-cell/src/services/ledger.rs
use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

use crate::interval::{minute_of_day, MinuteInterval};
use crate::models::SchedulingError;
use crate::state::SchedulingState;
use crate::store::AppointmentStore;

/// The occupied side of the calendar: existing bookings for a dentist/date
/// as fixed-length intervals, keyed by lifecycle status.
pub struct BookingLedger {
    appointments: Arc<dyn AppointmentStore>,
}

impl BookingLedger {
    pub fn new(state: &SchedulingState) -> Self {
        Self {
            appointments: Arc::clone(&state.appointments),
        }
    }

    /// Occupied intervals for a dentist on a date, ascending. Only pending
    /// and confirmed appointments occupy; completed and cancelled ones have
    /// freed their slot.
    pub async fn occupied_intervals(
        &self,
        dentist_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<MinuteInterval>, SchedulingError> {
        let appointments = self
            .appointments
            .appointments_for_day(dentist_id, date)
            .await?;

        let mut occupied: Vec<MinuteInterval> = appointments
            .iter()
            .filter(|a| a.status.is_active())
            .map(|a| MinuteInterval::slot(minute_of_day(a.time)))
            .collect();
        occupied.sort_by_key(|i| i.start);

        Ok(occupied)
    }
}
