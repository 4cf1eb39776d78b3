// libs/scheduling-cell/src/services/availability.rs
use chrono::Datelike;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::interval::MinuteInterval;
use crate::models::{
    CreateTimeOffRequest, CreateWindowRequest, SchedulingError, TimeOff, WeeklyScheduleWindow,
};
use crate::services::clinic_today;
use crate::state::SchedulingState;
use crate::store::SchedulePolicyStore;

/// What a dentist's policy says about one calendar date, before bookings are
/// subtracted. `NoWindows` ("no schedule defined") and `TimeOff` are
/// distinguished for the booking validator; both mean zero open intervals
/// for slot generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayAvailability {
    /// A time-off range covers the date; the whole day is closed regardless
    /// of the weekly schedule.
    TimeOff,
    /// The dentist has no available window at all on this weekday.
    NoWindows,
    /// Open intervals, ordered by start, overlaps passed through unmerged.
    Open(Vec<MinuteInterval>),
}

impl DayAvailability {
    pub fn open_intervals(self) -> Vec<MinuteInterval> {
        match self {
            DayAvailability::Open(intervals) => intervals,
            DayAvailability::TimeOff | DayAvailability::NoWindows => Vec::new(),
        }
    }
}

/// Read-only view combining weekly windows and time-off exceptions into the
/// authoritative open intervals for a date, plus the admin operations that
/// maintain that policy. Policy is re-read from the store on every call.
pub struct AvailabilityService {
    policy: Arc<dyn SchedulePolicyStore>,
}

impl AvailabilityService {
    pub fn new(state: &SchedulingState) -> Self {
        Self {
            policy: Arc::clone(&state.policy),
        }
    }

    /// Effective availability of a dentist on a date.
    pub async fn day_availability(
        &self,
        dentist_id: Uuid,
        date: NaiveDate,
    ) -> Result<DayAvailability, SchedulingError> {
        let covering = self.policy.time_off_covering(dentist_id, date).await?;
        if !covering.is_empty() {
            debug!("Dentist {} has time off covering {}", dentist_id, date);
            return Ok(DayAvailability::TimeOff);
        }

        let weekday = weekday_index(date);
        let windows = self.policy.windows_for_weekday(dentist_id, weekday).await?;
        if windows.is_empty() {
            return Ok(DayAvailability::NoWindows);
        }

        let mut intervals: Vec<MinuteInterval> = windows
            .iter()
            .map(|w| MinuteInterval::from_times(w.start_time, w.end_time))
            .collect();
        intervals.sort_by_key(|i| (i.start, i.end));

        Ok(DayAvailability::Open(intervals))
    }

    // ==========================================================================
    // SCHEDULE ADMINISTRATION
    // ==========================================================================

    pub async fn create_window(
        &self,
        dentist_id: Uuid,
        request: CreateWindowRequest,
    ) -> Result<WeeklyScheduleWindow, SchedulingError> {
        debug!("Creating schedule window for dentist {}", dentist_id);

        if request.start_time >= request.end_time {
            return Err(SchedulingError::Validation(
                "start_time must be before end_time".to_string(),
            ));
        }
        if request.weekday > 6 {
            return Err(SchedulingError::Validation(
                "weekday must be between 0 (Monday) and 6 (Sunday)".to_string(),
            ));
        }

        let window = WeeklyScheduleWindow {
            id: Uuid::new_v4(),
            dentist_id,
            weekday: request.weekday,
            start_time: request.start_time,
            end_time: request.end_time,
            is_available: request.is_available.unwrap_or(true),
        };

        self.policy.insert_window(window.clone()).await?;
        Ok(window)
    }

    pub async fn list_windows(
        &self,
        dentist_id: Uuid,
    ) -> Result<Vec<WeeklyScheduleWindow>, SchedulingError> {
        self.policy.windows_for_dentist(dentist_id).await
    }

    pub async fn delete_window(
        &self,
        dentist_id: Uuid,
        window_id: Uuid,
    ) -> Result<(), SchedulingError> {
        self.policy.delete_window(dentist_id, window_id).await
    }

    pub async fn create_time_off(
        &self,
        dentist_id: Uuid,
        request: CreateTimeOffRequest,
    ) -> Result<TimeOff, SchedulingError> {
        debug!(
            "Creating time off for dentist {} from {} to {}",
            dentist_id, request.start_date, request.end_date
        );

        if request.start_date > request.end_date {
            return Err(SchedulingError::Validation(
                "end_date must not be before start_date".to_string(),
            ));
        }
        if request.start_date < clinic_today() {
            return Err(SchedulingError::Validation(
                "start_date must not be in the past".to_string(),
            ));
        }

        let time_off = TimeOff {
            id: Uuid::new_v4(),
            dentist_id,
            start_date: request.start_date,
            end_date: request.end_date,
            reason: request.reason,
        };

        self.policy.insert_time_off(time_off.clone()).await?;
        Ok(time_off)
    }

    pub async fn list_time_off(&self, dentist_id: Uuid) -> Result<Vec<TimeOff>, SchedulingError> {
        self.policy.time_off_for_dentist(dentist_id).await
    }

    pub async fn delete_time_off(
        &self,
        dentist_id: Uuid,
        time_off_id: Uuid,
    ) -> Result<(), SchedulingError> {
        self.policy.delete_time_off(dentist_id, time_off_id).await
    }
}

/// Weekday of a date with 0 = Monday .. 6 = Sunday, matching the schedule
/// window data model.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_monday() as u8
}
