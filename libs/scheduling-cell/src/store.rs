// libs/scheduling-cell/src/store.rs
//
// Schedule policy and appointment data are owned by the surrounding system;
// this cell only ever sees them through these traits and re-reads current
// values on every call. The in-memory store is the standalone deployment's
// replica and the test double.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use crate::models::{
    Appointment, AppointmentSearchQuery, AppointmentStatus, SchedulingError, TimeOff,
    WeeklyScheduleWindow,
};

/// Read/write access to a dentist's availability policy: weekly windows and
/// date-range time off. Reads are the authoritative inputs of the scheduling
/// core; writes belong to the admin surface.
#[async_trait]
pub trait SchedulePolicyStore: Send + Sync {
    /// All windows for a dentist, ordered by weekday then start time.
    async fn windows_for_dentist(
        &self,
        dentist_id: Uuid,
    ) -> Result<Vec<WeeklyScheduleWindow>, SchedulingError>;

    /// Windows for one weekday with `is_available = true`, ordered by start
    /// time. Overlapping windows are returned as-is.
    async fn windows_for_weekday(
        &self,
        dentist_id: Uuid,
        weekday: u8,
    ) -> Result<Vec<WeeklyScheduleWindow>, SchedulingError>;

    async fn insert_window(&self, window: WeeklyScheduleWindow) -> Result<(), SchedulingError>;

    async fn delete_window(&self, dentist_id: Uuid, window_id: Uuid)
        -> Result<(), SchedulingError>;

    async fn time_off_for_dentist(&self, dentist_id: Uuid)
        -> Result<Vec<TimeOff>, SchedulingError>;

    /// Time-off entries whose inclusive date range covers `date`.
    async fn time_off_covering(
        &self,
        dentist_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<TimeOff>, SchedulingError>;

    async fn insert_time_off(&self, time_off: TimeOff) -> Result<(), SchedulingError>;

    async fn delete_time_off(
        &self,
        dentist_id: Uuid,
        time_off_id: Uuid,
    ) -> Result<(), SchedulingError>;
}

/// The booking ledger's backing store.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Every appointment for a dentist on a date, any status, ordered by time.
    async fn appointments_for_day(
        &self,
        dentist_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, SchedulingError>;

    async fn get(&self, id: Uuid) -> Result<Appointment, SchedulingError>;

    async fn insert(&self, appointment: Appointment) -> Result<(), SchedulingError>;

    /// Overwrite the status and bump `updated_at`, returning the new record.
    async fn set_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Appointment, SchedulingError>;

    async fn search(
        &self,
        query: &AppointmentSearchQuery,
    ) -> Result<Vec<Appointment>, SchedulingError>;
}

// ==============================================================================
// IN-MEMORY IMPLEMENTATION
// ==============================================================================

#[derive(Default)]
pub struct InMemoryStore {
    windows: RwLock<Vec<WeeklyScheduleWindow>>,
    time_off: RwLock<Vec<TimeOff>>,
    appointments: RwLock<HashMap<Uuid, Appointment>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(_: impl std::fmt::Debug) -> SchedulingError {
    SchedulingError::Internal("store lock poisoned".to_string())
}

#[async_trait]
impl SchedulePolicyStore for InMemoryStore {
    async fn windows_for_dentist(
        &self,
        dentist_id: Uuid,
    ) -> Result<Vec<WeeklyScheduleWindow>, SchedulingError> {
        let windows = self.windows.read().map_err(poisoned)?;
        let mut result: Vec<WeeklyScheduleWindow> = windows
            .iter()
            .filter(|w| w.dentist_id == dentist_id)
            .cloned()
            .collect();
        result.sort_by_key(|w| (w.weekday, w.start_time));
        Ok(result)
    }

    async fn windows_for_weekday(
        &self,
        dentist_id: Uuid,
        weekday: u8,
    ) -> Result<Vec<WeeklyScheduleWindow>, SchedulingError> {
        let windows = self.windows.read().map_err(poisoned)?;
        let mut result: Vec<WeeklyScheduleWindow> = windows
            .iter()
            .filter(|w| w.dentist_id == dentist_id && w.weekday == weekday && w.is_available)
            .cloned()
            .collect();
        result.sort_by_key(|w| (w.start_time, w.end_time));
        Ok(result)
    }

    async fn insert_window(&self, window: WeeklyScheduleWindow) -> Result<(), SchedulingError> {
        self.windows.write().map_err(poisoned)?.push(window);
        Ok(())
    }

    async fn delete_window(
        &self,
        dentist_id: Uuid,
        window_id: Uuid,
    ) -> Result<(), SchedulingError> {
        let mut windows = self.windows.write().map_err(poisoned)?;
        let before = windows.len();
        windows.retain(|w| !(w.id == window_id && w.dentist_id == dentist_id));
        if windows.len() == before {
            return Err(SchedulingError::NotFound);
        }
        Ok(())
    }

    async fn time_off_for_dentist(
        &self,
        dentist_id: Uuid,
    ) -> Result<Vec<TimeOff>, SchedulingError> {
        let time_off = self.time_off.read().map_err(poisoned)?;
        let mut result: Vec<TimeOff> = time_off
            .iter()
            .filter(|t| t.dentist_id == dentist_id)
            .cloned()
            .collect();
        result.sort_by_key(|t| t.start_date);
        Ok(result)
    }

    async fn time_off_covering(
        &self,
        dentist_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<TimeOff>, SchedulingError> {
        let time_off = self.time_off.read().map_err(poisoned)?;
        Ok(time_off
            .iter()
            .filter(|t| t.dentist_id == dentist_id && t.covers(date))
            .cloned()
            .collect())
    }

    async fn insert_time_off(&self, time_off: TimeOff) -> Result<(), SchedulingError> {
        self.time_off.write().map_err(poisoned)?.push(time_off);
        Ok(())
    }

    async fn delete_time_off(
        &self,
        dentist_id: Uuid,
        time_off_id: Uuid,
    ) -> Result<(), SchedulingError> {
        let mut time_off = self.time_off.write().map_err(poisoned)?;
        let before = time_off.len();
        time_off.retain(|t| !(t.id == time_off_id && t.dentist_id == dentist_id));
        if time_off.len() == before {
            return Err(SchedulingError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl AppointmentStore for InMemoryStore {
    async fn appointments_for_day(
        &self,
        dentist_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        let appointments = self.appointments.read().map_err(poisoned)?;
        let mut result: Vec<Appointment> = appointments
            .values()
            .filter(|a| a.dentist_id == dentist_id && a.date == date)
            .cloned()
            .collect();
        result.sort_by_key(|a| a.time);
        Ok(result)
    }

    async fn get(&self, id: Uuid) -> Result<Appointment, SchedulingError> {
        let appointments = self.appointments.read().map_err(poisoned)?;
        appointments.get(&id).cloned().ok_or(SchedulingError::NotFound)
    }

    async fn insert(&self, appointment: Appointment) -> Result<(), SchedulingError> {
        self.appointments
            .write()
            .map_err(poisoned)?
            .insert(appointment.id, appointment);
        Ok(())
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Appointment, SchedulingError> {
        let mut appointments = self.appointments.write().map_err(poisoned)?;
        let appointment = appointments.get_mut(&id).ok_or(SchedulingError::NotFound)?;
        appointment.status = status;
        appointment.updated_at = chrono::Utc::now();
        Ok(appointment.clone())
    }

    async fn search(
        &self,
        query: &AppointmentSearchQuery,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        let appointments = self.appointments.read().map_err(poisoned)?;
        let mut result: Vec<Appointment> = appointments
            .values()
            .filter(|a| {
                query.dentist_id.map_or(true, |id| a.dentist_id == id)
                    && query.patient_id.map_or(true, |id| a.patient_id == id)
                    && query.date.map_or(true, |d| a.date == d)
                    && (!query.active_only.unwrap_or(false) || a.status.is_active())
            })
            .cloned()
            .collect();
        result.sort_by_key(|a| (a.date, a.time));
        Ok(result)
    }
}
