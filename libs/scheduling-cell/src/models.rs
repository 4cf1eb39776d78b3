// libs/scheduling-cell/src/models.rs
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use uuid::Uuid;

// ==============================================================================
// SCHEDULING POLICY MODELS
// ==============================================================================

/// One recurring weekly availability window for a dentist.
///
/// Windows are policy, not reservations: multiple windows per weekday are
/// allowed and may overlap; downstream slot generation tolerates that.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyScheduleWindow {
    pub id: Uuid,
    pub dentist_id: Uuid,
    /// 0 = Monday .. 6 = Sunday.
    pub weekday: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_available: bool,
}

/// A closed range of whole days with zero availability, overriding the
/// weekly schedule entirely for those dates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeOff {
    pub id: Uuid,
    pub dentist_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
}

impl TimeOff {
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

// ==============================================================================
// APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub dentist_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub reason: String,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// Active appointments occupy their interval; completed and cancelled
    /// ones free it for reuse while staying queryable for history.
    pub fn is_active(self) -> bool {
        matches!(self, AppointmentStatus::Pending | AppointmentStatus::Confirmed)
    }

    /// Lifecycle: Pending -> Confirmed -> Completed, with Cancelled
    /// reachable from Pending or Confirmed.
    pub fn can_transition_to(self, next: AppointmentStatus) -> bool {
        matches!(
            (self, next),
            (AppointmentStatus::Pending, AppointmentStatus::Confirmed)
                | (AppointmentStatus::Pending, AppointmentStatus::Cancelled)
                | (AppointmentStatus::Confirmed, AppointmentStatus::Completed)
                | (AppointmentStatus::Confirmed, AppointmentStatus::Cancelled)
        )
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

/// Booking proposal as received over the wire. `date` and `time` stay strings
/// so malformed input is rejected as its own error class before any policy
/// validation runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub patient_id: Uuid,
    pub dentist_id: Uuid,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`, 24-hour
    pub time: String,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWindowRequest {
    pub weekday: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_available: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTimeOffRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentSearchQuery {
    pub dentist_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
    /// Restrict to pending/confirmed appointments.
    pub active_only: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct SlotQuery {
    pub dentist_id: Uuid,
    /// `YYYY-MM-DD`
    pub date: String,
}

#[derive(Debug, Serialize)]
pub struct AvailableSlotsResponse {
    pub dentist_id: Uuid,
    pub date: NaiveDate,
    /// Ascending `HH:MM` start times.
    pub available_slots: Vec<String>,
}

// ==============================================================================
// ERROR TAXONOMY
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedulingError {
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Cannot book an appointment in the past")]
    PastDateRejected,

    #[error("Cannot book an appointment more than {0} days ahead")]
    HorizonExceeded(i64),

    #[error("The dentist does not work on this date")]
    DentistUnavailable,

    #[error("The time is outside the dentist's working hours for this day")]
    TimeOutsideWindow,

    #[error("The dentist already has an appointment in this time slot")]
    SlotConflict,

    #[error("Appointment not found")]
    NotFound,

    #[error("Cannot move appointment from {from} to {to}")]
    InvalidStatusTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SchedulingError {
    /// Stable machine-readable code surfaced alongside the human-readable
    /// message; clients branch on this, never on the message text.
    pub fn code(&self) -> &'static str {
        match self {
            SchedulingError::MalformedInput(_) => "malformed_input",
            SchedulingError::PastDateRejected => "past_date_rejected",
            SchedulingError::HorizonExceeded(_) => "horizon_exceeded",
            SchedulingError::DentistUnavailable => "dentist_unavailable",
            SchedulingError::TimeOutsideWindow => "time_outside_window",
            SchedulingError::SlotConflict => "slot_conflict",
            SchedulingError::NotFound => "not_found",
            SchedulingError::InvalidStatusTransition { .. } => "invalid_status_transition",
            SchedulingError::Validation(_) => "validation_error",
            SchedulingError::Forbidden(_) => "forbidden",
            SchedulingError::Internal(_) => "internal",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            SchedulingError::MalformedInput(_) | SchedulingError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            SchedulingError::PastDateRejected
            | SchedulingError::HorizonExceeded(_)
            | SchedulingError::DentistUnavailable
            | SchedulingError::TimeOutsideWindow => StatusCode::UNPROCESSABLE_ENTITY,
            SchedulingError::SlotConflict | SchedulingError::InvalidStatusTransition { .. } => {
                StatusCode::CONFLICT
            }
            SchedulingError::NotFound => StatusCode::NOT_FOUND,
            SchedulingError::Forbidden(_) => StatusCode::FORBIDDEN,
            SchedulingError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SchedulingError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!("Scheduling error {}: {}", status, message);
        } else {
            tracing::debug!("Scheduling rejection {}: {}", self.code(), message);
        }

        let body = Json(json!({
            "error": message,
            "code": self.code(),
        }));

        (status, body).into_response()
    }
}

// ==============================================================================
// INPUT PARSING
// ==============================================================================

pub fn parse_date(raw: &str) -> Result<NaiveDate, SchedulingError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        SchedulingError::MalformedInput(format!("'{}' is not a valid YYYY-MM-DD date", raw))
    })
}

pub fn parse_time(raw: &str) -> Result<NaiveTime, SchedulingError> {
    NaiveTime::parse_from_str(raw, "%H:%M").map_err(|_| {
        SchedulingError::MalformedInput(format!("'{}' is not a valid HH:MM time", raw))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn status_lifecycle() {
        use AppointmentStatus::*;

        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Completed));
        assert!(Confirmed.can_transition_to(Cancelled));

        assert!(!Pending.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Confirmed));
        assert!(!Cancelled.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(Cancelled));
    }

    #[test]
    fn active_statuses_occupy_slots() {
        assert!(AppointmentStatus::Pending.is_active());
        assert!(AppointmentStatus::Confirmed.is_active());
        assert!(!AppointmentStatus::Completed.is_active());
        assert!(!AppointmentStatus::Cancelled.is_active());
    }

    #[test]
    fn parses_wire_formats() {
        assert_eq!(
            parse_date("2026-09-14").unwrap(),
            NaiveDate::from_ymd_opt(2026, 9, 14).unwrap()
        );
        assert_eq!(
            parse_time("08:30").unwrap(),
            NaiveTime::from_hms_opt(8, 30, 0).unwrap()
        );

        assert_matches!(parse_date("14/09/2026"), Err(SchedulingError::MalformedInput(_)));
        assert_matches!(parse_time("8 o'clock"), Err(SchedulingError::MalformedInput(_)));
    }

    #[test]
    fn time_off_covers_inclusive_range() {
        let time_off = TimeOff {
            id: Uuid::new_v4(),
            dentist_id: Uuid::new_v4(),
            start_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 9, 3).unwrap(),
            reason: None,
        };

        assert!(time_off.covers(NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()));
        assert!(time_off.covers(NaiveDate::from_ymd_opt(2026, 9, 3).unwrap()));
        assert!(!time_off.covers(NaiveDate::from_ymd_opt(2026, 9, 4).unwrap()));
    }
}
