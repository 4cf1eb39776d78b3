// libs/scheduling-cell/src/handlers.rs
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use shared_models::auth::Caller;

use crate::models::{
    AppointmentSearchQuery, AvailableSlotsResponse, BookAppointmentRequest, CreateTimeOffRequest,
    CreateWindowRequest, SchedulingError, SlotQuery, UpdateStatusRequest, parse_date,
};
use crate::services::availability::AvailabilityService;
use crate::services::booking::BookingService;
use crate::services::slots::SlotCalculator;
use crate::state::SchedulingState;

// ==============================================================================
// SLOTS
// ==============================================================================

/// GET /available-slots?dentist_id=...&date=YYYY-MM-DD
///
/// Public read; a closed or unknown day answers with an empty list rather
/// than an error.
pub async fn get_available_slots(
    State(state): State<Arc<SchedulingState>>,
    Query(query): Query<SlotQuery>,
) -> Result<impl IntoResponse, SchedulingError> {
    let date = parse_date(&query.date)?;
    debug!("Slot lookup for dentist {} on {}", query.dentist_id, date);

    let slots = SlotCalculator::new(&state)
        .available_slots(query.dentist_id, date)
        .await?;

    Ok(Json(AvailableSlotsResponse {
        dentist_id: query.dentist_id,
        date,
        available_slots: slots.iter().map(|t| t.format("%H:%M").to_string()).collect(),
    }))
}

// ==============================================================================
// APPOINTMENTS
// ==============================================================================

/// POST /appointments
pub async fn book_appointment(
    State(state): State<Arc<SchedulingState>>,
    Extension(caller): Extension<Caller>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<impl IntoResponse, SchedulingError> {
    let caps = caller.capabilities();
    if !caps.can_book {
        return Err(SchedulingError::Forbidden(
            "caller cannot book appointments".to_string(),
        ));
    }
    // Callers without admission rights book for themselves only.
    if !caps.can_admit && request.patient_id != caller.user_id {
        return Err(SchedulingError::Forbidden(
            "caller can only book their own appointments".to_string(),
        ));
    }

    let appointment = BookingService::new(&state).propose_booking(request).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

/// GET /appointments with optional dentist_id/patient_id/date/active_only
/// filters. Callers without admission rights are scoped to their own
/// appointments regardless of the filters they send.
pub async fn list_appointments(
    State(state): State<Arc<SchedulingState>>,
    Extension(caller): Extension<Caller>,
    Query(mut query): Query<AppointmentSearchQuery>,
) -> Result<impl IntoResponse, SchedulingError> {
    if !caller.capabilities().can_admit {
        query.patient_id = Some(caller.user_id);
    }

    let appointments = BookingService::new(&state).search(&query).await?;
    Ok(Json(appointments))
}

/// GET /appointments/{id}
pub async fn get_appointment(
    State(state): State<Arc<SchedulingState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, SchedulingError> {
    let appointment = BookingService::new(&state).get(id).await?;
    if !caller.capabilities().can_admit && appointment.patient_id != caller.user_id {
        return Err(SchedulingError::Forbidden(
            "caller cannot view this appointment".to_string(),
        ));
    }
    Ok(Json(appointment))
}

/// PATCH /appointments/{id}/status
pub async fn update_appointment_status(
    State(state): State<Arc<SchedulingState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, SchedulingError> {
    if !caller.capabilities().can_admit {
        return Err(SchedulingError::Forbidden(
            "caller cannot manage the appointment lifecycle".to_string(),
        ));
    }

    let appointment = BookingService::new(&state)
        .update_status(id, request.status)
        .await?;
    Ok(Json(appointment))
}

// ==============================================================================
// SCHEDULE ADMINISTRATION
// ==============================================================================

/// POST /dentists/{dentist_id}/windows
pub async fn create_schedule_window(
    State(state): State<Arc<SchedulingState>>,
    Extension(caller): Extension<Caller>,
    Path(dentist_id): Path<Uuid>,
    Json(request): Json<CreateWindowRequest>,
) -> Result<impl IntoResponse, SchedulingError> {
    require_schedule_access(&caller)?;

    let window = AvailabilityService::new(&state)
        .create_window(dentist_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(window)))
}

/// GET /dentists/{dentist_id}/windows
pub async fn list_schedule_windows(
    State(state): State<Arc<SchedulingState>>,
    Path(dentist_id): Path<Uuid>,
) -> Result<impl IntoResponse, SchedulingError> {
    let windows = AvailabilityService::new(&state).list_windows(dentist_id).await?;
    Ok(Json(windows))
}

/// DELETE /dentists/{dentist_id}/windows/{window_id}
pub async fn delete_schedule_window(
    State(state): State<Arc<SchedulingState>>,
    Extension(caller): Extension<Caller>,
    Path((dentist_id, window_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, SchedulingError> {
    require_schedule_access(&caller)?;

    AvailabilityService::new(&state)
        .delete_window(dentist_id, window_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /dentists/{dentist_id}/time-off
pub async fn create_time_off(
    State(state): State<Arc<SchedulingState>>,
    Extension(caller): Extension<Caller>,
    Path(dentist_id): Path<Uuid>,
    Json(request): Json<CreateTimeOffRequest>,
) -> Result<impl IntoResponse, SchedulingError> {
    require_schedule_access(&caller)?;

    let time_off = AvailabilityService::new(&state)
        .create_time_off(dentist_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(time_off)))
}

/// GET /dentists/{dentist_id}/time-off
pub async fn list_time_off(
    State(state): State<Arc<SchedulingState>>,
    Path(dentist_id): Path<Uuid>,
) -> Result<impl IntoResponse, SchedulingError> {
    let time_off = AvailabilityService::new(&state).list_time_off(dentist_id).await?;
    Ok(Json(time_off))
}

/// DELETE /dentists/{dentist_id}/time-off/{time_off_id}
pub async fn delete_time_off(
    State(state): State<Arc<SchedulingState>>,
    Extension(caller): Extension<Caller>,
    Path((dentist_id, time_off_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, SchedulingError> {
    require_schedule_access(&caller)?;

    AvailabilityService::new(&state)
        .delete_time_off(dentist_id, time_off_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

fn require_schedule_access(caller: &Caller) -> Result<(), SchedulingError> {
    if caller.capabilities().can_modify_schedule {
        Ok(())
    } else {
        Err(SchedulingError::Forbidden(
            "caller cannot modify schedules".to_string(),
        ))
    }
}
