// libs/scheduling-cell/src/router.rs
use axum::{
    middleware,
    routing::{delete, get, patch},
    Router,
};
use std::sync::Arc;

use shared_utils::extractor::caller_middleware;

use crate::handlers;
use crate::state::SchedulingState;

/// All scheduling routes. Slot lookup is public; everything else requires a
/// gateway-asserted caller identity.
pub fn scheduling_routes(state: Arc<SchedulingState>) -> Router {
    let public = Router::new().route("/available-slots", get(handlers::get_available_slots));

    let protected = Router::new()
        .route(
            "/appointments",
            get(handlers::list_appointments).post(handlers::book_appointment),
        )
        .route("/appointments/{id}", get(handlers::get_appointment))
        .route(
            "/appointments/{id}/status",
            patch(handlers::update_appointment_status),
        )
        .route(
            "/dentists/{dentist_id}/windows",
            get(handlers::list_schedule_windows).post(handlers::create_schedule_window),
        )
        .route(
            "/dentists/{dentist_id}/windows/{window_id}",
            delete(handlers::delete_schedule_window),
        )
        .route(
            "/dentists/{dentist_id}/time-off",
            get(handlers::list_time_off).post(handlers::create_time_off),
        )
        .route(
            "/dentists/{dentist_id}/time-off/{time_off_id}",
            delete(handlers::delete_time_off),
        )
        .layer(middleware::from_fn(caller_middleware));

    public.merge(protected).with_state(state)
}
