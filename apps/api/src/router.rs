use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use scheduling_cell::{SchedulingState, scheduling_routes};

pub fn create_router(state: Arc<SchedulingState>) -> Router {
    Router::new()
        .route("/health", get(|| async { "Dental clinic scheduling API is running!" }))
        .nest("/api/v1/scheduling", scheduling_routes(state))
}
