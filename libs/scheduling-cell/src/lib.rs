// libs/scheduling-cell/src/lib.rs
//
// Appointment scheduling cell: weekly availability windows and time off,
// slot calculation, and admission control for booking proposals.

pub mod handlers;
pub mod interval;
pub mod models;
pub mod router;
pub mod services;
pub mod state;
pub mod store;

pub use router::scheduling_routes;
pub use state::SchedulingState;
