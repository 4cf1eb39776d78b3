// libs/scheduling-cell/src/state.rs
use std::sync::Arc;

use crate::services::booking::DayLockMap;
use crate::store::{AppointmentStore, InMemoryStore, SchedulePolicyStore};

/// Shared state for the scheduling cell: the two externally-owned stores plus
/// the per-(dentist, date) admission locks. Services are cheap per-request
/// constructions over this.
pub struct SchedulingState {
    pub policy: Arc<dyn SchedulePolicyStore>,
    pub appointments: Arc<dyn AppointmentStore>,
    pub day_locks: Arc<DayLockMap>,
}

impl SchedulingState {
    pub fn new(
        policy: Arc<dyn SchedulePolicyStore>,
        appointments: Arc<dyn AppointmentStore>,
    ) -> Arc<Self> {
        Arc::new(Self {
            policy,
            appointments,
            day_locks: Arc::new(DayLockMap::new()),
        })
    }

    /// State backed by a single in-memory store, used by the standalone
    /// server and the test suites.
    pub fn in_memory() -> Arc<Self> {
        let store = Arc::new(InMemoryStore::new());
        Self::new(store.clone(), store)
    }
}
