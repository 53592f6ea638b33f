use serde::{Deserialize, Serialize};

/// Point-in-time view of a worker host, produced by an external store.
///
/// Read-only input: the ledger derives its effective slot counts from
/// `available_slots` at refresh time, and the ranker breaks ties on
/// `mean_active_tasks`. Liveness and eligibility filtering happen before a
/// host reaches this crate; `up` is carried for callers that pre-filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostState {
    pub host_id: String,
    pub available_slots: u32,
    pub max_slots: u32,
    pub mean_active_tasks: f64,
    pub up: bool,
}

impl HostState {
    pub fn new(host_id: impl Into<String>, available_slots: u32, max_slots: u32) -> Self {
        Self {
            host_id: host_id.into(),
            available_slots,
            max_slots,
            mean_active_tasks: 0.0,
            up: true,
        }
    }

    pub fn with_mean_active_tasks(mut self, mean: f64) -> Self {
        self.mean_active_tasks = mean;
        self
    }
}
