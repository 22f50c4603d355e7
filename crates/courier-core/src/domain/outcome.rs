//! Outcomes of coordinator and lifecycle operations.

use serde::{Deserialize, Serialize};

/// Result of a registry mutation.
///
/// `AlreadyExists` and `NotFound` are reported without touching the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationOutcome {
    Applied,
    AlreadyExists,
    NotFound,
}

impl MutationOutcome {
    pub fn is_applied(self) -> bool {
        matches!(self, MutationOutcome::Applied)
    }
}

/// Result of a start/stop request for a destination's worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerCommandOutcome {
    Started,
    AlreadyRunning,
    /// Stop was requested; the worker exits after its in-flight poll.
    Stopping,
    AlreadyStopped,
}

/// Counters for a single poll cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollReport {
    pub interests: usize,
    pub failed_searches: usize,
    pub items_seen: usize,
    pub duplicates: usize,
    pub new_items: usize,
    /// Items skipped because their dedup record could not be written.
    pub unrecorded: usize,
    pub deliveries: usize,
    pub failed_deliveries: usize,
}

impl PollReport {
    pub fn absorb(&mut self, fanout: FanoutReport) {
        self.deliveries += fanout.attempted;
        self.failed_deliveries += fanout.failed;
    }
}

/// Counters for one item's fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FanoutReport {
    pub attempted: usize,
    pub failed: usize,
}
