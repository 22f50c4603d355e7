//! State - Worker の状態
//!
//! ```text
//! Idle --start()--> Running --stop()--> Stopping --loop exits--> Terminated
//! ```
//!
//! `stop()` は割り込みではありません。実行中の poll は最後まで走り、
//! 次のループ判定で抜けます。

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    /// Constructed, not yet started.
    Idle,
    Running,
    /// Stop requested; no new cycle will begin.
    Stopping,
    Terminated,
}

impl WorkerState {
    pub fn is_running(self) -> bool {
        matches!(self, WorkerState::Running)
    }
}
