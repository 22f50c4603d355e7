//! PollingWorker - destination ごとのポーリングループ
//!
//! # ループ
//! 1. 状態が Running でなければ抜ける
//! 2. `Coordinator::poll` を実行（失敗してもループは続ける）
//! 3. `interval` だけ待つ。待機中に stop が来たらすぐ起きる
//!
//! stop は割り込みではない: 実行中の poll は最後まで走り、次の判定で抜ける。

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::coordinator::Coordinator;
use crate::domain::{DestinationId, ErrorKind, WorkerState};

/// One polling task for one destination.
pub struct PollingWorker {
    destination: DestinationId,
    coordinator: Arc<Coordinator>,
    interval: Duration,
    state_tx: Arc<watch::Sender<WorkerState>>,
    cycles: Arc<AtomicU64>,
    join: Option<JoinHandle<()>>,
}

impl PollingWorker {
    /// Create an `Idle` worker. Nothing runs until [`start`](Self::start).
    pub fn new(destination: DestinationId, coordinator: Arc<Coordinator>, interval: Duration) -> Self {
        let (state_tx, _) = watch::channel(WorkerState::Idle);
        Self {
            destination,
            coordinator,
            interval,
            state_tx: Arc::new(state_tx),
            cycles: Arc::new(AtomicU64::new(0)),
            join: None,
        }
    }

    pub fn destination(&self) -> &DestinationId {
        &self.destination
    }

    pub fn state(&self) -> WorkerState {
        *self.state_tx.borrow()
    }

    /// Completed poll cycles so far.
    pub fn cycles(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }

    pub fn subscribe(&self) -> watch::Receiver<WorkerState> {
        self.state_tx.subscribe()
    }

    /// `Idle -> Running`. Returns `false` (and does nothing) from any other state.
    pub fn start(&mut self) -> bool {
        let started = self.state_tx.send_if_modified(|state| {
            if *state == WorkerState::Idle {
                *state = WorkerState::Running;
                true
            } else {
                false
            }
        });
        if !started {
            return false;
        }

        let destination = self.destination.clone();
        let coordinator = Arc::clone(&self.coordinator);
        let state_tx = Arc::clone(&self.state_tx);
        let cycles = Arc::clone(&self.cycles);
        let interval = self.interval;

        self.join = Some(tokio::spawn(async move {
            info!(destination = %destination, "worker started");
            poll_loop(&destination, &coordinator, &state_tx, &cycles, interval).await;
            state_tx.send_replace(WorkerState::Terminated);
            info!(destination = %destination, "worker stopped");
        }));
        true
    }

    /// `Running -> Stopping`. Non-blocking; returns whether the request took effect.
    pub fn stop(&self) -> bool {
        let requested = self.state_tx.send_if_modified(|state| {
            if *state == WorkerState::Running {
                *state = WorkerState::Stopping;
                true
            } else {
                false
            }
        });
        if requested {
            debug!(destination = %self.destination, "stop requested");
        }
        requested
    }

    /// Wait until the loop has exited. Returns immediately for a worker that never started.
    pub async fn join(mut self) {
        if let Some(join) = self.join.take() {
            // ignore join error: the loop itself never panics on poll errors
            let _ = join.await;
        }
    }

    /// Request stop and wait for termination.
    pub async fn stop_and_join(self) {
        self.stop();
        self.join().await;
    }
}

async fn poll_loop(
    destination: &DestinationId,
    coordinator: &Coordinator,
    state_tx: &watch::Sender<WorkerState>,
    cycles: &AtomicU64,
    interval: Duration,
) {
    let mut state_rx = state_tx.subscribe();

    loop {
        if !state_rx.borrow_and_update().is_running() {
            break;
        }

        match coordinator.poll(destination).await {
            Ok(report) => {
                debug!(
                    destination = %destination,
                    new_items = report.new_items,
                    deliveries = report.deliveries,
                    "search run finished"
                );
            }
            Err(e) => match e.kind() {
                ErrorKind::Infrastructure => {
                    error!(destination = %destination, error = %e, "poll failed");
                }
                kind => {
                    warn!(destination = %destination, ?kind, error = %e, "poll failed");
                }
            },
        }
        cycles.fetch_add(1, Ordering::Relaxed);

        // sleep は stop で打ち切る（次のループ判定で抜ける）
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = stop_requested(&mut state_rx) => {}
        }
    }
}

async fn stop_requested(state_rx: &mut watch::Receiver<WorkerState>) {
    // Err は sender が drop された場合のみ。どちらにせよループ判定に戻る
    let _ = state_rx.wait_for(|state| !state.is_running()).await;
}
