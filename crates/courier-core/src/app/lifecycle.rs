//! LifecycleManager - destination の参加/離脱と worker の起動/停止
//!
//! # 責務
//! - active worker 表（destination → PollingWorker）を唯一の所有者として管理
//! - 1 destination につき Running な worker は高々 1 つ
//! - 参加時: 読み書きできるテキストチャンネルだけを登録（worker は自動起動しない）
//! - 離脱時: worker がいれば先に止め、レコードを削除する（削除が失敗しても worker は止まる。
//!   配送済み履歴は期限切れを待つ）

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::coordinator::Coordinator;
use super::worker::PollingWorker;
use crate::domain::{
    ChannelId, DestinationId, MutationOutcome, RelayError, WorkerCommandOutcome, WorkerState,
};
use crate::ports::DeliveryPlatform;

/// Serializable view of one active worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerStatus {
    pub destination: DestinationId,
    pub state: WorkerState,
    pub cycles: u64,
}

/// Serializable view of the relay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayStatus {
    pub workers: Vec<WorkerStatus>,
}

pub struct LifecycleManager {
    coordinator: Arc<Coordinator>,
    platform: Arc<dyn DeliveryPlatform>,
    poll_interval: Duration,
    workers: Mutex<HashMap<DestinationId, PollingWorker>>,
}

impl LifecycleManager {
    pub fn new(
        coordinator: Arc<Coordinator>,
        platform: Arc<dyn DeliveryPlatform>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            coordinator,
            platform,
            poll_interval,
            workers: Mutex::new(HashMap::new()),
        }
    }

    pub fn coordinator(&self) -> &Arc<Coordinator> {
        &self.coordinator
    }

    /// Start polling `destination`.
    pub async fn start(&self, destination: &DestinationId) -> WorkerCommandOutcome {
        let mut workers = self.workers.lock().await;
        if workers.contains_key(destination) {
            return WorkerCommandOutcome::AlreadyRunning;
        }

        let mut worker = PollingWorker::new(
            destination.clone(),
            Arc::clone(&self.coordinator),
            self.poll_interval,
        );
        worker.start();
        workers.insert(destination.clone(), worker);
        info!(destination = %destination, "polling started");
        WorkerCommandOutcome::Started
    }

    /// Ask the worker of `destination` to stop and forget it.
    ///
    /// Does not wait: an in-flight poll finishes in the background.
    pub async fn stop(&self, destination: &DestinationId) -> WorkerCommandOutcome {
        let removed = self.workers.lock().await.remove(destination);
        match removed {
            Some(worker) => {
                worker.stop();
                info!(destination = %destination, "polling stopping");
                WorkerCommandOutcome::Stopping
            }
            None => WorkerCommandOutcome::AlreadyStopped,
        }
    }

    pub async fn is_running(&self, destination: &DestinationId) -> bool {
        self.workers.lock().await.contains_key(destination)
    }

    /// The bot joined `destination`: register its eligible channels.
    pub async fn on_destination_activated(
        &self,
        destination: &DestinationId,
    ) -> Result<MutationOutcome, RelayError> {
        let channels: Vec<ChannelId> = self
            .platform
            .list_channels(destination)
            .await?
            .into_iter()
            .filter(|c| c.is_eligible())
            .map(|c| c.id)
            .collect();

        let eligible = channels.len();
        let outcome = self.coordinator.add_destination(destination, channels).await?;
        if outcome.is_applied() {
            info!(destination = %destination, eligible, "destination activated");
        } else {
            // 再参加: 既存の登録（interest を含む）はそのまま
            debug!(destination = %destination, ?outcome, "destination already registered");
        }
        Ok(outcome)
    }

    /// The bot left `destination`: stop its worker and drop its record.
    ///
    /// The worker is stopped even when the registry removal fails.
    pub async fn on_destination_deactivated(
        &self,
        destination: &DestinationId,
    ) -> Result<MutationOutcome, RelayError> {
        self.stop(destination).await;
        let outcome = self.coordinator.remove_destination(destination).await?;
        info!(destination = %destination, "destination deactivated");
        Ok(outcome)
    }

    pub async fn status(&self) -> RelayStatus {
        let workers = self.workers.lock().await;
        let mut out: Vec<WorkerStatus> = workers
            .values()
            .map(|w| WorkerStatus {
                destination: w.destination().clone(),
                state: w.state(),
                cycles: w.cycles(),
            })
            .collect();
        out.sort_by(|a, b| a.destination.cmp(&b.destination));
        RelayStatus { workers: out }
    }

    /// Stop every worker and wait for all of them to exit.
    pub async fn shutdown(&self) {
        let workers: Vec<PollingWorker> = {
            let mut table = self.workers.lock().await;
            table.drain().map(|(_, w)| w).collect()
        };
        info!(workers = workers.len(), "shutting down workers");
        for worker in &workers {
            worker.stop();
        }
        for worker in workers {
            worker.join().await;
        }
    }
}
