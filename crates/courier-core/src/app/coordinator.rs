//! Coordinator - poll と設定変更の排他制御
//!
//! poll（検索 + 配送）と mutation（channel / interest / destination の追加削除）は
//! 同じ destination レコードを読み書きするため、同時に走らせません。
//!
//! # ロックの粒度
//! - `PerDestination`（既定）: destination ごとに 1 つの非同期 Mutex。
//!   別の destination の poll は並行に進む
//! - `Global`: 全操作を 1 つの Mutex で直列化する
//!
//! `tokio::sync::Mutex` は FIFO で公平なので、poll 中に来た mutation は
//! その poll が終わった直後に取得でき、どちらの種類の操作も飢餓状態になりません。

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};

use super::poller::Poller;
use crate::config::LockDiscipline;
use crate::domain::{
    ChannelId, Destination, DestinationId, Interest, MutationOutcome, PollReport, RelayError,
};
use crate::ports::RegistryStore;

/// Hands out the exclusive region guarding a destination's record.
struct LockTable {
    discipline: LockDiscipline,
    global: Arc<Mutex<()>>,
    per_destination: std::sync::Mutex<HashMap<DestinationId, Arc<Mutex<()>>>>,
}

impl LockTable {
    fn new(discipline: LockDiscipline) -> Self {
        Self {
            discipline,
            global: Arc::new(Mutex::new(())),
            per_destination: std::sync::Mutex::new(HashMap::new()),
        }
    }

    fn region(&self, id: &DestinationId) -> Arc<Mutex<()>> {
        match self.discipline {
            LockDiscipline::Global => Arc::clone(&self.global),
            LockDiscipline::PerDestination => {
                // 短い同期区間のみ（await を跨がない）
                let mut table = self
                    .per_destination
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                Arc::clone(table.entry(id.clone()).or_default())
            }
        }
    }

    async fn acquire(&self, id: &DestinationId) -> OwnedMutexGuard<()> {
        self.region(id).lock_owned().await
    }

    /// Drop the entry for `id` if nobody else holds or waits on it.
    fn prune(&self, id: &DestinationId) {
        if self.discipline != LockDiscipline::PerDestination {
            return;
        }
        let mut table = self
            .per_destination
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // 他の保持者は必ずこの表から clone しているので、count == 1 なら誰も使っていない
        if table.get(id).is_some_and(|m| Arc::strong_count(m) == 1) {
            table.remove(id);
        }
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.per_destination
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

/// Shared gatekeeper between polling workers and the control surface.
pub struct Coordinator {
    registry: Arc<dyn RegistryStore>,
    poller: Poller,
    locks: LockTable,
}

impl Coordinator {
    pub fn new(registry: Arc<dyn RegistryStore>, poller: Poller, discipline: LockDiscipline) -> Self {
        Self {
            registry,
            poller,
            locks: LockTable::new(discipline),
        }
    }

    pub fn discipline(&self) -> LockDiscipline {
        self.locks.discipline
    }

    /// Search and deliver for `id` against a snapshot taken at call time.
    ///
    /// Returns after every resulting delivery has been dispatched.
    pub async fn poll(&self, id: &DestinationId) -> Result<PollReport, RelayError> {
        let guard = self.locks.acquire(id).await;

        let Some(destination) = self.registry.get(id).await? else {
            self.release_unregistered(guard, id);
            return Err(RelayError::DestinationNotFound(id.clone()));
        };

        let report = self.poller.run(&destination).await;
        debug!(destination = %id, ?report, "poll finished");
        Ok(report)
    }

    /// Snapshot of a destination's record.
    pub async fn destination(&self, id: &DestinationId) -> Result<Option<Destination>, RelayError> {
        let guard = self.locks.acquire(id).await;
        let destination = self.registry.get(id).await?;
        if destination.is_none() {
            self.release_unregistered(guard, id);
        }
        Ok(destination)
    }

    /// Register `id` with `channels` and an empty interest set.
    pub async fn add_destination(
        &self,
        id: &DestinationId,
        channels: Vec<ChannelId>,
    ) -> Result<MutationOutcome, RelayError> {
        let _guard = self.locks.acquire(id).await;

        if self.registry.get(id).await?.is_some() {
            return Ok(MutationOutcome::AlreadyExists);
        }
        let count = channels.len();
        self.registry
            .insert(Destination::new(id.clone(), channels))
            .await?;
        info!(destination = %id, channels = count, "destination registered");
        Ok(MutationOutcome::Applied)
    }

    /// Delete the record of `id`. Delivered-item history is left to expire.
    pub async fn remove_destination(&self, id: &DestinationId) -> Result<MutationOutcome, RelayError> {
        let outcome = {
            let _guard = self.locks.acquire(id).await;
            if self.registry.delete(id).await? {
                info!(destination = %id, "destination removed");
                MutationOutcome::Applied
            } else {
                MutationOutcome::NotFound
            }
        };
        self.locks.prune(id);
        Ok(outcome)
    }

    /// Append `channel`, creating the record if needed. Duplicates are kept.
    pub async fn add_channel(
        &self,
        id: &DestinationId,
        channel: ChannelId,
    ) -> Result<MutationOutcome, RelayError> {
        let _guard = self.locks.acquire(id).await;

        match self.registry.get(id).await? {
            Some(mut destination) => {
                destination.channels.push(channel.clone());
                self.registry.update_channels(id, destination.channels).await?;
            }
            None => {
                self.registry
                    .insert(Destination::new(id.clone(), vec![channel.clone()]))
                    .await?;
            }
        }
        info!(destination = %id, channel = %channel, "channel added");
        Ok(MutationOutcome::Applied)
    }

    /// Remove every occurrence of `channel`.
    pub async fn remove_channel(
        &self,
        id: &DestinationId,
        channel: &ChannelId,
    ) -> Result<MutationOutcome, RelayError> {
        let guard = self.locks.acquire(id).await;

        let Some(mut destination) = self.registry.get(id).await? else {
            self.release_unregistered(guard, id);
            return Ok(MutationOutcome::NotFound);
        };
        if !destination.has_channel(channel) {
            return Ok(MutationOutcome::NotFound);
        }
        destination.channels.retain(|c| c != channel);
        self.registry.update_channels(id, destination.channels).await?;
        info!(destination = %id, channel = %channel, "channel removed");
        Ok(MutationOutcome::Applied)
    }

    /// Add `interest` unless the same `(query, scope)` is already present.
    pub async fn add_interest(
        &self,
        id: &DestinationId,
        interest: Interest,
    ) -> Result<MutationOutcome, RelayError> {
        let _guard = self.locks.acquire(id).await;

        match self.registry.get(id).await? {
            Some(destination) if destination.has_interest(&interest) => {
                return Ok(MutationOutcome::AlreadyExists);
            }
            Some(mut destination) => {
                destination.interests.push(interest.clone());
                self.registry
                    .update_interests(id, destination.interests)
                    .await?;
            }
            None => {
                let mut destination = Destination::new(id.clone(), Vec::new());
                destination.interests.push(interest.clone());
                self.registry.insert(destination).await?;
            }
        }
        info!(destination = %id, interest = %interest, "interest added");
        Ok(MutationOutcome::Applied)
    }

    /// Remove `interest`; `NotFound` leaves the registry untouched.
    pub async fn remove_interest(
        &self,
        id: &DestinationId,
        interest: &Interest,
    ) -> Result<MutationOutcome, RelayError> {
        let guard = self.locks.acquire(id).await;

        let Some(mut destination) = self.registry.get(id).await? else {
            self.release_unregistered(guard, id);
            return Ok(MutationOutcome::NotFound);
        };
        if !destination.has_interest(interest) {
            return Ok(MutationOutcome::NotFound);
        }
        destination.interests.retain(|i| i != interest);
        self.registry
            .update_interests(id, destination.interests)
            .await?;
        info!(destination = %id, interest = %interest, "interest removed");
        Ok(MutationOutcome::Applied)
    }

    /// Release the region of an id with no record, dropping its lock entry.
    fn release_unregistered(&self, guard: OwnedMutexGuard<()>, id: &DestinationId) {
        drop(guard);
        self.locks.prune(id);
    }

    #[cfg(test)]
    fn tracked_locks(&self) -> usize {
        self.locks.tracked()
    }
}
