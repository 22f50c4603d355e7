//! RelayBuilder - ports を組み合わせて Relay を構築
//!
//! # Fail-fast 設計
//! - build() 時に設定を検証し、未指定の port があれば BuildError を返す
//! - clock / id generator は省略可（SystemClock / UlidGenerator）

use std::sync::Arc;

use tracing::info;

use super::coordinator::Coordinator;
use super::fanout::Fanout;
use super::lifecycle::LifecycleManager;
use super::poller::Poller;
use super::sweeper::DedupSweeper;
use crate::config::RelayConfig;
use crate::domain::RelayError;
use crate::ports::{
    Clock, DedupStore, DeliveryPlatform, IdGenerator, RegistryStore, SearchProvider, SystemClock,
    UlidGenerator,
};

/// BuildError は Relay 構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("missing port: {0}. Register it on the builder before build().")]
    MissingPort(&'static str),

    #[error(transparent)]
    InvalidConfig(#[from] RelayError),
}

/// # 使用例
/// ```ignore
/// let relay = RelayBuilder::new(config)
///     .search(search)
///     .platform(platform)
///     .registry(registry)
///     .dedup(dedup)
///     .build()?;
/// ```
pub struct RelayBuilder {
    config: RelayConfig,
    search: Option<Arc<dyn SearchProvider>>,
    platform: Option<Arc<dyn DeliveryPlatform>>,
    registry: Option<Arc<dyn RegistryStore>>,
    dedup: Option<Arc<dyn DedupStore>>,
    clock: Option<Arc<dyn Clock>>,
    ids: Option<Arc<dyn IdGenerator>>,
}

impl RelayBuilder {
    pub fn new(config: RelayConfig) -> Self {
        Self {
            config,
            search: None,
            platform: None,
            registry: None,
            dedup: None,
            clock: None,
            ids: None,
        }
    }

    pub fn search(mut self, search: Arc<dyn SearchProvider>) -> Self {
        self.search = Some(search);
        self
    }

    pub fn platform(mut self, platform: Arc<dyn DeliveryPlatform>) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn registry(mut self, registry: Arc<dyn RegistryStore>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn dedup(mut self, dedup: Arc<dyn DedupStore>) -> Self {
        self.dedup = Some(dedup);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn build(self) -> Result<Relay, BuildError> {
        self.config.validate()?;

        let search = self.search.ok_or(BuildError::MissingPort("search provider"))?;
        let platform = self.platform.ok_or(BuildError::MissingPort("delivery platform"))?;
        let registry = self.registry.ok_or(BuildError::MissingPort("registry store"))?;
        let dedup = self.dedup.ok_or(BuildError::MissingPort("dedup store"))?;
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let ids = self
            .ids
            .unwrap_or_else(|| Arc::new(UlidGenerator::new(Arc::clone(&clock))));

        let poller = Poller::new(
            search,
            Arc::clone(&dedup),
            ids,
            Arc::clone(&clock),
            Fanout::new(Arc::clone(&platform), &self.config),
            self.config.search_limit,
            self.config.dedup_ttl(),
        );
        let coordinator = Arc::new(Coordinator::new(
            registry,
            poller,
            self.config.lock_discipline,
        ));
        info!(
            discipline = ?coordinator.discipline(),
            poll_interval_secs = self.config.poll_interval_secs,
            "relay built"
        );
        let lifecycle = LifecycleManager::new(
            Arc::clone(&coordinator),
            platform,
            self.config.poll_interval(),
        );

        Ok(Relay {
            config: self.config,
            coordinator,
            lifecycle,
            dedup,
            clock,
        })
    }
}

/// 構築済みの relay 一式
pub struct Relay {
    pub config: RelayConfig,
    pub coordinator: Arc<Coordinator>,
    pub lifecycle: LifecycleManager,
    dedup: Arc<dyn DedupStore>,
    clock: Arc<dyn Clock>,
}

impl Relay {
    /// Spawn the periodic purge of expired dedup records.
    pub fn spawn_sweeper(&self) -> DedupSweeper {
        DedupSweeper::spawn(
            Arc::clone(&self.dedup),
            Arc::clone(&self.clock),
            self.config.sweep_interval(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LockDiscipline;
    use crate::domain::{DestinationId, WorkerCommandOutcome};
    use rstest::rstest;
    use crate::impls::{
        InMemoryDedupStore, InMemoryRegistryStore, RecordingDeliveryPlatform,
        ScriptedSearchProvider,
    };

    fn complete(config: RelayConfig) -> RelayBuilder {
        RelayBuilder::new(config)
            .search(Arc::new(ScriptedSearchProvider::new()))
            .platform(Arc::new(RecordingDeliveryPlatform::new()))
            .registry(Arc::new(InMemoryRegistryStore::new()))
            .dedup(Arc::new(InMemoryDedupStore::new()))
    }

    #[test]
    fn missing_port_is_reported() {
        let result = RelayBuilder::new(RelayConfig::default())
            .search(Arc::new(ScriptedSearchProvider::new()))
            .build();

        match result {
            Err(BuildError::MissingPort(port)) => assert_eq!(port, "delivery platform"),
            _ => panic!("expected MissingPort"),
        }
    }

    #[test]
    fn invalid_config_fails_before_wiring() {
        let config = RelayConfig {
            poll_interval_secs: 0,
            ..RelayConfig::default()
        };

        assert!(matches!(
            complete(config).build(),
            Err(BuildError::InvalidConfig(RelayError::Config(_)))
        ));
    }

    #[rstest]
    #[case(LockDiscipline::PerDestination)]
    #[case(LockDiscipline::Global)]
    fn coordinator_follows_configured_discipline(#[case] discipline: LockDiscipline) {
        let config = RelayConfig {
            lock_discipline: discipline,
            ..RelayConfig::default()
        };

        let relay = complete(config).build().unwrap();

        assert_eq!(relay.coordinator.discipline(), discipline);
    }

    #[tokio::test]
    async fn built_relay_runs_and_shuts_down() {
        let relay = complete(RelayConfig::default()).build().unwrap();
        let srv1 = DestinationId::new("srv1");

        relay.lifecycle.on_destination_activated(&srv1).await.unwrap();
        assert_eq!(
            relay.lifecycle.start(&srv1).await,
            WorkerCommandOutcome::Started
        );
        let sweeper = relay.spawn_sweeper();

        sweeper.shutdown_and_join().await;
        relay.lifecycle.shutdown().await;
        assert!(relay.lifecycle.status().await.workers.is_empty());
    }
}
