//! Test wiring shared by the app-layer tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::Notify;

use super::coordinator::Coordinator;
use super::fanout::Fanout;
use super::poller::Poller;
use crate::config::{LockDiscipline, RelayConfig};
use crate::domain::{ChannelId, Destination, DestinationId, Interest, Item, ItemId, Scope};
use crate::impls::{
    InMemoryDedupStore, InMemoryRegistryStore, RecordingDeliveryPlatform, ScriptedSearchProvider,
};
use crate::ports::{
    FixedClock, RegistryStore, SearchError, SearchProvider, SearchRequest, StoreError,
    UlidGenerator,
};

/// Item whose title is its id, so deliveries are easy to read back.
pub fn item(id: &str) -> Item {
    Item {
        id: ItemId::new(id),
        scope: Scope::named("space"),
        permalink: format!("/r/space/comments/{id}/"),
        author: "astro".into(),
        title: id.to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 11, 55, 0).unwrap(),
        score: 3,
        comment_count: 1,
    }
}

pub fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
    expected
        .iter()
        .map(|(i, c)| (i.to_string(), c.to_string()))
        .collect()
}

pub struct Harness {
    pub registry: Arc<InMemoryRegistryStore>,
    /// What the coordinator actually talks to; wraps `registry`.
    pub faults: Arc<FaultyRegistry>,
    pub dedup: Arc<InMemoryDedupStore>,
    pub search: Arc<ScriptedSearchProvider>,
    pub platform: Arc<RecordingDeliveryPlatform>,
    pub clock: FixedClock,
    pub coordinator: Arc<Coordinator>,
}

impl Harness {
    pub fn new() -> Self {
        let search = Arc::new(ScriptedSearchProvider::new());
        Self::build(search.clone(), search, LockDiscipline::PerDestination)
    }

    pub fn with_search(provider: Arc<dyn SearchProvider>, discipline: LockDiscipline) -> Self {
        Self::build(provider, Arc::new(ScriptedSearchProvider::new()), discipline)
    }

    fn build(
        provider: Arc<dyn SearchProvider>,
        search: Arc<ScriptedSearchProvider>,
        discipline: LockDiscipline,
    ) -> Self {
        let config = RelayConfig {
            lock_discipline: discipline,
            ..RelayConfig::default()
        };
        let registry = Arc::new(InMemoryRegistryStore::new());
        let faults = Arc::new(FaultyRegistry::new(registry.clone()));
        let dedup = Arc::new(InMemoryDedupStore::new());
        let platform = Arc::new(RecordingDeliveryPlatform::new());
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap());

        let poller = Poller::new(
            provider,
            dedup.clone(),
            Arc::new(UlidGenerator::new(clock.clone())),
            Arc::new(clock.clone()),
            Fanout::new(platform.clone(), &config),
            config.search_limit,
            config.dedup_ttl(),
        );
        let coordinator = Arc::new(Coordinator::new(
            faults.clone(),
            poller,
            config.lock_discipline,
        ));

        Self {
            registry,
            faults,
            dedup,
            search,
            platform,
            clock,
            coordinator,
        }
    }

    /// `(item id, channel)` for every successful dispatch, in order.
    pub async fn delivered(&self) -> Vec<(String, String)> {
        self.platform
            .dispatches()
            .await
            .into_iter()
            .map(|d| (d.payload.title, d.channel.to_string()))
            .collect()
    }
}

/// Registry whose deletes can be made to fail; everything else passes through.
pub struct FaultyRegistry {
    inner: Arc<InMemoryRegistryStore>,
    fail_deletes: AtomicBool,
}

impl FaultyRegistry {
    pub fn new(inner: Arc<InMemoryRegistryStore>) -> Self {
        Self {
            inner,
            fail_deletes: AtomicBool::new(false),
        }
    }

    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl RegistryStore for FaultyRegistry {
    async fn get(&self, id: &DestinationId) -> Result<Option<Destination>, StoreError> {
        self.inner.get(id).await
    }

    async fn insert(&self, destination: Destination) -> Result<(), StoreError> {
        self.inner.insert(destination).await
    }

    async fn delete(&self, id: &DestinationId) -> Result<bool, StoreError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("delete rejected".into()));
        }
        self.inner.delete(id).await
    }

    async fn update_channels(
        &self,
        id: &DestinationId,
        channels: Vec<ChannelId>,
    ) -> Result<(), StoreError> {
        self.inner.update_channels(id, channels).await
    }

    async fn update_interests(
        &self,
        id: &DestinationId,
        interests: Vec<Interest>,
    ) -> Result<(), StoreError> {
        self.inner.update_interests(id, interests).await
    }
}

/// Search provider that blocks every call until the test releases it.
pub struct GatedSearch {
    entered: Notify,
    released: Notify,
    items: std::sync::Mutex<Vec<Item>>,
    calls: AtomicUsize,
}

impl GatedSearch {
    pub fn new() -> Self {
        Self {
            entered: Notify::new(),
            released: Notify::new(),
            items: std::sync::Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Wait until a search call is in flight.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    /// Let the in-flight (or next) call return `items`.
    pub fn release(&self, items: Vec<Item>) {
        *self.items.lock().unwrap() = items;
        self.released.notify_one();
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchProvider for GatedSearch {
    async fn search(&self, _request: &SearchRequest) -> Result<Vec<Item>, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();
        self.released.notified().await;
        Ok(std::mem::take(&mut *self.items.lock().unwrap()))
    }
}
