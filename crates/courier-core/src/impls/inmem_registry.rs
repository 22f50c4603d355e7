//! InMemoryRegistryStore - 開発用の destination レジストリ

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ChannelId, Destination, DestinationId, Interest};
use crate::ports::{RegistryStore, StoreError};

/// HashMap<DestinationId, Destination> を Mutex で守るだけの実装
///
/// ロックは各メソッド内で完結し、await を跨がない。
#[derive(Default)]
pub struct InMemoryRegistryStore {
    records: Mutex<HashMap<DestinationId, Destination>>,
}

impl InMemoryRegistryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[async_trait]
impl RegistryStore for InMemoryRegistryStore {
    async fn get(&self, id: &DestinationId) -> Result<Option<Destination>, StoreError> {
        Ok(self.records.lock().await.get(id).cloned())
    }

    async fn insert(&self, destination: Destination) -> Result<(), StoreError> {
        let mut records = self.records.lock().await;
        if records.contains_key(&destination.id) {
            return Err(StoreError::Duplicate(destination.id.to_string()));
        }
        records.insert(destination.id.clone(), destination);
        Ok(())
    }

    async fn delete(&self, id: &DestinationId) -> Result<bool, StoreError> {
        Ok(self.records.lock().await.remove(id).is_some())
    }

    async fn update_channels(
        &self,
        id: &DestinationId,
        channels: Vec<ChannelId>,
    ) -> Result<(), StoreError> {
        let mut records = self.records.lock().await;
        let record = records
            .get_mut(id)
            .ok_or_else(|| StoreError::Missing(id.to_string()))?;
        record.channels = channels;
        Ok(())
    }

    async fn update_interests(
        &self,
        id: &DestinationId,
        interests: Vec<Interest>,
    ) -> Result<(), StoreError> {
        let mut records = self.records.lock().await;
        let record = records
            .get_mut(id)
            .ok_or_else(|| StoreError::Missing(id.to_string()))?;
        record.interests = interests;
        Ok(())
    }
}
