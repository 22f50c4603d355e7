//! RegistryStore port - destination レコードの永続化
//!
//! 保存技術は問いません。各操作は 1 レコード単位でアトミックであることだけを要求します。
//! read-modify-write の整合性は Coordinator のロックで保証します。

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{ChannelId, Destination, DestinationId, Interest};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record already exists: {0}")]
    Duplicate(String),

    #[error("record not found: {0}")]
    Missing(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait RegistryStore: Send + Sync {
    async fn get(&self, id: &DestinationId) -> Result<Option<Destination>, StoreError>;

    /// Fails with `Duplicate` when a record with the same id exists.
    async fn insert(&self, destination: Destination) -> Result<(), StoreError>;

    /// Returns whether a record was removed.
    async fn delete(&self, id: &DestinationId) -> Result<bool, StoreError>;

    /// Replace the channel list. Fails with `Missing` for unknown ids.
    async fn update_channels(
        &self,
        id: &DestinationId,
        channels: Vec<ChannelId>,
    ) -> Result<(), StoreError>;

    /// Replace the interest set. Fails with `Missing` for unknown ids.
    async fn update_interests(
        &self,
        id: &DestinationId,
        interests: Vec<Interest>,
    ) -> Result<(), StoreError>;
}
