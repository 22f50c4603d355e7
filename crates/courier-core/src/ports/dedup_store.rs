//! DedupStore port - 配送済みアイテムの記録
//!
//! `(item_id, destination_id)` ごとに最大 1 件。期限切れのレコードは存在しないものとして
//! 扱い、`purge_expired` で（いずれ）削除します。

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::registry_store::StoreError;
use crate::domain::DeliveredItem;

#[async_trait]
pub trait DedupStore: Send + Sync {
    /// Atomically insert `record` unless an unexpired record with the same key
    /// exists. Returns `true` when inserted.
    async fn record_if_absent(
        &self,
        record: DeliveredItem,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Remove every record expired at `now`; returns how many were removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, StoreError>;

    /// Number of stored records, expired or not.
    async fn len(&self) -> Result<usize, StoreError>;
}
