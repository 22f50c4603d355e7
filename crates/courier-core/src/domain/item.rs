//! Discovered items and their dedup records.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::destination::Scope;
use super::ids::{DestinationId, ItemId, RecordId};

/// One search result returned by the content provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub scope: Scope,
    /// Path relative to the provider's base URL (e.g. `/r/space/comments/...`).
    pub permalink: String,
    pub author: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub score: i64,
    pub comment_count: u64,
}

/// Dedup record: marks `item_id` as already delivered to `destination_id`.
///
/// Unique by `(item_id, destination_id)`. Expired records are treated as absent
/// and removed eventually by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveredItem {
    pub record_id: RecordId,
    pub item_id: ItemId,
    pub scope: Scope,
    pub url: String,
    pub item_created_at: DateTime<Utc>,
    pub destination_id: DestinationId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl DeliveredItem {
    /// Build the record for `item` first observed at `now`.
    pub fn observed(
        record_id: RecordId,
        item: &Item,
        url: String,
        destination_id: DestinationId,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            record_id,
            item_id: item.id.clone(),
            scope: item.scope.clone(),
            url,
            item_created_at: item.created_at,
            destination_id,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn key(&self) -> (ItemId, DestinationId) {
        (self.item_id.clone(), self.destination_id.clone())
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
