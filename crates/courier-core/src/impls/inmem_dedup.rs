//! InMemoryDedupStore - 開発用の配送済みレコード置き場
//!
//! 期限切れレコードは lookup 時には無視し、物理削除は `purge_expired`
//! （`DedupSweeper` から定期的に呼ばれる）に任せます。

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::{DeliveredItem, DestinationId, ItemId};
use crate::ports::{DedupStore, StoreError};

#[derive(Default)]
pub struct InMemoryDedupStore {
    records: Mutex<HashMap<(ItemId, DestinationId), DeliveredItem>>,
}

impl InMemoryDedupStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every record for `destination`, oldest first.
    pub async fn records_for(&self, destination: &DestinationId) -> Vec<DeliveredItem> {
        let records = self.records.lock().await;
        let mut out: Vec<DeliveredItem> = records
            .values()
            .filter(|r| &r.destination_id == destination)
            .cloned()
            .collect();
        out.sort_by_key(|r| (r.created_at, r.record_id));
        out
    }
}

#[async_trait]
impl DedupStore for InMemoryDedupStore {
    async fn record_if_absent(
        &self,
        record: DeliveredItem,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut records = self.records.lock().await;
        let key = record.key();
        if records.get(&key).is_some_and(|r| !r.is_expired(now)) {
            return Ok(false);
        }
        // 期限切れの古いレコードは上書きする
        records.insert(key, record);
        Ok(true)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, StoreError> {
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|_, r| !r.is_expired(now));
        Ok(before - records.len())
    }

    async fn len(&self) -> Result<usize, StoreError> {
        Ok(self.records.lock().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Item, RecordId, Scope};
    use chrono::{Duration, TimeZone};
    use ulid::Ulid;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn record(item: &str, dest: &str, now: DateTime<Utc>) -> DeliveredItem {
        let item = Item {
            id: ItemId::new(item),
            scope: Scope::All,
            permalink: format!("/r/all/{item}"),
            author: "a".into(),
            title: "t".into(),
            created_at: now,
            score: 0,
            comment_count: 0,
        };
        DeliveredItem::observed(
            RecordId::from_ulid(Ulid::new()),
            &item,
            item.permalink.clone(),
            DestinationId::new(dest),
            now,
            Duration::minutes(60),
        )
    }

    #[tokio::test]
    async fn record_if_absent_is_unique_per_item_and_destination() {
        let store = InMemoryDedupStore::new();

        assert!(store.record_if_absent(record("p1", "srv1", t0()), t0()).await.unwrap());
        assert!(!store.record_if_absent(record("p1", "srv1", t0()), t0()).await.unwrap());
        // 同じ item でも destination が違えば別レコード
        assert!(store.record_if_absent(record("p1", "srv2", t0()), t0()).await.unwrap());

        assert_eq!(store.len().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn expired_records_are_absent_and_replaceable() {
        let store = InMemoryDedupStore::new();
        store.record_if_absent(record("p1", "srv1", t0()), t0()).await.unwrap();

        // 期限ちょうど（expires_at <= now）で無いものとして扱う
        let later = t0() + Duration::minutes(60);
        assert!(store.record_if_absent(record("p1", "srv1", later), later).await.unwrap());
        assert_eq!(store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn purge_removes_only_expired() {
        let store = InMemoryDedupStore::new();
        store.record_if_absent(record("old", "srv1", t0()), t0()).await.unwrap();
        let mid = t0() + Duration::minutes(30);
        store.record_if_absent(record("new", "srv1", mid), mid).await.unwrap();

        let removed = store
            .purge_expired(t0() + Duration::minutes(61))
            .await
            .unwrap();

        assert_eq!(removed, 1);
        let left = store.records_for(&DestinationId::new("srv1")).await;
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].item_id, ItemId::new("new"));
    }
}
