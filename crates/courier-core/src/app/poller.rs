//! Poller - 検索して新着だけを配送する 1 サイクル分の処理
//!
//! # フロー
//! 1. interest ごとに上限付き検索（新しい順・直近 1 時間・plain text）
//! 2. 返ってきた順に `(item_id, destination_id)` で dedup を確認
//! 3. 未配送なら先に DeliveredItem を記録（fan-out の失敗で再配送しないため）
//! 4. destination の全チャンネルへ fan-out
//!
//! 呼び出し側（Coordinator）が destination のロックを握っている前提です。

use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, error, warn};

use super::fanout::Fanout;
use crate::domain::{DeliveredItem, Destination, Item, PollReport};
use crate::ports::{Clock, DedupStore, IdGenerator, SearchProvider, SearchRequest};

pub struct Poller {
    search: Arc<dyn SearchProvider>,
    dedup: Arc<dyn DedupStore>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
    fanout: Fanout,
    search_limit: usize,
    dedup_ttl: Duration,
}

impl Poller {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        dedup: Arc<dyn DedupStore>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
        fanout: Fanout,
        search_limit: usize,
        dedup_ttl: Duration,
    ) -> Self {
        Self {
            search,
            dedup,
            ids,
            clock,
            fanout,
            search_limit,
            dedup_ttl,
        }
    }

    /// Run one search-and-deliver cycle over a snapshot of `destination`.
    pub async fn run(&self, destination: &Destination) -> PollReport {
        let mut report = PollReport {
            interests: destination.interests.len(),
            ..PollReport::default()
        };

        for interest in &destination.interests {
            let request = SearchRequest::recent(interest, self.search_limit);
            let items = match self.search.search(&request).await {
                Ok(items) => items,
                Err(e) => {
                    report.failed_searches += 1;
                    warn!(destination = %destination.id, interest = %interest, error = %e, "search failed");
                    continue;
                }
            };
            debug!(destination = %destination.id, interest = %interest, results = items.len(), "search finished");

            for item in &items {
                report.items_seen += 1;
                match self.record(destination, item).await {
                    Recorded::New => {
                        report.new_items += 1;
                        let fanout = self
                            .fanout
                            .deliver(&destination.id, item, &destination.channels)
                            .await;
                        report.absorb(fanout);
                    }
                    Recorded::Duplicate => report.duplicates += 1,
                    Recorded::Failed => report.unrecorded += 1,
                }
            }
        }

        report
    }

    async fn record(&self, destination: &Destination, item: &Item) -> Recorded {
        let now = self.clock.now();
        let record = DeliveredItem::observed(
            self.ids.generate_record_id(),
            item,
            self.fanout.item_url(item),
            destination.id.clone(),
            now,
            self.dedup_ttl,
        );

        match self.dedup.record_if_absent(record, now).await {
            Ok(true) => Recorded::New,
            Ok(false) => Recorded::Duplicate,
            Err(e) => {
                // 記録できないまま配送すると次のサイクルで重複するので、配送しない
                error!(destination = %destination.id, item = %item.id, error = %e, "failed to record delivered item");
                Recorded::Failed
            }
        }
    }
}

enum Recorded {
    New,
    Duplicate,
    Failed,
}
