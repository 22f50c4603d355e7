//! Fanout - 新着アイテムを destination の全チャンネルへ配送
//!
//! チャンネルは保存順に 1 つずつ送信します。あるチャンネルの失敗は記録して
//! 次へ進むだけで、他のチャンネルや dedup の記録には影響しません。

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::RelayConfig;
use crate::domain::{ChannelId, DeliveryPayload, DestinationId, FanoutReport, Item};
use crate::ports::DeliveryPlatform;

pub struct Fanout {
    platform: Arc<dyn DeliveryPlatform>,
    base_url: String,
    title_limit: usize,
}

impl Fanout {
    pub fn new(platform: Arc<dyn DeliveryPlatform>, config: &RelayConfig) -> Self {
        Self {
            platform,
            base_url: config.content_base_url.clone(),
            title_limit: config.title_limit,
        }
    }

    pub fn payload_for(&self, item: &Item) -> DeliveryPayload {
        DeliveryPayload::for_item(item, &self.base_url, self.title_limit)
    }

    /// Canonical URL recorded alongside the dedup record.
    pub fn item_url(&self, item: &Item) -> String {
        crate::domain::payload::item_url(&self.base_url, &item.permalink)
    }

    /// Deliver `item` to every channel of the snapshot, in order.
    pub async fn deliver(
        &self,
        destination: &DestinationId,
        item: &Item,
        channels: &[ChannelId],
    ) -> FanoutReport {
        let payload = self.payload_for(item);
        let mut report = FanoutReport::default();

        for channel in channels {
            report.attempted += 1;
            match self.platform.post_message(channel, &payload).await {
                Ok(()) => {
                    debug!(destination = %destination, channel = %channel, item = %item.id, "item delivered");
                }
                Err(e) => {
                    report.failed += 1;
                    warn!(destination = %destination, channel = %channel, item = %item.id, error = %e, "delivery failed");
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ItemId, Scope};
    use crate::impls::RecordingDeliveryPlatform;
    use chrono::{TimeZone, Utc};

    fn item(id: &str) -> Item {
        Item {
            id: ItemId::new(id),
            scope: Scope::named("space"),
            permalink: format!("/r/space/comments/{id}/"),
            author: "astro".into(),
            title: format!("title {id}"),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
            score: 1,
            comment_count: 0,
        }
    }

    #[tokio::test]
    async fn delivers_in_channel_order() {
        let platform = Arc::new(RecordingDeliveryPlatform::new());
        let fanout = Fanout::new(platform.clone(), &RelayConfig::default());
        let channels = vec![ChannelId::new("c2"), ChannelId::new("c1")];

        let report = fanout
            .deliver(&DestinationId::new("srv1"), &item("p1"), &channels)
            .await;

        assert_eq!(report, FanoutReport { attempted: 2, failed: 0 });
        let delivered: Vec<ChannelId> = platform
            .dispatches()
            .await
            .into_iter()
            .map(|d| d.channel)
            .collect();
        assert_eq!(delivered, channels);
    }

    #[tokio::test]
    async fn failing_channel_does_not_abort_others() {
        let platform = Arc::new(RecordingDeliveryPlatform::new());
        platform.fail_channel(&ChannelId::new("c1")).await;
        let fanout = Fanout::new(platform.clone(), &RelayConfig::default());

        let report = fanout
            .deliver(
                &DestinationId::new("srv1"),
                &item("p1"),
                &[ChannelId::new("c1"), ChannelId::new("c2")],
            )
            .await;

        assert_eq!(report, FanoutReport { attempted: 2, failed: 1 });
        let dispatches = platform.dispatches().await;
        assert_eq!(dispatches.len(), 1);
        assert_eq!(dispatches[0].channel, ChannelId::new("c2"));
    }

    #[tokio::test]
    async fn duplicate_channels_receive_twice() {
        let platform = Arc::new(RecordingDeliveryPlatform::new());
        let fanout = Fanout::new(platform.clone(), &RelayConfig::default());

        fanout
            .deliver(
                &DestinationId::new("srv1"),
                &item("p1"),
                &[ChannelId::new("c1"), ChannelId::new("c1")],
            )
            .await;

        assert_eq!(platform.dispatches().await.len(), 2);
    }
}
