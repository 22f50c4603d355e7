//! RecordingDeliveryPlatform - 送信内容を記録するだけの配送先
//!
//! デモとテスト用。チャンネル一覧は `set_channels` で与え、
//! `fail_channel` で指定したチャンネルへの送信は失敗させられます。

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

use crate::domain::{ChannelId, DeliveryPayload, DestinationId};
use crate::ports::{ChannelInfo, DeliveryError, DeliveryPlatform};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub channel: ChannelId,
    pub payload: DeliveryPayload,
}

#[derive(Default)]
pub struct RecordingDeliveryPlatform {
    directory: Mutex<HashMap<DestinationId, Vec<ChannelInfo>>>,
    failing: Mutex<HashSet<ChannelId>>,
    dispatches: Mutex<Vec<Dispatch>>,
}

impl RecordingDeliveryPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_channels(&self, destination: &DestinationId, channels: Vec<ChannelInfo>) {
        self.directory
            .lock()
            .await
            .insert(destination.clone(), channels);
    }

    pub async fn fail_channel(&self, channel: &ChannelId) {
        self.failing.lock().await.insert(channel.clone());
    }

    /// Successful dispatches, in the order they happened.
    pub async fn dispatches(&self) -> Vec<Dispatch> {
        self.dispatches.lock().await.clone()
    }

    /// `(item title url, channel)` pairs; handy for asserting fan-out order.
    pub async fn delivered_pairs(&self) -> Vec<(String, ChannelId)> {
        self.dispatches
            .lock()
            .await
            .iter()
            .map(|d| (d.payload.title_url.clone(), d.channel.clone()))
            .collect()
    }
}

#[async_trait]
impl DeliveryPlatform for RecordingDeliveryPlatform {
    async fn post_message(
        &self,
        channel: &ChannelId,
        payload: &DeliveryPayload,
    ) -> Result<(), DeliveryError> {
        if self.failing.lock().await.contains(channel) {
            return Err(DeliveryError::Forbidden(channel.clone()));
        }
        info!(channel = %channel, title = %payload.title, "delivered");
        self.dispatches.lock().await.push(Dispatch {
            channel: channel.clone(),
            payload: payload.clone(),
        });
        Ok(())
    }

    async fn list_channels(
        &self,
        destination: &DestinationId,
    ) -> Result<Vec<ChannelInfo>, DeliveryError> {
        Ok(self
            .directory
            .lock()
            .await
            .get(destination)
            .cloned()
            .unwrap_or_default())
    }
}
