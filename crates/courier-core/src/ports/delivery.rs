//! DeliveryPlatform port - 配送先プラットフォーム
//!
//! メッセージ送信と、destination に属するチャンネル一覧の取得を提供します。
//! 1 チャンネルへの送信失敗は致命的ではありません。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{ChannelId, DeliveryPayload, DestinationId};

/// A channel as seen by the platform's directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    pub id: ChannelId,
    /// Text channels are the only ones that accept item messages.
    pub is_text: bool,
    pub can_read: bool,
    pub can_post: bool,
}

impl ChannelInfo {
    /// Whether items may be delivered here.
    pub fn is_eligible(&self) -> bool {
        self.is_text && self.can_read && self.can_post
    }
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("missing permission in channel {0}")]
    Forbidden(ChannelId),

    #[error("platform unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait DeliveryPlatform: Send + Sync {
    async fn post_message(
        &self,
        channel: &ChannelId,
        payload: &DeliveryPayload,
    ) -> Result<(), DeliveryError>;

    /// Every channel of `destination`, eligible or not.
    async fn list_channels(
        &self,
        destination: &DestinationId,
    ) -> Result<Vec<ChannelInfo>, DeliveryError>;
}
