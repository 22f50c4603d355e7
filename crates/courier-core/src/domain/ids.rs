//! Domain identifiers (strongly-typed keys).
//!
//! 外部プラットフォームから渡される ID はすべて不透明な文字列です。
//! `Key<M>` というジェネリック型で共通実装を提供し、
//! `M` はマーカー型（PhantomData）として型安全性だけを担います。
//!
//! ```ignore
//! let dest = DestinationId::new("srv1");
//! let chan = ChannelId::new("c1");
//! // dest と chan は異なる型なので、混同できない
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use ulid::Ulid;

/// KeyMarker は各キー型のマーカー trait
pub trait KeyMarker: Send + Sync + 'static {
    /// Debug 出力で使うラベル（例: "destination"）
    fn label() -> &'static str;
}

/// ジェネリックな文字列キー
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct Key<M: KeyMarker> {
    value: String,
    #[serde(skip)]
    _marker: PhantomData<M>,
}

impl<M: KeyMarker> Key<M> {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

// derive だと `M: Clone` などを要求してしまうので手書きする
impl<M: KeyMarker> Clone for Key<M> {
    fn clone(&self) -> Self {
        Self::new(self.value.clone())
    }
}

impl<M: KeyMarker> PartialEq for Key<M> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<M: KeyMarker> Eq for Key<M> {}

impl<M: KeyMarker> std::hash::Hash for Key<M> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<M: KeyMarker> PartialOrd for Key<M> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<M: KeyMarker> Ord for Key<M> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.value.cmp(&other.value)
    }
}

impl<M: KeyMarker> fmt::Debug for Key<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", M::label(), self.value)
    }
}

impl<M: KeyMarker> fmt::Display for Key<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<M: KeyMarker> From<&str> for Key<M> {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<M: KeyMarker> From<String> for Key<M> {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

// ========================================
// マーカー型の定義
// ========================================

/// Destination（サーバー / コミュニティ）のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {}

impl KeyMarker for Destination {
    fn label() -> &'static str {
        "destination"
    }
}

/// 配送先チャンネルのマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {}

impl KeyMarker for Channel {
    fn label() -> &'static str {
        "channel"
    }
}

/// 検索結果アイテムのマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Item {}

impl KeyMarker for Item {
    fn label() -> &'static str {
        "item"
    }
}

/// Identifier of a registered destination (community/server).
pub type DestinationId = Key<Destination>;

/// Identifier of a delivery channel inside a destination.
pub type ChannelId = Key<Channel>;

/// Provider-assigned identifier of a discovered item.
pub type ItemId = Key<Item>;

/// Identifier of a single DeliveredItem record.
///
/// Generated locally (see `ports::IdGenerator`), sortable by creation time.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(Ulid);

impl RecordId {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }

    pub fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "delivered-{}", self.0)
    }
}
