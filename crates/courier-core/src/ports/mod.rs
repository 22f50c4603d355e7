//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait は外部システム（検索プロバイダ、配送プラットフォーム、永続化層）への
//! インターフェースを提供し、実装の詳細を隠蔽します。

pub mod clock;
pub mod dedup_store;
pub mod delivery;
pub mod id_generator;
pub mod registry_store;
pub mod search;

// 主要な trait を再エクスポート
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::dedup_store::DedupStore;
pub use self::delivery::{ChannelInfo, DeliveryError, DeliveryPlatform};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::registry_store::{RegistryStore, StoreError};
pub use self::search::{
    MAX_PAGE_SIZE, QuerySyntax, SearchError, SearchProvider, SearchRequest, SortOrder, TimeWindow,
};
