//! Impls - 実装
//!
//! ports の開発用実装を提供します。
//!
//! # 主要な実装
//! - **InMemoryRegistryStore**: destination レジストリ
//! - **InMemoryDedupStore**: 配送済みレコード（期限付き）
//! - **ScriptedSearchProvider**: 応答を事前に仕込める検索プロバイダ
//! - **RecordingDeliveryPlatform**: 送信を記録する配送先

pub mod inmem_dedup;
pub mod inmem_registry;
pub mod recording_delivery;
pub mod scripted_search;

pub use self::inmem_dedup::InMemoryDedupStore;
pub use self::inmem_registry::InMemoryRegistryStore;
pub use self::recording_delivery::{Dispatch, RecordingDeliveryPlatform};
pub use self::scripted_search::ScriptedSearchProvider;
