//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせて relay のロジックを実装します。
//!
//! # 主要コンポーネント
//! - **RelayBuilder**: ports と設定のワイヤリング
//! - **Coordinator**: 同一 destination 上の poll と変更操作を直列化
//! - **Poller**: 検索 → dedup → fan-out の 1 サイクル
//! - **Fanout**: destination の全チャンネルへの配送
//! - **PollingWorker**: destination ごとのポーリングループ
//! - **LifecycleManager**: worker の起動/停止と destination の参加/離脱
//! - **DedupSweeper**: 期限切れ配送レコードの掃除

pub mod builder;
pub mod coordinator;
pub mod fanout;
pub mod lifecycle;
pub mod poller;
pub mod sweeper;
pub mod worker;

#[cfg(test)]
pub mod testing;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, Relay, RelayBuilder};
pub use self::coordinator::Coordinator;
pub use self::fanout::Fanout;
pub use self::lifecycle::{LifecycleManager, RelayStatus, WorkerStatus};
pub use self::poller::Poller;
pub use self::sweeper::{DedupSweeper, sweep_once};
pub use self::worker::PollingWorker;
