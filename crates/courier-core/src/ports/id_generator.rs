//! IdGenerator port - ID 生成の抽象化
//!
//! dedup レコードごとに新しい RecordId を割り当てます。
//!
//! # 実装
//! - **UlidGenerator**: ULID ベース（本番用）

use crate::domain::RecordId;
use crate::ports::Clock;
use ulid::Ulid;

/// IdGenerator は RecordId を生成
///
/// # Thread Safety
/// - `Send + Sync` を要求（複数の worker から同時に使われる）
pub trait IdGenerator: Send + Sync {
    fn generate_record_id(&self) -> RecordId;
}

/// UlidGenerator は ULID ベースの ID 生成器
///
/// Clock を使って現在時刻ベースの ULID を生成します。
/// これにより、テスト時に FixedClock を使って timestamp 部分を固定できます。
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_record_id(&self) -> RecordId {
        // 負の timestamp（1970 年以前）は 0 に丸める
        let timestamp_ms = self.clock.now().timestamp_millis().max(0) as u64;
        RecordId::from_ulid(Ulid::from_parts(timestamp_ms, rand::random()))
    }
}
