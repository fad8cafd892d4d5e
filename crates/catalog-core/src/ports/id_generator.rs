//! HandleGenerator port - BlobHandle 生成の抽象化
//!
//! テスト容易性のために、trait として抽象化しています。
//!
//! # 実装
//! - **UlidHandleGenerator**: ULID ベース（本番用）

use crate::domain::ids::BlobHandle;
use crate::ports::Clock;
use ulid::Ulid;

/// HandleGenerator は推測不能な BlobHandle を生成
///
/// # Thread Safety
/// - `Send + Sync` を要求（registry は複数タスクから共有される）
pub trait HandleGenerator: Send + Sync {
    fn generate_blob_handle(&self) -> BlobHandle;
}

/// UlidHandleGenerator は ULID ベースのハンドル生成器
///
/// Clock を使って timestamp 部分を決め、残り 80-bit は乱数で埋めます。
/// FixedClock を渡しても乱数部分があるのでハンドルは衝突しません。
pub struct UlidHandleGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidHandleGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> HandleGenerator for UlidHandleGenerator<C> {
    fn generate_blob_handle(&self) -> BlobHandle {
        let timestamp_ms = self.clock.now().timestamp_millis() as u64;
        let ulid = Ulid::from_parts(timestamp_ms, rand::random());
        BlobHandle::from(ulid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{FixedClock, SystemClock};
    use chrono::{TimeZone, Utc};

    #[test]
    fn generator_generates_unique_handles() {
        let id_gen = UlidHandleGenerator::new(SystemClock);

        let h1 = id_gen.generate_blob_handle();
        let h2 = id_gen.generate_blob_handle();
        let h3 = id_gen.generate_blob_handle();

        assert_ne!(h1, h2);
        assert_ne!(h2, h3);
        assert_ne!(h1, h3);
    }

    #[test]
    fn generator_with_fixed_clock_shares_timestamp() {
        let fixed_time = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let id_gen = UlidHandleGenerator::new(FixedClock::new(fixed_time));

        let h1 = id_gen.generate_blob_handle();
        let h2 = id_gen.generate_blob_handle();

        // ランダム部分があるので別物
        assert_ne!(h1, h2);

        let timestamp1 = (h1.as_ulid().0 >> 80) as u64;
        let timestamp2 = (h2.as_ulid().0 >> 80) as u64;
        assert_eq!(timestamp1, timestamp2);
        assert_eq!(timestamp1, fixed_time.timestamp_millis() as u64);
    }
}
