//! BlobHandleRegistry - 有効な blob ハンドルのインメモリ管理

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::{BlobHandle, ImageBytes, ProductImage};
use crate::ports::{HandleGenerator, SystemClock, UlidHandleGenerator};

/// Registry の内部状態
#[derive(Default)]
struct RegistryState {
    /// 有効なハンドルと、それが指す bytes
    live: HashMap<BlobHandle, ImageBytes>,
}

/// blob ハンドルを発行・解放する唯一の窓口
///
/// clone しても同じ集合を共有する。ロックは短い同期区間だけ取り、
/// `.await` をまたいで保持しない。並行する pipeline の `register` /
/// `release` が途中状態を観測することはない。
#[derive(Clone)]
pub struct BlobHandleRegistry {
    state: Arc<Mutex<RegistryState>>,
    generator: Arc<dyn HandleGenerator>,
}

impl BlobHandleRegistry {
    pub fn new() -> Self {
        Self::with_generator(Arc::new(UlidHandleGenerator::new(SystemClock)))
    }

    pub fn with_generator(generator: Arc<dyn HandleGenerator>) -> Self {
        Self {
            state: Arc::new(Mutex::new(RegistryState::default())),
            generator,
        }
    }

    // Poisoning is ignored: no method leaves the map half-updated.
    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// bytes を登録して新しいハンドルを返す（失敗しない）
    pub fn register(&self, bytes: impl Into<ImageBytes>) -> BlobHandle {
        let bytes = bytes.into();
        let mut state = self.lock();
        let mut handle = self.generator.generate_blob_handle();
        while state.live.contains_key(&handle) {
            handle = self.generator.generate_blob_handle();
        }
        let len = bytes.len();
        state.live.insert(handle.clone(), bytes);
        tracing::debug!(%handle, len, live = state.live.len(), "blob registered");
        handle
    }

    /// ハンドルを解放する。存在しなければ何もしない（2 回呼んでもよい）。
    /// 実際に削除したかどうかを返す。
    pub fn release(&self, handle: &BlobHandle) -> bool {
        let mut state = self.lock();
        let removed = state.live.remove(handle).is_some();
        if removed {
            tracing::debug!(%handle, live = state.live.len(), "blob released");
        }
        removed
    }

    /// 商品画像がハンドルなら解放
    ///
    /// `None` と `Static` は登録されないので無視する。
    pub fn release_image(&self, image: &ProductImage) -> bool {
        match image.blob_handle() {
            Some(handle) => self.release(handle),
            None => false,
        }
    }

    /// 有効なハンドルをすべて解放（終了処理用）
    pub fn release_all(&self) -> usize {
        let mut state = self.lock();
        let released = state.live.len();
        state.live.clear();
        if released > 0 {
            tracing::debug!(released, "all blobs released");
        }
        released
    }

    /// ハンドルが指す bytes。解放済みなら `None`
    pub fn get(&self, handle: &BlobHandle) -> Option<ImageBytes> {
        self.lock().live.get(handle).cloned()
    }

    pub fn contains(&self, handle: &BlobHandle) -> bool {
        self.lock().live.contains_key(handle)
    }

    pub fn live_count(&self) -> usize {
        self.lock().live.len()
    }

    /// 有効なハンドルが保持する bytes の合計
    pub fn live_bytes(&self) -> usize {
        self.lock().live.values().map(|b| b.len()).sum()
    }
}

impl Default for BlobHandleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::FixedClock;
    use chrono::{TimeZone, Utc};

    fn bytes(n: u8) -> Vec<u8> {
        vec![n; 4]
    }

    #[test]
    fn register_adds_live_handle() {
        let registry = BlobHandleRegistry::new();
        let handle = registry.register(bytes(1));

        assert!(registry.contains(&handle));
        assert_eq!(registry.live_count(), 1);
        assert_eq!(registry.get(&handle).as_deref(), Some(&bytes(1)[..]));
    }

    #[test]
    fn register_returns_distinct_handles() {
        let registry = BlobHandleRegistry::new();
        let h1 = registry.register(bytes(1));
        let h2 = registry.register(bytes(1));
        assert_ne!(h1, h2);
        assert_eq!(registry.live_count(), 2);
    }

    #[test]
    fn release_is_idempotent() {
        let registry = BlobHandleRegistry::new();
        let keep = registry.register(bytes(1));
        let handle = registry.register(bytes(2));

        assert!(registry.release(&handle));
        let after_once = registry.live_count();
        assert!(!registry.release(&handle));

        assert_eq!(registry.live_count(), after_once);
        assert_eq!(registry.live_count(), 1);
        assert!(registry.contains(&keep));
        assert!(registry.get(&handle).is_none());
    }

    #[test]
    fn release_of_unknown_handle_is_noop() {
        let registry = BlobHandleRegistry::new();
        registry.register(bytes(1));
        let other = BlobHandleRegistry::new().register(bytes(2));

        assert!(!registry.release(&other));
        assert_eq!(registry.live_count(), 1);
    }

    #[test]
    fn live_count_is_registrations_minus_distinct_releases() {
        let registry = BlobHandleRegistry::new();
        let handles: Vec<_> = (0..5).map(|i| registry.register(bytes(i))).collect();

        registry.release(&handles[0]);
        registry.release(&handles[0]);
        registry.release(&handles[3]);

        assert_eq!(registry.live_count(), 5 - 2);
    }

    #[test]
    fn release_image_ignores_none_and_static() {
        let registry = BlobHandleRegistry::new();
        let handle = registry.register(bytes(1));

        assert!(!registry.release_image(&ProductImage::None));
        assert!(!registry.release_image(&ProductImage::Static("./assets/a.svg".into())));
        assert_eq!(registry.live_count(), 1);

        assert!(registry.release_image(&ProductImage::Blob(handle)));
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn release_all_empties_registry() {
        let registry = BlobHandleRegistry::new();
        let h = registry.register(bytes(1));
        registry.register(bytes(2));
        registry.register(bytes(3));

        assert_eq!(registry.live_bytes(), 12);
        assert_eq!(registry.release_all(), 3);
        assert_eq!(registry.live_count(), 0);
        assert_eq!(registry.live_bytes(), 0);

        // release after teardown is still a no-op
        assert!(!registry.release(&h));
        assert_eq!(registry.release_all(), 0);
    }

    #[test]
    fn clones_share_live_set() {
        let registry = BlobHandleRegistry::new();
        let clone = registry.clone();
        let handle = clone.register(bytes(1));

        assert!(registry.contains(&handle));
        registry.release(&handle);
        assert!(!clone.contains(&handle));
    }

    #[test]
    fn injected_generator_is_used() {
        let fixed_time = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let registry = BlobHandleRegistry::with_generator(Arc::new(UlidHandleGenerator::new(
            FixedClock::new(fixed_time),
        )));

        let handle = registry.register(bytes(1));
        let timestamp = (handle.as_ulid().0 >> 80) as u64;
        assert_eq!(timestamp, fixed_time.timestamp_millis() as u64);
    }

    #[tokio::test]
    async fn concurrent_register_and_release() {
        let registry = BlobHandleRegistry::new();

        let mut joins = Vec::new();
        for i in 0..16u8 {
            let registry = registry.clone();
            joins.push(tokio::spawn(async move {
                let handle = registry.register(vec![i; 8]);
                tokio::task::yield_now().await;
                if i % 2 == 0 {
                    registry.release(&handle);
                }
                handle
            }));
        }
        for j in joins {
            j.await.unwrap();
        }

        assert_eq!(registry.live_count(), 8);
    }
}
