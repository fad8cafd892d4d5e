//! AppBuilder - アプリケーションの構築とワイヤリング
//!
//! registry → pipeline → store の順に組み立て、`CatalogApp` を返します。
//! 設定の検証は build() 時に行います（Fail-fast）。

use std::sync::Arc;

use crate::app::config::{CatalogConfig, ConfigError};
use crate::blob::BlobHandleRegistry;
use crate::imaging::ImagePipeline;
use crate::ports::HandleGenerator;
use crate::store::CatalogStore;

/// AppBuilder は CatalogApp を構築
///
/// # 使用例
/// ```ignore
/// let app = AppBuilder::new()
///     .config(CatalogConfig::from_file("catalog.json")?)
///     .build()?;
/// ```
pub struct AppBuilder {
    config: CatalogConfig,
    generator: Option<Arc<dyn HandleGenerator>>,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            config: CatalogConfig::default(),
            generator: None,
        }
    }

    pub fn config(mut self, config: CatalogConfig) -> Self {
        self.config = config;
        self
    }

    /// ハンドル生成器を差し替える（テスト用）
    pub fn handle_generator(mut self, generator: Arc<dyn HandleGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn build(self) -> Result<CatalogApp, ConfigError> {
        self.config.validate()?;

        let registry = match self.generator {
            Some(generator) => BlobHandleRegistry::with_generator(generator),
            None => BlobHandleRegistry::new(),
        };
        let pipeline = Arc::new(ImagePipeline::new(registry.clone(), self.config.image.clone()));
        let mut store = CatalogStore::new(pipeline.clone());
        if self.config.seed_products {
            store = store.with_seed_products();
        }

        tracing::info!(
            max_width = self.config.image.max_width,
            quality = self.config.image.quality,
            products = store.len(),
            "catalog app started"
        );

        Ok(CatalogApp {
            registry,
            pipeline,
            store,
        })
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 起動済みのカタログ
///
/// 終了時は `shutdown()` を呼ぶ。呼ばずに drop しても残りのハンドルは解放される。
pub struct CatalogApp {
    registry: BlobHandleRegistry,
    pipeline: Arc<ImagePipeline>,
    store: CatalogStore,
}

impl CatalogApp {
    pub fn registry(&self) -> &BlobHandleRegistry {
        &self.registry
    }

    pub fn pipeline(&self) -> &Arc<ImagePipeline> {
        &self.pipeline
    }

    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut CatalogStore {
        &mut self.store
    }

    /// 終了処理: レコードをすべて捨て、残っているハンドル（どのレコードも
    /// 持っていないものを含む）を強制的に解放する。解放した数を返す。
    pub fn shutdown(&mut self) -> usize {
        let before = self.registry.live_count();
        self.store.clear();
        self.registry.release_all();
        tracing::info!(released = before, "catalog app shut down");
        before
    }
}

impl Drop for CatalogApp {
    fn drop(&mut self) {
        self.registry.release_all();
    }
}
