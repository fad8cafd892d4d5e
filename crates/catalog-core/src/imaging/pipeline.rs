//! ImagePipeline - file → downscale → registry
//!
//! # 処理の流れ
//! 1. file が無ければ即 `None`（画像なし、失敗ではない）
//! 2. 一時的な decode source を開き、blocking worker で downscale
//! 3. 成功したら縮小後の bytes を registry に登録
//! 4. 失敗したら元の bytes をそのまま登録（ログだけ残す）
//! 5. decode source はどの経路でも必ず閉じる
//!
//! # キャンセル
//! サポートしない。呼び出し側が future を drop しても blocking worker は
//! 最後まで走り、decode source もそこで閉じる。

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde::Deserialize;

use crate::blob::BlobHandleRegistry;
use crate::domain::{BlobHandle, ImageBytes, RawFile};
use crate::imaging::downscaler::{DEFAULT_MAX_DECODE_DIMENSION, ImageDownscaler};
use crate::ports::ImageIngest;

pub const DEFAULT_MAX_WIDTH: u32 = 50;
pub const DEFAULT_QUALITY: f32 = 0.8;

/// 画像処理の設定
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// サムネイル幅の上限（px）
    pub max_width: u32,

    /// 再エンコード品質、[0, 1] の割合
    pub quality: f32,

    /// これを超える幅・高さの元画像は Decode エラー
    pub max_decode_dimension: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
            quality: DEFAULT_QUALITY,
            max_decode_dimension: DEFAULT_MAX_DECODE_DIMENSION,
        }
    }
}

/// デコード中の bytes への一時参照
///
/// 開いている間はカウントされる。閉じるのは `Drop` なので、成功・失敗・
/// worker の panic のどれでも必ず解放される。
struct DecodeSource {
    bytes: ImageBytes,
    open: Arc<AtomicUsize>,
}

impl DecodeSource {
    fn open(bytes: ImageBytes, open: &Arc<AtomicUsize>) -> Self {
        open.fetch_add(1, Ordering::SeqCst);
        Self {
            bytes,
            open: Arc::clone(open),
        }
    }

    fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Drop for DecodeSource {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
        tracing::trace!(len = self.bytes.len(), "decode source closed");
    }
}

pub struct ImagePipeline {
    registry: BlobHandleRegistry,
    downscaler: ImageDownscaler,
    config: PipelineConfig,
    open_sources: Arc<AtomicUsize>,
}

impl ImagePipeline {
    pub fn new(registry: BlobHandleRegistry, config: PipelineConfig) -> Self {
        Self {
            registry,
            downscaler: ImageDownscaler::new(config.max_decode_dimension),
            config,
            open_sources: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn registry(&self) -> &BlobHandleRegistry {
        &self.registry
    }

    /// 現在開いている decode source の数（アイドル時は 0）
    pub fn open_decode_sources(&self) -> usize {
        self.open_sources.load(Ordering::SeqCst)
    }

    /// 設定の `max_width` / `quality` で処理
    pub async fn process(&self, file: Option<RawFile>) -> Option<BlobHandle> {
        self.process_with(file, self.config.max_width, self.config.quality)
            .await
    }

    /// 選択されたファイルを有効なハンドルに変換
    ///
    /// ファイルがあれば失敗しない。縮小に失敗したら元の bytes を登録する。
    pub async fn process_with(
        &self,
        file: Option<RawFile>,
        max_width: u32,
        quality: f32,
    ) -> Option<BlobHandle> {
        let RawFile { name, bytes } = file?;

        let original = Arc::clone(&bytes);
        let source = DecodeSource::open(bytes, &self.open_sources);
        let downscaler = self.downscaler.clone();

        let result = tokio::task::spawn_blocking(move || {
            let result = downscaler.downscale(source.bytes(), max_width, quality);
            drop(source);
            result
        })
        .await;

        let handle = match result {
            Ok(Ok(out)) => {
                tracing::debug!(
                    file = %name,
                    original_len = original.len(),
                    len = out.bytes.len(),
                    width = out.width,
                    height = out.height,
                    "image downscaled"
                );
                self.registry.register(out.bytes)
            }
            Ok(Err(err)) => {
                tracing::warn!(file = %name, error = %err, "downscale failed; keeping original bytes");
                self.registry.register(original)
            }
            Err(join_err) => {
                tracing::warn!(file = %name, error = %join_err, "downscale worker failed; keeping original bytes");
                self.registry.register(original)
            }
        };
        Some(handle)
    }
}

#[async_trait]
impl ImageIngest for ImagePipeline {
    async fn ingest(&self, file: Option<RawFile>) -> Option<BlobHandle> {
        self.process(file).await
    }

    fn registry(&self) -> &BlobHandleRegistry {
        &self.registry
    }
}
