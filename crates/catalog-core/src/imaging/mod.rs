//! Imaging - 画像取り込みパイプライン
//!
//! - **ImageDownscaler**: decode → resize → encode（同期、CPU-bound）
//! - **ImagePipeline**: downscaler を blocking worker で動かし、結果を registry に登録

pub mod downscaler;
pub mod pipeline;

pub use self::downscaler::{Downscaled, ImageDownscaler, downscale_image, target_dimensions};
pub use self::pipeline::{DEFAULT_MAX_WIDTH, DEFAULT_QUALITY, ImagePipeline, PipelineConfig};
