use thiserror::Error;

use crate::app::ConfigError;
use crate::domain::ValidationError;

/// カタログの呼び出し側に返すエラー
///
/// 画像のデコード・エンコード失敗はここに出てこない（pipeline が回復する）。
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("no product at index {0}")]
    NotFound(usize),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}
