//! Errors - ドメインエラー
//!
//! # 分類
//! - ValidationError: form の入力値が不正（呼び出し側に返す）
//! - DownscaleError: 画像の decode / encode 失敗（pipeline 内で回復する）

/// ValidationError は form の各フィールドの検証エラー
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("product name must not be empty")]
    EmptyName,

    #[error("price '{0}' is not a number")]
    InvalidPrice(String),

    #[error("price must not be negative (got {0})")]
    NegativePrice(f64),
}

/// DownscaleError は ImageDownscaler の失敗
///
/// どちらも ImagePipeline の fallback で回復され、UI には返らない。
#[derive(Debug, thiserror::Error)]
pub enum DownscaleError {
    #[error("image decode failed: {0}")]
    Decode(String),

    #[error("image encode failed: {0}")]
    Encode(String),
}
