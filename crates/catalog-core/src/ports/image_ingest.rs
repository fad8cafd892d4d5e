//! ImageIngest port - ファイルから BlobHandle を得る
//!
//! CatalogStore はこの trait 越しに ImagePipeline を呼びます。
//! テストでは decode を伴わない実装に差し替えられます。

use async_trait::async_trait;

use crate::blob::BlobHandleRegistry;
use crate::domain::{BlobHandle, RawFile};

/// ImageIngest はユーザーが選んだファイルを registry に登録する
///
/// # 契約
/// - `None` を渡したら `None`（画像なし、失敗ではない）
/// - `Some(file)` を渡したら必ず live なハンドルを返す（失敗しない）
#[async_trait]
pub trait ImageIngest: Send + Sync {
    async fn ingest(&self, file: Option<RawFile>) -> Option<BlobHandle>;

    /// ハンドルを発行・解放する registry
    fn registry(&self) -> &BlobHandleRegistry;
}
