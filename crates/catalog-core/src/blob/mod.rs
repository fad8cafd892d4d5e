//! Blob - 一時的なバイナリ参照（BlobHandle）の管理
//!
//! BlobHandleRegistry だけがハンドルを発行・解放できます。

pub mod registry;

pub use self::registry::BlobHandleRegistry;
