//! App - アプリケーション層
//!
//! # 主要コンポーネント
//! - **CatalogConfig**: 設定の読み込みと検証
//! - **AppBuilder**: registry / pipeline / store の構築とワイヤリング
//! - **CatalogApp**: 起動済みアプリ（終了時に全ハンドルを解放）

pub mod builder;
pub mod config;

pub use self::builder::{AppBuilder, CatalogApp};
pub use self::config::{CatalogConfig, ConfigError};
