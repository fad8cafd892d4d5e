//! catalog-core
//!
//! Core building blocks for the catalog editor.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（BlobHandle, ProductRecord, ProductForm, errors）
//! - **ports**: 抽象化レイヤー（Clock, HandleGenerator, ImageIngest）
//! - **blob**: BlobHandleRegistry（ハンドルの発行・解放）
//! - **imaging**: ImageDownscaler, ImagePipeline
//! - **store**: CatalogStore（商品一覧）
//! - **view**: HTML レンダリング
//! - **app**: 設定、AppBuilder、CatalogApp

pub mod app;
pub mod blob;
pub mod domain;
pub mod error;
pub mod imaging;
pub mod ports;
pub mod store;
pub mod view;

pub use app::{AppBuilder, CatalogApp, CatalogConfig};
pub use blob::BlobHandleRegistry;
pub use error::CatalogError;
pub use imaging::{ImageDownscaler, ImagePipeline, PipelineConfig};
pub use store::CatalogStore;
