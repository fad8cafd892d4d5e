//! Store - 商品レコードの保持（CatalogStore）

pub mod catalog;

pub use self::catalog::CatalogStore;
