//! CatalogStore - 商品一覧のインメモリ保持

use std::sync::Arc;

use crate::blob::BlobHandleRegistry;
use crate::domain::{ProductForm, ProductImage, ProductRecord, ValidationError};
use crate::ports::ImageIngest;

/// 順序付き、インデックスで指定する商品一覧
///
/// 画像は `ImageIngest` を通して取り込む。store が手放すハンドル（新しい
/// ファイルでの edit、delete、clear）は先に registry で解放する。
pub struct CatalogStore {
    records: Vec<ProductRecord>,
    ingest: Arc<dyn ImageIngest>,
}

impl CatalogStore {
    pub fn new(ingest: Arc<dyn ImageIngest>) -> Self {
        Self {
            records: Vec::new(),
            ingest,
        }
    }

    /// 同梱アセット画像を持つデモ商品
    pub fn with_seed_products(mut self) -> Self {
        self.records.extend(seed_products());
        self
    }

    pub fn registry(&self) -> &BlobHandleRegistry {
        self.ingest.registry()
    }

    pub fn get(&self, index: usize) -> Option<&ProductRecord> {
        self.records.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProductRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[ProductRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// フォームを検証し、画像を取り込んで末尾に追加
    /// 追加したレコードのインデックスを返す。
    pub async fn add(&mut self, form: ProductForm) -> Result<usize, ValidationError> {
        let (fields, file) = form.into_parts()?;
        let handle = self.ingest.ingest(file).await;
        self.records
            .push(ProductRecord::new(fields, ProductImage::from_handle(handle)));
        let index = self.records.len() - 1;
        tracing::debug!(index, "product added");
        Ok(index)
    }

    /// `index` のレコードのテキスト項目を置き換える
    ///
    /// 新しいファイルがあれば、取り込む前に古い画像を解放する。無ければ画像は
    /// そのまま。範囲外のインデックスは何もしない（`Ok(None)`）。
    pub async fn edit(
        &mut self,
        index: usize,
        form: ProductForm,
    ) -> Result<Option<&ProductRecord>, ValidationError> {
        if index >= self.records.len() {
            tracing::debug!(index, len = self.records.len(), "edit ignored: index out of range");
            return Ok(None);
        }
        let (fields, file) = form.into_parts()?;

        if file.is_some() {
            // the record must not hold the handle once it is released
            let old = std::mem::take(&mut self.records[index].image);
            self.ingest.registry().release_image(&old);
            let handle = self.ingest.ingest(file).await;
            self.records[index].image = ProductImage::from_handle(handle);
        }

        let record = &mut self.records[index];
        record.apply(fields);
        tracing::debug!(index, "product edited");
        Ok(Some(&*record))
    }

    /// レコードの画像を解放して削除する。返すレコードは解放済みハンドルを
    /// もう参照しない。
    pub fn delete(&mut self, index: usize) -> Option<ProductRecord> {
        if index >= self.records.len() {
            tracing::debug!(index, len = self.records.len(), "delete ignored: index out of range");
            return None;
        }
        self.ingest.registry().release_image(&self.records[index].image);
        let mut record = self.records.remove(index);
        record.image = ProductImage::None;
        tracing::debug!(index, "product deleted");
        Some(record)
    }

    /// すべての画像を解放し、レコードを空にする
    pub fn clear(&mut self) {
        let registry = self.ingest.registry();
        for record in &self.records {
            registry.release_image(&record.image);
        }
        self.records.clear();
    }
}

fn seed_products() -> Vec<ProductRecord> {
    let seed = [
        (
            "Wireless Earbuds",
            "Electronics",
            108.0,
            "Compact wireless earbuds delivering crisp audio and seamless Bluetooth connectivity.",
            "./assets/product-1.svg",
        ),
        (
            "Yoga Mat",
            "Fitness",
            30.0,
            "A durable, non-slip yoga mat designed for stability and comfort.",
            "./assets/product-2.svg",
        ),
        (
            "Leather Backpack",
            "Accessories",
            64.0,
            "A stylish genuine-leather backpack crafted for everyday use.",
            "./assets/product-3.svg",
        ),
    ];
    seed.into_iter()
        .map(|(name, category, price, description, image)| ProductRecord {
            name: name.to_string(),
            category: category.to_string(),
            price,
            description: description.to_string(),
            image: ProductImage::Static(image.to_string()),
        })
        .collect()
}
