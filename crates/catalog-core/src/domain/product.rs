//! ProductRecord / ProductForm - 商品とその入力フォーム
//!
//! フォームは閉じたスキーマで、下のフィールドだけを読み、それぞれ個別に検証する。

use serde::Serialize;

use super::errors::ValidationError;
use super::file::RawFile;
use super::ids::BlobHandle;

/// 商品に付く画像
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProductImage {
    /// 画像なし（view はプレースホルダーを描画）
    #[default]
    None,

    /// 同梱アセットのパス（シードデータ）。登録も解放もしない
    Static(String),

    /// BlobHandleRegistry に登録済みのハンドル
    Blob(BlobHandle),
}

impl ProductImage {
    pub fn from_handle(handle: Option<BlobHandle>) -> Self {
        match handle {
            Some(handle) => ProductImage::Blob(handle),
            None => ProductImage::None,
        }
    }

    pub fn blob_handle(&self) -> Option<&BlobHandle> {
        match self {
            ProductImage::Blob(handle) => Some(handle),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, ProductImage::None)
    }
}

/// カタログ内の商品
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    pub name: String,
    pub category: String,
    pub price: f64,
    pub description: String,
    pub image: ProductImage,
}

impl ProductRecord {
    pub fn new(fields: ProductFields, image: ProductImage) -> Self {
        Self {
            name: fields.name,
            category: fields.category,
            price: fields.price,
            description: fields.description,
            image,
        }
    }

    /// テキスト項目をすべて送信値で置き換える。画像は store が別に扱う。
    pub fn apply(&mut self, fields: ProductFields) {
        self.name = fields.name;
        self.category = fields.category;
        self.price = fields.price;
        self.description = fields.description;
    }

    /// 画像を src 文字列に解決済みのシリアライズ用ビュー
    pub fn summary(&self, image_src: impl Into<String>) -> ProductSummary {
        ProductSummary {
            name: self.name.clone(),
            category: self.category.clone(),
            price: self.price,
            description: self.description.clone(),
            image: image_src.into(),
        }
    }
}

/// レコードの JSON 用スナップショット
///
/// ハンドルはシリアライズできないので、画像は描画用の src 文字列で持つ。
#[derive(Debug, Clone, Serialize)]
pub struct ProductSummary {
    pub name: String,
    pub category: String,
    pub price: f64,
    pub description: String,
    pub image: String,
}

/// 検証済みのテキスト項目
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFields {
    pub name: String,
    pub category: String,
    pub price: f64,
    pub description: String,
}

/// 未検証のフォーム送信内容
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub name: String,
    pub category: String,
    pub price: String,
    pub description: String,
    pub image: Option<RawFile>,
}

impl ProductForm {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        price: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            price: price.into(),
            description: description.into(),
            image: None,
        }
    }

    pub fn with_image(mut self, file: RawFile) -> Self {
        self.image = Some(file);
        self
    }

    /// テキスト項目を検証し、ファイルを切り離す
    pub fn into_parts(self) -> Result<(ProductFields, Option<RawFile>), ValidationError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let price = parse_price(&self.price)?;
        let fields = ProductFields {
            name,
            category: self.category.trim().to_string(),
            price,
            description: self.description.trim().to_string(),
        };
        Ok((fields, self.image))
    }
}

/// 空文字は 0 とみなす
fn parse_price(raw: &str) -> Result<f64, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0.0);
    }
    let price: f64 = raw
        .parse()
        .map_err(|_| ValidationError::InvalidPrice(raw.to_string()))?;
    if !price.is_finite() {
        return Err(ValidationError::InvalidPrice(raw.to_string()));
    }
    if price < 0.0 {
        return Err(ValidationError::NegativePrice(price));
    }
    Ok(price)
}
