//! Domain - ドメインモデル（ハンドル、商品レコード、フォーム、エラー）

pub mod errors;
pub mod file;
pub mod ids;
pub mod product;

pub use self::errors::{DownscaleError, ValidationError};
pub use self::file::{ImageBytes, RawFile};
pub use self::ids::BlobHandle;
pub use self::product::{ProductFields, ProductForm, ProductImage, ProductRecord, ProductSummary};
