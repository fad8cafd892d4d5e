//! CatalogConfig - 起動時の設定
//!
//! JSON で書き、省略したフィールドはデフォルト値になります。
//!
//! ```json
//! { "image": { "max_width": 50, "quality": 0.8 }, "seed_products": true }
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::imaging::PipelineConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config json: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub image: PipelineConfig,

    /// デモ商品を入れた状態で起動
    pub seed_products: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            image: PipelineConfig::default(),
            seed_products: true,
        }
    }
}

impl CatalogConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let image = &self.image;
        if image.max_width == 0 {
            return Err(ConfigError::Invalid("image.max_width must be positive".into()));
        }
        if !(0.0..=1.0).contains(&image.quality) {
            return Err(ConfigError::Invalid(format!(
                "image.quality must be within [0, 1] (got {})",
                image.quality
            )));
        }
        if image.max_decode_dimension == 0 {
            return Err(ConfigError::Invalid(
                "image.max_decode_dimension must be positive".into(),
            ));
        }
        Ok(())
    }
}
