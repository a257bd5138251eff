#[cfg(feature = "cli")]
pub mod cli;

use crate::domain::ports::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_SOURCE_URL: &str =
    "https://federaciondecafeteros.org/app/uploads/2025/01/Precios-area-y-produccion-de-cafe-2025.xlsx";
pub const DEFAULT_BUCKET: &str = "fncc-precio-mensual-cop--125kg-cafe-pergamino-seco";
pub const DEFAULT_SHEET_NAME: &str = "2. Precio Interno Mensual";
pub const DEFAULT_SKIP_ROWS: u32 = 5;
pub const DEFAULT_DATE_COLUMN: u32 = 3;
pub const DEFAULT_PRICE_COLUMN: u32 = 4;
pub const DEFAULT_KEY_PREFIX: &str = "precio_interno_mensual/limpio";
pub const DEFAULT_FILE_STEM: &str = "precio_interno_mensual";

const ENV_PREFIX: &str = "CAFE_ETL_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Gcs,
    S3,
    Local,
}

impl std::str::FromStr for StorageBackend {
    type Err = EtlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gcs" => Ok(StorageBackend::Gcs),
            "s3" => Ok(StorageBackend::S3),
            "local" => Ok(StorageBackend::Local),
            other => Err(EtlError::InvalidConfigValue {
                field: "backend".to_string(),
                value: other.to_string(),
                reason: "Expected one of: gcs, s3, local".to_string(),
            }),
        }
    }
}

/// Everything a run needs. Layers: defaults, TOML file, `CAFE_ETL_*` variables, CLI flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub source_url: String,
    pub backend: StorageBackend,
    pub bucket: String,
    pub s3_region: Option<String>,
    pub output_dir: String,
    pub sheet_name: String,
    pub skip_rows: u32,
    pub date_column: u32,
    pub price_column: u32,
    pub key_prefix: String,
    pub file_stem: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            backend: StorageBackend::default(),
            bucket: DEFAULT_BUCKET.to_string(),
            s3_region: None,
            output_dir: "./output".to_string(),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            skip_rows: DEFAULT_SKIP_ROWS,
            date_column: DEFAULT_DATE_COLUMN,
            price_column: DEFAULT_PRICE_COLUMN,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            file_stem: DEFAULT_FILE_STEM.to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| EtlError::config(format!("Invalid TOML: {}", e)))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            EtlError::config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Defaults, then the optional file, then the process environment.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let base = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        base.with_env(|name| std::env::var(name).ok())
    }

    /// Overlays `CAFE_ETL_*` values. `lookup` is injected so tests don't touch the real environment.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        if let Some(v) = var("SOURCE_URL") {
            self.source_url = v;
        }
        if let Some(v) = var("BACKEND") {
            self.backend = v.parse()?;
        }
        if let Some(v) = var("BUCKET") {
            self.bucket = v;
        }
        if let Some(v) = var("S3_REGION") {
            self.s3_region = Some(v);
        }
        if let Some(v) = var("OUTPUT_DIR") {
            self.output_dir = v;
        }
        if let Some(v) = var("SHEET_NAME") {
            self.sheet_name = v;
        }
        if let Some(v) = var("SKIP_ROWS") {
            self.skip_rows = parse_u32("skip_rows", &v)?;
        }
        if let Some(v) = var("DATE_COLUMN") {
            self.date_column = parse_u32("date_column", &v)?;
        }
        if let Some(v) = var("PRICE_COLUMN") {
            self.price_column = parse_u32("price_column", &v)?;
        }
        if let Some(v) = var("KEY_PREFIX") {
            self.key_prefix = v;
        }
        if let Some(v) = var("FILE_STEM") {
            self.file_stem = v;
        }
        Ok(self)
    }
}

fn parse_u32(field: &str, value: &str) -> Result<u32> {
    value
        .trim()
        .parse()
        .map_err(|e: std::num::ParseIntError| EtlError::InvalidConfigValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })
}

impl Validate for PipelineConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("source_url", &self.source_url)?;
        validation::validate_non_empty_string("sheet_name", &self.sheet_name)?;
        validation::validate_key_prefix("key_prefix", &self.key_prefix)?;
        validation::validate_non_empty_string("file_stem", &self.file_stem)?;

        match self.backend {
            StorageBackend::Gcs | StorageBackend::S3 => {
                validation::validate_bucket_name("bucket", &self.bucket)?
            }
            StorageBackend::Local => validation::validate_path("output_dir", &self.output_dir)?,
        }

        if self.date_column == self.price_column {
            return Err(EtlError::InvalidConfigValue {
                field: "price_column".to_string(),
                value: self.price_column.to_string(),
                reason: "Date and price must come from different columns".to_string(),
            });
        }

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }
}

impl ConfigProvider for PipelineConfig {
    fn source_url(&self) -> &str {
        &self.source_url
    }

    fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    fn skip_rows(&self) -> u32 {
        self.skip_rows
    }

    fn date_column(&self) -> u32 {
        self.date_column
    }

    fn price_column(&self) -> u32 {
        self.price_column
    }

    fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    fn file_stem(&self) -> &str {
        &self.file_stem
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_match_published_layout() {
        let config = PipelineConfig::default();
        assert_eq!(config.sheet_name, "2. Precio Interno Mensual");
        assert_eq!(config.skip_rows, 5);
        assert_eq!((config.date_column, config.price_column), (3, 4));
        assert_eq!(config.key_prefix, "precio_interno_mensual/limpio");
        assert_eq!(config.backend, StorageBackend::Gcs);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = PipelineConfig::from_toml_str(
            r#"
backend = "local"
output_dir = "/tmp/cafe"
skip_rows = 6
"#,
        )
        .unwrap();

        assert_eq!(config.backend, StorageBackend::Local);
        assert_eq!(config.output_dir, "/tmp/cafe");
        assert_eq!(config.skip_rows, 6);
        assert_eq!(config.sheet_name, DEFAULT_SHEET_NAME);
    }

    #[test]
    fn test_unknown_toml_key_is_rejected() {
        let err = PipelineConfig::from_toml_str("sheet = \"x\"").unwrap_err();
        assert!(matches!(err, EtlError::Config { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("CAFE_ETL_BUCKET", "other-bucket"),
            ("CAFE_ETL_BACKEND", "S3"),
            ("CAFE_ETL_PRICE_COLUMN", "7"),
            ("CAFE_ETL_FILE_STEM", "precio_mensual"),
        ]);
        let config = PipelineConfig::default()
            .with_env(|name| env.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.bucket, "other-bucket");
        assert_eq!(config.backend, StorageBackend::S3);
        assert_eq!(config.price_column, 7);
        assert_eq!(config.file_stem, "precio_mensual");
        assert_eq!(config.date_column, DEFAULT_DATE_COLUMN);
    }

    #[test]
    fn test_env_rejects_bad_numbers() {
        let err = PipelineConfig::default()
            .with_env(|name| (name == "CAFE_ETL_SKIP_ROWS").then(|| "five".to_string()))
            .unwrap_err();
        assert!(matches!(err, EtlError::InvalidConfigValue { ref field, .. } if field == "skip_rows"));
    }

    #[test]
    fn test_validate_rejects_same_columns() {
        let config = PipelineConfig {
            price_column: 3,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_local_backend_skips_bucket_rules() {
        let config = PipelineConfig {
            backend: StorageBackend::Local,
            bucket: String::new(),
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
