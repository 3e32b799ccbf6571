//! Tool configuration.
//!
//! Handles loading, validating, and merging `thumbgen.toml`. User values are
//! layered on top of stock defaults, so a config file only needs the keys it
//! wants to change. Command-line flags override the merged result.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [output]
//! format = "jpeg"          # jpeg | png | webp
//! quality = 100            # 1-100; 100 skips the lossy round-trip
//! directory = "."          # Where downloaded images are written
//!
//! [storage]
//! bucket = ""              # S3 bucket for uploads
//! region = "us-east-1"
//! key_prefix = ""          # Object key prefix ("photos" → photos/<name>)
//! # access_key = "..."     # Omit both keys to use the AWS default chain
//! # secret_key = "..."
//! # endpoint = "http://localhost:9000"   # S3-compatible endpoint (MinIO, ...)
//! presign_expiration_secs = 3600
//!
//! [fetch]
//! timeout_secs = 30        # Whole-request timeout for image URLs
//! max_bytes = 52428800     # Refuse sources larger than this (50 MiB)
//! user_agent = "thumbgen/<version>"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::OutputFormat;
use crate::storage::DEFAULT_PRESIGN_EXPIRATION;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Longest expiration S3 accepts for a presigned request (7 days).
pub const MAX_PRESIGN_EXPIRATION_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Tool configuration loaded from `thumbgen.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Encoding defaults and download destination.
    pub output: OutputConfig,
    /// S3 bucket, credentials and presign settings.
    pub storage: StorageConfig,
    /// Limits for reading image sources.
    pub fetch: FetchConfig,
}

impl Config {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.output.quality) {
            return Err(ConfigError::Validation(
                "output.quality must be 1-100".into(),
            ));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "fetch.timeout_secs must be greater than zero".into(),
            ));
        }
        if self.fetch.max_bytes == 0 {
            return Err(ConfigError::Validation(
                "fetch.max_bytes must be greater than zero".into(),
            ));
        }
        if !(1..=MAX_PRESIGN_EXPIRATION_SECS).contains(&self.storage.presign_expiration_secs) {
            return Err(ConfigError::Validation(format!(
                "storage.presign_expiration_secs must be 1-{MAX_PRESIGN_EXPIRATION_SECS}"
            )));
        }
        if self.storage.access_key.is_some() != self.storage.secret_key.is_some() {
            return Err(ConfigError::Validation(
                "storage.access_key and storage.secret_key must be set together".into(),
            ));
        }
        Ok(())
    }
}

/// Encoding defaults and download destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Encoded output format.
    pub format: OutputFormat,
    /// Encoding quality (1 = worst, 100 = no lossy round-trip).
    pub quality: u32,
    /// Directory downloaded images are written to.
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Jpeg,
            quality: 100,
            directory: PathBuf::from("."),
        }
    }
}

/// S3 settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Bucket that receives uploads.
    pub bucket: String,
    /// AWS region of the bucket.
    pub region: String,
    /// Object key prefix; objects land at `{key_prefix}/{name}`.
    pub key_prefix: String,
    /// Access key id. Both keys absent → AWS default credential chain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
    /// Secret access key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    /// Custom endpoint for S3-compatible storage. Enables path-style addressing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Default lifetime of presigned URLs, in seconds.
    pub presign_expiration_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            region: "us-east-1".to_string(),
            key_prefix: String::new(),
            access_key: None,
            secret_key: None,
            endpoint: None,
            presign_expiration_secs: DEFAULT_PRESIGN_EXPIRATION.as_secs(),
        }
    }
}

/// Limits for reading image sources from disk or the network.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    /// Whole-request timeout for URL downloads, in seconds.
    pub timeout_secs: u64,
    /// Largest accepted source, in bytes.
    pub max_bytes: u64,
    /// User-Agent header sent with URL downloads.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_bytes: 50 * 1024 * 1024,
            user_agent: concat!("thumbgen/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// The base layer that user overrides are merged onto.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(Config::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<Config, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to stock defaults when it is absent.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let overlay = load_raw_config(path)?;
    if overlay.is_some() {
        log::debug!("loaded config from {}", path.display());
    }
    resolve_config(stock_defaults_value(), overlay)
}

/// Returns a fully-commented stock `thumbgen.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    concat!(
        r##"# thumbgen configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.
# Command-line flags override anything set here.

# ---------------------------------------------------------------------------
# Output encoding
# ---------------------------------------------------------------------------
[output]
# Encoded format: "jpeg", "png" or "webp". Quality only affects JPEG.
format = "jpeg"

# Quality 1-100. Below 100 the image is re-encoded at this quality once
# before resizing, and output names get a "{quality}-cmp" prefix.
quality = 100

# Directory that downloaded images are written to.
directory = "."

# ---------------------------------------------------------------------------
# S3 uploads
# ---------------------------------------------------------------------------
[storage]
# Bucket receiving uploads. Objects are public-read.
bucket = ""
region = "us-east-1"

# Objects are stored at "{key_prefix}/{name}".
key_prefix = ""

# Static credentials. Leave both unset to use the AWS default chain
# (environment, shared profile, instance role).
# access_key = "AKIA..."
# secret_key = "..."

# S3-compatible endpoint (MinIO, LocalStack). Switches to path-style URLs.
# endpoint = "http://localhost:9000"

# Lifetime of presigned URLs in seconds (max 604800 = 7 days).
presign_expiration_secs = 3600

# ---------------------------------------------------------------------------
# Source fetching
# ---------------------------------------------------------------------------
[fetch]
# Timeout for downloading an image URL, in seconds.
timeout_secs = 30

# Largest accepted source image in bytes (50 MiB).
max_bytes = 52428800

# User-Agent header for URL downloads.
user_agent = "thumbgen/"##,
        env!("CARGO_PKG_VERSION"),
        "\"\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("thumbgen.toml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn default_config_values() {
        let config = Config::default();
        assert_eq!(config.output.format, OutputFormat::Jpeg);
        assert_eq!(config.output.quality, 100);
        assert_eq!(config.storage.region, "us-east-1");
        assert_eq!(config.storage.presign_expiration_secs, 3600);
        assert_eq!(
            config.storage.presign_expiration_secs,
            DEFAULT_PRESIGN_EXPIRATION.as_secs()
        );
        assert_eq!(config.fetch.timeout_secs, 30);
        assert!(config.fetch.user_agent.starts_with("thumbgen/"));
    }

    #[test]
    fn validate_default_config_passes() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn parse_partial_config() {
        let config: Config = toml::from_str(
            r#"
            [output]
            quality = 60
            format = "webp"
            "#,
        )
        .unwrap();
        assert_eq!(config.output.quality, 60);
        assert_eq!(config.output.format, OutputFormat::WebP);
        // Untouched sections keep defaults
        assert_eq!(config.fetch.timeout_secs, 30);
    }

    #[test]
    fn parse_jpg_alias() {
        let config: Config = toml::from_str("[output]\nformat = \"jpg\"").unwrap();
        assert_eq!(config.output.format, OutputFormat::Jpeg);
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("missing.toml")).unwrap();
        assert_eq!(config.output.quality, 100);
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(
            &tmp,
            r#"
            [storage]
            bucket = "mybucket"
            key_prefix = "photos"
            access_key = "ak"
            secret_key = "sk"
            "#,
        );
        let config = load_config(&path).unwrap();
        assert_eq!(config.storage.bucket, "mybucket");
        assert_eq!(config.storage.key_prefix, "photos");
        assert_eq!(config.storage.access_key.as_deref(), Some("ak"));
        assert_eq!(config.storage.region, "us-east-1");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(&tmp, "this is not [valid toml");
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected() {
        let result: Result<Config, _> = toml::from_str("[output]\nqualty = 50");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<Config, _> = toml::from_str("[thumbnails]\nsize = 3");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_format_rejected() {
        let result: Result<Config, _> = toml::from_str("[output]\nformat = \"gif\"");
        assert!(result.is_err());
    }

    #[test]
    fn validate_quality_zero() {
        let mut config = Config::default();
        config.output.quality = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_quality_too_high() {
        let mut config = Config::default();
        config.output.quality = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_zero_timeout() {
        let mut config = Config::default();
        config.fetch.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_presign_expiration_over_a_week() {
        let mut config = Config::default();
        config.storage.presign_expiration_secs = MAX_PRESIGN_EXPIRATION_SECS + 1;
        assert!(config.validate().is_err());
        config.storage.presign_expiration_secs = MAX_PRESIGN_EXPIRATION_SECS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_half_credentials() {
        let mut config = Config::default();
        config.storage.access_key = Some("ak".into());
        assert!(config.validate().is_err());
        config.storage.secret_key = Some("sk".into());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(&tmp, "[output]\nquality = 500");
        assert!(matches!(
            load_config(&path),
            Err(ConfigError::Validation(_))
        ));
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str("a = 1\nb = 2").unwrap();
        let overlay: toml::Value = toml::from_str("b = 3").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"].as_integer(), Some(1));
        assert_eq!(merged["b"].as_integer(), Some(3));
    }

    #[test]
    fn merge_toml_table_merge() {
        let base = stock_defaults_value();
        let overlay: toml::Value = toml::from_str("[storage]\nbucket = \"b\"").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["storage"]["bucket"].as_str(), Some("b"));
        assert_eq!(merged["storage"]["region"].as_str(), Some("us-east-1"));
        assert_eq!(merged["output"]["quality"].as_integer(), Some(100));
    }

    #[test]
    fn stock_defaults_value_omits_unset_credentials() {
        let value = stock_defaults_value();
        assert!(value["storage"].get("access_key").is_none());
        assert!(value["storage"].get("endpoint").is_none());
    }

    // =========================================================================
    // stock_config_toml tests
    // =========================================================================

    #[test]
    fn stock_config_toml_is_valid_config() {
        let config: Config = toml::from_str(stock_config_toml()).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn stock_config_toml_matches_defaults() {
        let config: Config = toml::from_str(stock_config_toml()).unwrap();
        let defaults = Config::default();
        assert_eq!(config.output.format, defaults.output.format);
        assert_eq!(config.output.quality, defaults.output.quality);
        assert_eq!(config.output.directory, defaults.output.directory);
        assert_eq!(config.storage.region, defaults.storage.region);
        assert_eq!(
            config.storage.presign_expiration_secs,
            defaults.storage.presign_expiration_secs
        );
        assert_eq!(config.fetch.max_bytes, defaults.fetch.max_bytes);
        assert_eq!(config.fetch.user_agent, defaults.fetch.user_agent);
        assert_eq!(config.fetch.timeout_secs, defaults.fetch.timeout_secs);
    }

    #[test]
    fn stock_config_toml_resolves_to_defaults() {
        let overlay: toml::Value = toml::from_str(stock_config_toml()).unwrap();
        let from_stock = resolve_config(stock_defaults_value(), Some(overlay)).unwrap();
        assert_eq!(
            toml::Value::try_from(&from_stock).unwrap(),
            stock_defaults_value()
        );
    }
}
