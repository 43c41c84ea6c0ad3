//! Configuration management
//!
//! Configuration lives in `config.toml` under `$VBLOB_CONFIG_DIR` or the
//! platform config directory (`~/.config/vblob` on Linux). Every field has a
//! default, so a missing file is not an error. The token and API URL can be
//! overridden from the environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::auth::TOKEN_ENV;
use crate::error::{Error, Result};
use crate::retry::RetryPolicy;

/// Default API endpoint
pub const DEFAULT_API_URL: &str = "https://blob.vercel-storage.com";

/// API version sent as `x-api-version`
pub const API_VERSION: &str = "7";

/// Environment variable overriding the API endpoint
pub const API_URL_ENV: &str = "VERCEL_BLOB_API_URL";

/// Environment variable overriding the config directory
pub const CONFIG_DIR_ENV: &str = "VBLOB_CONFIG_DIR";

/// Service ceiling on parts per multipart upload
pub const MAX_PART_COUNT: u32 = 10_000;

/// Size and concurrency rules for uploads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Payloads larger than this go through multipart
    pub multipart_threshold: u64,
    /// Size of every part except the last
    pub part_size: u64,
    /// Maximum parts in flight
    pub concurrency: usize,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            multipart_threshold: 16 * 1024 * 1024, // 16MB (2x part size)
            part_size: 8 * 1024 * 1024,            // 8MB
            concurrency: 6,
        }
    }
}

impl TransferConfig {
    pub fn validate(&self) -> Result<()> {
        if self.part_size == 0 {
            return Err(Error::Config("transfer.part_size must be greater than 0".into()));
        }
        if self.concurrency == 0 {
            return Err(Error::Config(
                "transfer.concurrency must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Part size used for a payload of `len` bytes; grows past `part_size`
    /// when the payload would otherwise need more than `MAX_PART_COUNT` parts
    pub fn part_size_for(&self, len: u64) -> u64 {
        self.part_size.max(len.div_ceil(u64::from(MAX_PART_COUNT)))
    }

    /// Number of parts a payload of `len` bytes splits into
    pub fn part_count(&self, len: u64) -> u64 {
        len.div_ceil(self.part_size_for(len))
    }
}

/// Client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub api_version: String,
    /// Read/write token; normally supplied through the environment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Per-attempt request timeout in seconds
    pub timeout_secs: u64,
    pub retry: RetryPolicy,
    pub transfer: TransferConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_version: API_VERSION.to_string(),
            token: None,
            timeout_secs: 30,
            retry: RetryPolicy::default(),
            transfer: TransferConfig::default(),
        }
    }
}

impl Config {
    /// Defaults plus environment overrides
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Apply `BLOB_READ_WRITE_TOKEN` and `VERCEL_BLOB_API_URL` when set
    pub fn apply_env(&mut self) {
        if let Ok(token) = std::env::var(TOKEN_ENV)
            && !token.is_empty()
        {
            self.token = Some(token);
        }
        if let Ok(url) = std::env::var(API_URL_ENV)
            && !url.is_empty()
        {
            self.api_url = url;
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn api_url(&self) -> Result<url::Url> {
        url::Url::parse(&self.api_url)
            .map_err(|e| Error::Config(format!("invalid api_url '{}': {e}", self.api_url)))
    }

    pub fn validate(&self) -> Result<()> {
        self.api_url()?;
        self.retry.validate()?;
        self.transfer.validate()
    }
}

/// Loads and saves the configuration file
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    /// Manager for the default location
    pub fn new() -> Result<Self> {
        let dir = match std::env::var_os(CONFIG_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::config_dir()
                .ok_or_else(|| Error::Config("cannot determine config directory".into()))?
                .join("vblob"),
        };
        Ok(Self::with_path(dir.join("config.toml")))
    }

    /// Manager for an explicit file
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the file (defaults when missing), apply the environment, and validate
    pub fn load(&self) -> Result<Config> {
        let mut config = if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            toml::from_str(&content).map_err(|e| {
                Error::Config(format!("failed to parse {}: {e}", self.path.display()))
            })?
        } else {
            tracing::debug!(path = %self.path.display(), "No config file, using defaults");
            Config::default()
        };

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(config)
            .map_err(|e| Error::Config(format!("failed to serialize config: {e}")))?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.api_version, "7");
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.transfer.part_size, 8 * 1024 * 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
timeout_secs = 5

[retry]
max_attempts = 5

[transfer]
concurrency = 2
"#,
        )
        .unwrap();

        let config = ConfigManager::with_path(&path).load().unwrap();
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.base_delay_ms, 500);
        assert_eq!(config.transfer.concurrency, 2);
        assert_eq!(config.transfer.part_size, 8 * 1024 * 1024);
    }

    #[test]
    fn test_missing_file_is_default() {
        let temp_dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp_dir.path().join("nope.toml"));
        let config = manager.load().unwrap();
        assert_eq!(config.transfer, TransferConfig::default());
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp_dir.path().join("nested/config.toml"));

        let mut config = Config::default();
        config.transfer.part_size = 5 * 1024 * 1024;
        manager.save(&config).unwrap();

        let loaded = manager.load().unwrap();
        assert_eq!(loaded.transfer.part_size, 5 * 1024 * 1024);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[transfer]\npart_size = 0\n").unwrap();
        assert!(matches!(
            ConfigManager::with_path(&path).load(),
            Err(Error::Config(_))
        ));

        std::fs::write(&path, "api_url = \"not a url\"\n").unwrap();
        assert!(ConfigManager::with_path(&path).load().is_err());
    }

    #[test]
    fn test_part_count() {
        let transfer = TransferConfig {
            part_size: 5,
            ..Default::default()
        };
        assert_eq!(transfer.part_count(12), 3);
        assert_eq!(transfer.part_count(10), 2);
        assert_eq!(transfer.part_count(0), 0);
    }

    #[test]
    fn test_part_count_stays_under_ceiling() {
        let transfer = TransferConfig::default();
        let five_tib = 5 * 1024_u64.pow(4);
        assert_eq!(transfer.part_count(five_tib), u64::from(MAX_PART_COUNT));
        assert_eq!(transfer.part_size_for(1024), transfer.part_size);
        assert!(transfer.part_size_for(five_tib) > transfer.part_size);
    }
}
