//! Configuration types for palette extraction, storage and export

use crate::error::{PaletteError, Result};
use crate::types::MAX_COLORS;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default color-analysis provider endpoint root
pub const DEFAULT_BASE_URL: &str = "https://api.imagga.com/v2";

/// Environment variable overriding the provider base URL
pub const ENV_BASE_URL: &str = "PALETTEGEN_API_BASE_URL";
/// Environment variable holding the provider API key
pub const ENV_API_KEY: &str = "PALETTEGEN_API_KEY";
/// Environment variable holding the provider API secret
pub const ENV_API_SECRET: &str = "PALETTEGEN_API_SECRET";
/// Environment variable overriding the palette data directory
pub const ENV_DATA_DIR: &str = "PALETTEGEN_DATA_DIR";

/// Configuration for the remote palette extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Provider root URL; requests go to `{base_url}/colors`
    pub base_url: String,

    /// API key half of the Basic credentials
    pub api_key: String,

    /// API secret half of the Basic credentials
    #[serde(skip_serializing, default)]
    pub api_secret: String,

    /// Number of provider colors kept (1-5)
    pub max_colors: usize,

    /// Request timeout (None = HTTP client default)
    pub timeout: Option<Duration>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            api_secret: String::new(),
            max_colors: MAX_COLORS,
            timeout: None,
        }
    }
}

impl ExtractorConfig {
    /// Create a new configuration builder
    ///
    /// ```rust
    /// use palettegen::ExtractorConfig;
    ///
    /// let config = ExtractorConfig::builder()
    ///     .credentials("acc_key", "secret")
    ///     .max_colors(3)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.colors_endpoint(), "https://api.imagga.com/v2/colors");
    /// ```
    #[must_use]
    pub fn builder() -> ExtractorConfigBuilder {
        ExtractorConfigBuilder::default()
    }

    /// Load configuration from `PALETTEGEN_*` environment variables
    ///
    /// Missing variables keep their defaults; the result is not validated so
    /// callers can layer CLI overrides on top before calling [`Self::validate`].
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(base_url) = std::env::var(ENV_BASE_URL) {
            config.base_url = base_url;
        }
        if let Ok(key) = std::env::var(ENV_API_KEY) {
            config.api_key = key;
        }
        if let Ok(secret) = std::env::var(ENV_API_SECRET) {
            config.api_secret = secret;
        }
        config
    }

    /// Full URL of the color-analysis endpoint
    #[must_use]
    pub fn colors_endpoint(&self) -> String {
        format!("{}/colors", self.base_url.trim_end_matches('/'))
    }

    /// Validate all configuration parameters
    ///
    /// # Errors
    /// - Empty or non-HTTP base URL
    /// - Missing API key or secret
    /// - `max_colors` outside 1-5
    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(PaletteError::invalid_config(format!(
                "Unsupported provider URL: '{}'. Expected an http(s) URL",
                self.base_url
            )));
        }

        if self.api_key.trim().is_empty() || self.api_secret.trim().is_empty() {
            return Err(PaletteError::invalid_config(format!(
                "Provider credentials missing. Set {} and {}",
                ENV_API_KEY, ENV_API_SECRET
            )));
        }

        if self.max_colors == 0 || self.max_colors > MAX_COLORS {
            return Err(PaletteError::config_value_error(
                "max colors",
                self.max_colors,
                "1-5",
                Some(MAX_COLORS),
            ));
        }

        Ok(())
    }
}

/// Builder for `ExtractorConfig`
#[derive(Debug, Default)]
pub struct ExtractorConfigBuilder {
    config: ExtractorConfig,
}

impl ExtractorConfigBuilder {
    /// Start from an existing configuration (e.g. [`ExtractorConfig::from_env`])
    #[must_use]
    pub fn from_config(config: ExtractorConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Set the API key/secret pair
    #[must_use]
    pub fn credentials<K: Into<String>, S: Into<String>>(mut self, key: K, secret: S) -> Self {
        self.config.api_key = key.into();
        self.config.api_secret = secret.into();
        self
    }

    /// Set the number of colors kept, capped at 5
    #[must_use]
    pub fn max_colors(mut self, max_colors: usize) -> Self {
        self.config.max_colors = max_colors.min(MAX_COLORS);
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Build and validate the configuration
    ///
    /// # Errors
    /// See [`ExtractorConfig::validate`]
    pub fn build(self) -> Result<ExtractorConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Application-level configuration shared by the CLI and embedders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Remote extractor settings
    pub extractor: ExtractorConfig,
    /// Directory holding the local palette document store
    pub data_dir: PathBuf,
    /// Directory transient export artifacts are written to
    pub export_dir: PathBuf,
}

impl AppConfig {
    /// Resolve configuration from the environment and platform directories
    ///
    /// # Errors
    /// - Platform data directory cannot be determined and no override is set
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            extractor: ExtractorConfig::from_env(),
            data_dir: Self::default_data_dir()?,
            export_dir: Self::default_export_dir(),
        })
    }

    /// Private scratch directory for transient export artifacts
    #[must_use]
    pub fn default_export_dir() -> PathBuf {
        std::env::temp_dir().join("palettegen")
    }

    /// XDG-compliant data directory, overridable through `PALETTEGEN_DATA_DIR`
    ///
    /// # Errors
    /// - Platform data directory cannot be determined
    pub fn default_data_dir() -> Result<PathBuf> {
        if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
            return Ok(PathBuf::from(dir));
        }

        Ok(dirs::data_dir()
            .ok_or_else(|| {
                PaletteError::invalid_config(format!(
                    "Failed to determine data directory. Set {} environment variable.",
                    ENV_DATA_DIR
                ))
            })?
            .join("palettegen"))
    }

    /// Path of the JSON palette store inside the data directory
    #[must_use]
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join("palettes.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExtractorConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.max_colors, 5);
        assert!(config.timeout.is_none());
        assert!(config.validate().is_err(), "credentials are required");
    }

    #[test]
    fn test_builder_validates() {
        let config = ExtractorConfig::builder()
            .base_url("http://localhost:1234/")
            .credentials("key", "secret")
            .build()
            .unwrap();
        assert_eq!(config.colors_endpoint(), "http://localhost:1234/colors");

        let result = ExtractorConfig::builder().base_url("ftp://x").credentials("k", "s").build();
        assert!(result.unwrap_err().to_string().contains("Unsupported provider URL"));
    }

    #[test]
    fn test_max_colors_bounds() {
        let config = ExtractorConfig::builder()
            .credentials("k", "s")
            .max_colors(50)
            .build()
            .unwrap();
        assert_eq!(config.max_colors, 5);

        let mut config = config;
        config.max_colors = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max colors"));
        assert!(err.to_string().contains("1-5"));
    }

    #[test]
    fn test_secret_not_serialized() {
        let config = ExtractorConfig::builder()
            .credentials("visible-key", "hidden-secret")
            .build()
            .unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("visible-key"));
        assert!(!json.contains("hidden-secret"));
    }

    #[test]
    fn test_store_path() {
        let config = AppConfig {
            extractor: ExtractorConfig::default(),
            data_dir: PathBuf::from("/data/palettegen"),
            export_dir: std::env::temp_dir(),
        };
        assert_eq!(config.store_path(), PathBuf::from("/data/palettegen/palettes.json"));
    }
}
