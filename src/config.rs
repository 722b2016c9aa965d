//! Remote configuration module
//!
//! Provides configuration for the hosted backend: endpoint URL, API key,
//! request timeout, and the table used by the connectivity probe.
//!
//! Configuration is resolved once at startup. A missing endpoint or key
//! surfaces as a [`ConfigError`] from the constructor; there is no lazy
//! re-validation later (correcting configuration requires re-init).

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming the backend base URL
pub const ENV_API_URL: &str = "FITTRACK_API_URL";
/// Environment variable naming the backend anon/service API key
pub const ENV_API_KEY: &str = "FITTRACK_API_KEY";

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PROBE_TABLE: &str = "profiles";

/// Remote backend configuration
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Base URL of the hosted backend, e.g. `https://xyz.supabase.co`
    pub base_url: String,
    /// API key sent as the `apikey` header and default bearer token
    pub api_key: String,
    /// Per-request timeout applied to the HTTP client
    pub request_timeout: Duration,
    /// Table used for the lightweight connectivity probe
    pub probe_table: String,
}

impl RemoteConfig {
    /// Create a new RemoteConfigBuilder
    pub fn builder() -> RemoteConfigBuilder {
        RemoteConfigBuilder::default()
    }

    /// Resolve configuration from the environment.
    ///
    /// Reads `FITTRACK_API_URL` and `FITTRACK_API_KEY`. Fails with
    /// [`ConfigError::MissingValue`] when either is absent or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var(ENV_API_URL).unwrap_or_default();
        let api_key = std::env::var(ENV_API_KEY).unwrap_or_default();
        Self::builder().base_url(base_url).api_key(api_key).build()
    }

    /// Load configuration from a TOML file in the user config directory
    /// (`fittrack/fittrack.toml`), falling back to the environment when the
    /// file is absent.
    pub fn load() -> Result<Self, ConfigError> {
        let path = dirs::config_dir().map(|dir| dir.join("fittrack").join("fittrack.toml"));
        if let Some(path) = path {
            if path.exists() {
                let raw = std::fs::read_to_string(&path)
                    .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
                let file: ConfigFile = toml::from_str(&raw)
                    .map_err(|e| ConfigError::Parse(format!("{}: {}", path.display(), e)))?;
                let mut builder = Self::builder()
                    .base_url(file.base_url.unwrap_or_default())
                    .api_key(file.api_key.unwrap_or_default());
                if let Some(secs) = file.request_timeout_secs {
                    builder = builder.request_timeout(Duration::from_secs(secs));
                }
                if let Some(table) = file.probe_table {
                    builder = builder.probe_table(table);
                }
                return builder.build();
            }
        }
        Self::from_env()
    }

    /// Full URL for a REST table endpoint
    pub fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url.trim_end_matches('/'), table)
    }

    /// Full URL for an auth endpoint
    pub fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// On-disk configuration file shape
#[derive(Debug, Deserialize)]
struct ConfigFile {
    base_url: Option<String>,
    api_key: Option<String>,
    request_timeout_secs: Option<u64>,
    probe_table: Option<String>,
}

/// Builder for RemoteConfig
#[derive(Debug, Default)]
pub struct RemoteConfigBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    request_timeout: Option<Duration>,
    probe_table: Option<String>,
}

impl RemoteConfigBuilder {
    /// Set the backend base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the API key
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the per-request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set the table used by the connectivity probe
    pub fn probe_table(mut self, table: impl Into<String>) -> Self {
        self.probe_table = Some(table.into());
        self
    }

    /// Build the configuration, validating required fields
    pub fn build(self) -> Result<RemoteConfig, ConfigError> {
        let base_url = self
            .base_url
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::MissingValue(ENV_API_URL))?;
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::InvalidUrl(base_url));
        }
        let api_key = self
            .api_key
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingValue(ENV_API_KEY))?;
        Ok(RemoteConfig {
            base_url,
            api_key,
            request_timeout: self
                .request_timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            probe_table: self
                .probe_table
                .unwrap_or_else(|| DEFAULT_PROBE_TABLE.to_string()),
        })
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("config file error: {0}")]
    Io(String),
    #[error("config parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> RemoteConfig {
        RemoteConfig::builder()
            .base_url("https://demo.supabase.co")
            .api_key("anon-key")
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_defaults() {
        let config = test_config();
        assert_eq!(config.base_url, "https://demo.supabase.co");
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.probe_table, "profiles");
    }

    #[test]
    fn test_missing_url_rejected() {
        let result = RemoteConfig::builder().api_key("anon-key").build();
        assert!(matches!(result, Err(ConfigError::MissingValue(ENV_API_URL))));
    }

    #[test]
    fn test_missing_key_rejected() {
        let result = RemoteConfig::builder()
            .base_url("https://demo.supabase.co")
            .build();
        assert!(matches!(result, Err(ConfigError::MissingValue(ENV_API_KEY))));
    }

    #[test]
    fn test_invalid_url_rejected() {
        let result = RemoteConfig::builder()
            .base_url("demo.supabase.co")
            .api_key("anon-key")
            .build();
        assert!(matches!(result, Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_rest_url() {
        let config = test_config();
        assert_eq!(
            config.rest_url("meals"),
            "https://demo.supabase.co/rest/v1/meals"
        );
    }

    #[test]
    fn test_auth_url_trims_trailing_slash() {
        let config = RemoteConfig::builder()
            .base_url("https://demo.supabase.co/")
            .api_key("anon-key")
            .build()
            .unwrap();
        assert_eq!(
            config.auth_url("user"),
            "https://demo.supabase.co/auth/v1/user"
        );
    }
}
