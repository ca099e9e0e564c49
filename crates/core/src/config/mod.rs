//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (GEOCACHE_*)
//! 2. TOML config file (if GEOCACHE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Default Google Geocoding API endpoint.
pub const DEFAULT_PROVIDER_BASE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (GEOCACHE_*)
/// 2. TOML config file (if GEOCACHE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Google Geocoding API key.
    ///
    /// Set via GEOCACHE_GOOGLE_GEOCODING_API_KEY environment variable.
    /// Required only when an address is not already cached.
    #[serde(default)]
    pub google_geocoding_api_key: Option<String>,

    /// Path to SQLite cache database.
    ///
    /// Set via GEOCACHE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Geocoding endpoint. `address` and `key` are appended as query parameters.
    ///
    /// Set via GEOCACHE_PROVIDER_BASE_URL environment variable.
    #[serde(default = "default_provider_base_url")]
    pub provider_base_url: String,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via GEOCACHE_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via GEOCACHE_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Hours a failed lookup is served from cache before the provider is asked again.
    ///
    /// Set via GEOCACHE_RETRY_AFTER_HOURS environment variable.
    #[serde(default = "default_retry_after_hours")]
    pub retry_after_hours: u32,

    /// Offset from UTC, in minutes, for the local `created_at` timestamp.
    ///
    /// Set via GEOCACHE_UTC_OFFSET_MINUTES environment variable.
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./geocache.sqlite")
}

fn default_provider_base_url() -> String {
    DEFAULT_PROVIDER_BASE_URL.into()
}

fn default_user_agent() -> String {
    "geocache/0.1".into()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_retry_after_hours() -> u32 {
    24
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            google_geocoding_api_key: None,
            db_path: default_db_path(),
            provider_base_url: default_provider_base_url(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            retry_after_hours: default_retry_after_hours(),
            utc_offset_minutes: 0,
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// How long a failed lookup blocks new provider calls.
    pub fn retry_window(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.retry_after_hours))
    }

    /// Offset for local timestamps. Falls back to UTC if out of range.
    pub fn local_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60)).unwrap_or_else(|| Utc.fix())
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `GEOCACHE_`
    /// 2. TOML file from `GEOCACHE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("GEOCACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("GEOCACHE_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Check if the geocoding API key is available (for deferred validation).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the key is not set or blank.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.google_geocoding_api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::Missing {
                field: crate::credentials::API_KEY_SETTING.into(),
                hint: "Set GEOCACHE_GOOGLE_GEOCODING_API_KEY environment variable".into(),
            })
    }
}
