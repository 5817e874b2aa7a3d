//! Configuration loaded from the environment.
//!
//! Variables use the `VNSTOCK_PRICING` prefix and `__` between sections, e.g.
//! `VNSTOCK_PRICING__SERVICE__BASE_URL=https://api.example.vn/api`.
//! A `.env` file is read first when present.

use chrono::Duration;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration loading failed: {0}")]
    Load(#[from] config::ConfigError),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("service base_url must start with http:// or https://")]
    InvalidBaseUrl,

    #[error("service timeout must be between 1 and 300 seconds")]
    InvalidTimeout,

    #[error("cache path must not be empty")]
    EmptyCachePath,

    #[error("cache max_age_secs must be at most one year")]
    InvalidMaxAge,
}

const MAX_CACHE_AGE_SECS: u64 = 365 * 24 * 3600;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Pricing/subscription service endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Sent as `X-API-Code`. Empty means no header.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_path")]
    pub path: String,
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default)]
    pub json: bool,
}

fn default_base_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_cache_path() -> String {
    "pricing_snapshot.json".to_string()
}

fn default_max_age_secs() -> u64 {
    3600
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: default_cache_path(),
            max_age_secs: default_max_age_secs(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

impl CacheConfig {
    /// How long a snapshot stays fresh, or `None` if `max_age_secs` does not fit.
    pub fn max_age(&self) -> Option<Duration> {
        i64::try_from(self.max_age_secs)
            .ok()
            .and_then(Duration::try_seconds)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("VNSTOCK_PRICING")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let url = &self.service.base_url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ValidationError::InvalidBaseUrl);
        }
        if self.service.timeout_secs == 0 || self.service.timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.cache.path.trim().is_empty() {
            return Err(ValidationError::EmptyCachePath);
        }
        if self.cache.max_age_secs > MAX_CACHE_AGE_SECS {
            return Err(ValidationError::InvalidMaxAge);
        }
        Ok(())
    }
}
