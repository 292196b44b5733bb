//! Configuration types
//!
//! A [`ClientConfig`] is fixed for the lifetime of a client context: the cache
//! strategy and the default blocking deadline it selects apply uniformly to
//! every reference in the graph.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Which cache strategy a client context runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheMode {
    /// Every resolution goes to the fetch adapter.
    #[default]
    None,
    /// First resolution populates the cache; later ones are served from it.
    Simple,
    /// Like `Simple`, but a key is re-fetched after `refresh_after` reads.
    AutoUpdate,
}

impl CacheMode {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, CacheMode::None)
    }
}

/// Cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct CacheConfig {
    pub mode: CacheMode,
    /// Reads of one key served from cache before the next read re-fetches it.
    /// Only used by [`CacheMode::AutoUpdate`].
    pub refresh_after: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            mode: CacheMode::None,
            refresh_after: 100,
        }
    }
}

/// Master configuration struct for a client context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ClientConfig {
    /// Base URL of the content delivery OData service.
    pub webservice_location: String,
    /// Deadline applied by blocking getters when the caller passes none.
    pub default_timeout_ms: u64,
    /// Per-request timeout of the HTTP fetch adapter.
    pub request_timeout_ms: u64,
    /// Worker threads of the owned runtime; 0 lets tokio decide.
    pub worker_threads: usize,
    pub cache: CacheConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            webservice_location: "http://localhost:8080/odata.svc".to_string(),
            default_timeout_ms: 5_000,
            request_timeout_ms: 10_000,
            worker_threads: 0,
            cache: CacheConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Default blocking deadline as a [`Duration`].
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    /// HTTP request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Load from a TOML file and validate.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config = Self::from_toml(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse TOML without validating.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })
    }

    /// Create from environment variables with fallback to defaults.
    ///
    /// Environment variables:
    /// - `LATTICE_WEBSERVICE_LOCATION`: service base URL
    /// - `LATTICE_DEFAULT_TIMEOUT_MS`: blocking deadline (default: 5000)
    /// - `LATTICE_REQUEST_TIMEOUT_MS`: HTTP timeout (default: 10000)
    /// - `LATTICE_WORKER_THREADS`: runtime workers (default: 0 = tokio default)
    /// - `LATTICE_CACHE_MODE`: `none`, `simple` or `auto_update` (default: none)
    /// - `LATTICE_CACHE_REFRESH_AFTER`: auto-update threshold (default: 100)
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let cache_mode = match std::env::var("LATTICE_CACHE_MODE") {
            Ok(value) => parse_cache_mode(&value)?,
            Err(_) => defaults.cache.mode,
        };

        let config = Self {
            webservice_location: std::env::var("LATTICE_WEBSERVICE_LOCATION")
                .unwrap_or(defaults.webservice_location),
            default_timeout_ms: env_parse("LATTICE_DEFAULT_TIMEOUT_MS")?
                .unwrap_or(defaults.default_timeout_ms),
            request_timeout_ms: env_parse("LATTICE_REQUEST_TIMEOUT_MS")?
                .unwrap_or(defaults.request_timeout_ms),
            worker_threads: env_parse("LATTICE_WORKER_THREADS")?
                .unwrap_or(defaults.worker_threads),
            cache: CacheConfig {
                mode: cache_mode,
                refresh_after: env_parse("LATTICE_CACHE_REFRESH_AFTER")?
                    .unwrap_or(defaults.cache.refresh_after),
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// Validates:
    /// - webservice_location is a non-empty http(s) URL
    /// - default_timeout_ms and request_timeout_ms are positive
    /// - cache.refresh_after is positive when auto-update caching is selected
    pub fn validate(&self) -> Result<(), ConfigError> {
        let location = self.webservice_location.trim();
        if location.is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "webservice_location".to_string(),
            });
        }
        if !(location.starts_with("http://") || location.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "webservice_location".to_string(),
                value: self.webservice_location.clone(),
                reason: "must be an http or https URL".to_string(),
            });
        }

        if self.default_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "default_timeout_ms".to_string(),
                value: self.default_timeout_ms.to_string(),
                reason: "default_timeout_ms must be greater than 0".to_string(),
            });
        }

        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_ms".to_string(),
                value: self.request_timeout_ms.to_string(),
                reason: "request_timeout_ms must be greater than 0".to_string(),
            });
        }

        if self.cache.mode == CacheMode::AutoUpdate && self.cache.refresh_after == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cache.refresh_after".to_string(),
                value: self.cache.refresh_after.to_string(),
                reason: "refresh_after must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

fn parse_cache_mode(value: &str) -> Result<CacheMode, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "none" | "off" => Ok(CacheMode::None),
        "simple" => Ok(CacheMode::Simple),
        "auto_update" | "auto-update" => Ok(CacheMode::AutoUpdate),
        other => Err(ConfigError::InvalidValue {
            field: "LATTICE_CACHE_MODE".to_string(),
            value: other.to_string(),
            reason: "expected none, simple or auto_update".to_string(),
        }),
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                field: key.to_string(),
                value: raw.clone(),
                reason: "not a valid number".to_string(),
            }),
        Err(_) => Ok(None),
    }
}
