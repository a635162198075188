//! Application configuration management.
//!
//! Configuration is persisted as TOML on disk and has three sections:
//! `[api]` (credentials, base URL, endpoint overrides), `[resolver]` (the
//! delayed-link polling budget) and `[logging]`. The API key can be supplied
//! through the `ALLDEBRID_API_KEY` environment variable instead of the file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{self, polling};
use crate::error::{AdError, AdResult};
use crate::platform::Platform;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// API connection settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Delayed-link polling settings.
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API key. Empty means "not configured".
    #[serde(default)]
    pub api_key: String,

    /// Base URL of the v4 API, with trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Value of the `agent` query parameter.
    #[serde(default = "default_agent")]
    pub agent: String,

    /// Optional HTTP(S) proxy URL applied to every request.
    #[serde(default)]
    pub proxy: Option<String>,

    /// API request timeout in milliseconds.
    #[serde(default = "default_api_timeout")]
    pub timeout_ms: u64,

    /// Endpoint path overrides, keyed by endpoint name (e.g. `link_unlock = "link/unlock"`).
    #[serde(default)]
    pub endpoints: BTreeMap<String, String>,
}

/// Delayed-link polling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Maximum number of status polls per link. Must be positive.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Seconds slept between two polls.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,

    /// Wall-clock budget for the whole poll phase, in seconds.
    #[serde(default = "default_max_delay")]
    pub max_delay_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for log files. Empty disables file logging.
    #[serde(default)]
    pub directory: String,

    /// Enable JSON structured logging output in the log file.
    #[serde(default)]
    pub json_output: bool,
}

// Default value functions for serde

fn default_base_url() -> String {
    constants::DEFAULT_API_BASE_URL.to_string()
}

fn default_agent() -> String {
    constants::DEFAULT_AGENT.to_string()
}

fn default_api_timeout() -> u64 {
    constants::DEFAULT_API_TIMEOUT_MS
}

fn default_max_attempts() -> u32 {
    polling::DEFAULT_MAX_ATTEMPTS
}

fn default_retry_delay() -> u64 {
    polling::DEFAULT_RETRY_DELAY_SECS
}

fn default_max_delay() -> u64 {
    polling::DEFAULT_MAX_DELAY_SECS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            agent: default_agent(),
            proxy: None,
            timeout_ms: default_api_timeout(),
            endpoints: BTreeMap::new(),
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_delay_secs: default_retry_delay(),
            max_delay_secs: default_max_delay(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: String::new(),
            json_output: false,
        }
    }
}

impl ApiConfig {
    /// The configured API key, if any.
    pub fn api_key(&self) -> Option<&str> {
        let key = self.api_key.trim();
        if key.is_empty() {
            None
        } else {
            Some(key)
        }
    }

    /// Request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Base URL with exactly one trailing slash.
    pub fn normalized_base_url(&self) -> String {
        format!("{}/", self.base_url.trim().trim_end_matches('/'))
    }
}

impl ResolverConfig {
    /// Delay between two polls.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    /// Wall-clock budget of the poll phase.
    pub fn max_delay(&self) -> Duration {
        Duration::from_secs(self.max_delay_secs)
    }

    /// Reject settings the poll loop cannot honor.
    pub fn validate(&self) -> AdResult<()> {
        if self.max_attempts == 0 {
            return Err(AdError::Config("resolver.max_attempts must be positive".into()));
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load configuration from the default config file path, then apply
    /// environment overrides.
    pub fn load_default() -> AdResult<Self> {
        let path = Self::default_config_path()?;
        let mut config = if path.exists() {
            Self::load_from_file(&path)?
        } else {
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &Path) -> AdResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.resolver.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific file path.
    pub fn save_to_file(&self, path: &Path) -> AdResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| AdError::Config(format!("failed to serialize config: {e}")))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> AdResult<PathBuf> {
        Ok(Platform::config_dir()?.join("config.toml"))
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|name| std::env::var(name).ok());
    }

    /// Apply overrides using the given variable lookup.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(constants::API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.api.api_key = key.trim().to_string();
            }
        }
    }
}
