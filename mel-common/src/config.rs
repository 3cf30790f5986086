//! Configuration loading and API base URL resolution
//!
//! Bootstrap configuration lives in a small TOML file. Missing files are not
//! fatal: the loader warns and falls back to compiled defaults.
//!
//! # API base URL priority
//!
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`MEL_API_URL`)
//! 3. TOML config file (`api_base_url`)
//! 4. Compiled default (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable consulted for the Remote API base URL
pub const API_URL_ENV_VAR: &str = "MEL_API_URL";

/// Compiled default for the Remote API base URL
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:3000";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Remote API base address (e.g. `https://api.example.com/prod`)
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Enrichment retry configuration (optional)
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Retry budget shared by every enrichment request
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EnrichmentConfig {
    /// Total attempts per enrichment dispatch (first try included)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed wait between attempts in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

impl TomlConfig {
    /// Validate values that serde cannot check on its own
    pub fn validate(&self) -> Result<()> {
        if self.enrichment.max_attempts == 0 {
            return Err(Error::Config(
                "enrichment.max_attempts must be at least 1".to_string(),
            ));
        }
        if let Some(url) = &self.api_base_url {
            normalize_base_url(url)?;
        }
        Ok(())
    }
}

/// Platform config file location: `<config dir>/mel/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("mel").join("config.toml"))
}

/// Load TOML configuration with graceful degradation
///
/// A missing file yields defaults plus a warning. A file that exists but
/// cannot be parsed or fails validation is an error.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))?;
    config.validate()?;

    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Write configuration atomically (temp file + rename)
///
/// Parent directories are created as needed.
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, content)?;
    std::fs::rename(&temp_path, path)?;
    Ok(())
}

/// Resolves the Remote API base URL from CLI → ENV → TOML → default
pub struct ApiUrlResolver {
    cli_arg: Option<String>,
    env_var_name: String,
}

impl ApiUrlResolver {
    pub fn new(cli_arg: Option<String>) -> Self {
        Self {
            cli_arg,
            env_var_name: API_URL_ENV_VAR.to_string(),
        }
    }

    /// Override the environment variable name (tests)
    pub fn with_env_var(mut self, name: impl Into<String>) -> Self {
        self.env_var_name = name.into();
        self
    }

    /// Resolve and normalize the base URL
    pub fn resolve(&self, toml_config: &TomlConfig) -> Result<String> {
        if let Some(url) = &self.cli_arg {
            debug!("API base URL from command line");
            return normalize_base_url(url);
        }

        if let Ok(url) = std::env::var(&self.env_var_name) {
            if !url.trim().is_empty() {
                debug!(env = %self.env_var_name, "API base URL from environment");
                return normalize_base_url(&url);
            }
        }

        if let Some(url) = &toml_config.api_base_url {
            debug!("API base URL from TOML config");
            return normalize_base_url(url);
        }

        debug!("API base URL from compiled default");
        Ok(DEFAULT_API_BASE_URL.to_string())
    }
}

/// Require an http(s) scheme and strip trailing slashes
pub fn normalize_base_url(url: &str) -> Result<String> {
    let trimmed = url.trim();
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(Error::Config(format!(
            "API base URL must start with http:// or https://, got '{}'",
            trimmed
        )));
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}
