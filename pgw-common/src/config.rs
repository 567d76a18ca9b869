//! Configuration loading for the gateway
//!
//! Resolution follows a fixed priority order:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables
//! 3. TOML config file
//! 4. Compiled defaults (fallback)
//!
//! A missing default config file is not an error; a missing file that was
//! named explicitly, or a malformed one, is.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_IMMICH_API_URL: &str = "http://immich-server:3001";
pub const DEFAULT_GROUPING_API_URL: &str = "http://grouping-service:8000";
pub const DEFAULT_DEDUP_API_URL: &str = "http://dedup-service:8001";
pub const DEFAULT_REDIS_URL: &str = "redis://custom-redis:6379";
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Token validation cache TTL
pub const DEFAULT_CACHE_EXPIRY_SECS: u64 = 300;

/// Gateway configuration loaded from TOML file
///
/// Every field is optional; absent fields fall back to compiled defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub immich_api_url: Option<String>,
    #[serde(default)]
    pub grouping_api_url: Option<String>,
    #[serde(default)]
    pub dedup_api_url: Option<String>,
    #[serde(default)]
    pub redis_url: Option<String>,
    #[serde(default)]
    pub cache_expiry_secs: Option<u64>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default)]
    pub level: Option<String>,
}

/// Values supplied by the command line or the environment
///
/// The binary fills this from its clap arguments, which read the
/// environment themselves; `None` means neither tier supplied the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub port: Option<u16>,
    pub immich_api_url: Option<String>,
    pub grouping_api_url: Option<String>,
    pub dedup_api_url: Option<String>,
    pub redis_url: Option<String>,
    pub log_level: Option<String>,
    pub cache_expiry_secs: Option<u64>,
}

/// Fully resolved gateway configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub port: u16,
    pub immich_api_url: String,
    pub grouping_api_url: String,
    pub dedup_api_url: String,
    pub redis_url: String,
    pub log_level: String,
    pub cache_expiry_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            immich_api_url: DEFAULT_IMMICH_API_URL.to_string(),
            grouping_api_url: DEFAULT_GROUPING_API_URL.to_string(),
            dedup_api_url: DEFAULT_DEDUP_API_URL.to_string(),
            redis_url: DEFAULT_REDIS_URL.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            cache_expiry_secs: DEFAULT_CACHE_EXPIRY_SECS,
        }
    }
}

impl GatewayConfig {
    /// Resolve configuration from all tiers
    ///
    /// `config_path` is an explicitly requested file; when `None` the
    /// per-user default location is tried.
    pub fn resolve(config_path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self> {
        let toml_config = match config_path {
            Some(path) => load_toml_config(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => load_toml_config(&path)?,
                _ => {
                    info!("No config file found, using defaults");
                    TomlConfig::default()
                }
            },
        };

        let config = Self::from_toml(toml_config).with_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Apply TOML values over compiled defaults
    pub fn from_toml(toml_config: TomlConfig) -> Self {
        let defaults = Self::default();
        Self {
            port: toml_config.port.unwrap_or(defaults.port),
            immich_api_url: toml_config.immich_api_url.unwrap_or(defaults.immich_api_url),
            grouping_api_url: toml_config
                .grouping_api_url
                .unwrap_or(defaults.grouping_api_url),
            dedup_api_url: toml_config.dedup_api_url.unwrap_or(defaults.dedup_api_url),
            redis_url: toml_config.redis_url.unwrap_or(defaults.redis_url),
            log_level: toml_config.logging.level.unwrap_or(defaults.log_level),
            cache_expiry_secs: toml_config
                .cache_expiry_secs
                .unwrap_or(defaults.cache_expiry_secs),
        }
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(url) = overrides.immich_api_url {
            self.immich_api_url = url;
        }
        if let Some(url) = overrides.grouping_api_url {
            self.grouping_api_url = url;
        }
        if let Some(url) = overrides.dedup_api_url {
            self.dedup_api_url = url;
        }
        if let Some(url) = overrides.redis_url {
            self.redis_url = url;
        }
        if let Some(level) = overrides.log_level {
            self.log_level = level;
        }
        if let Some(secs) = overrides.cache_expiry_secs {
            self.cache_expiry_secs = secs;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(Error::Config("port must be non-zero".to_string()));
        }
        if self.cache_expiry_secs == 0 {
            return Err(Error::Config(
                "cache_expiry_secs must be greater than 0".to_string(),
            ));
        }
        for (name, url) in [
            ("immich_api_url", &self.immich_api_url),
            ("grouping_api_url", &self.grouping_api_url),
            ("dedup_api_url", &self.dedup_api_url),
            ("redis_url", &self.redis_url),
        ] {
            if url.trim().is_empty() {
                return Err(Error::Config(format!("{} must not be empty", name)));
            }
        }
        Ok(())
    }
}

/// Per-user default config file: `~/.config/pgw/gateway.toml` on Linux
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pgw").join("gateway.toml"))
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        warn!("Failed to read config file {}: {}", path.display(), e);
        Error::Config(format!("Read {} failed: {}", path.display(), e))
    })?;

    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    info!("Loaded config file {}", path.display());
    Ok(config)
}
