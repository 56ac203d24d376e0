//! Configuration module for FSAF.
//!
//! Settings are layered: built-in defaults, then an optional TOML, JSON or
//! YAML file, then environment variables (`FSAF__CACHE__SEARCH_MODE=slow`).
//! Every section is validated before use.

use crate::error::config::ConfigError;
use config::{Config, Environment, File, FileFormat};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub mod cache;
pub mod provider;

pub use cache::{CacheConfig, SearchMode, SnapshotConfig};
pub use provider::ProviderConfig;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Default environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "FSAF";

/// A trait for types that can be validated.
pub trait Validate {
    /// Validates that the configuration is correct.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the configuration is valid
    /// * `Err(ConfigError)` if the configuration is invalid
    fn validate(&self) -> ConfigResult<()>;
}

/// Main configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FsafConfig {
    /// Lookup cache and snapshot settings
    pub cache: CacheConfig,

    /// Document provider settings
    pub provider: ProviderConfig,

    /// Log configuration
    pub log: LogConfig,
}

impl Validate for FsafConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.cache.validate()?;
        self.provider.validate()?;
        self.log.validate()?;
        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Whether to log in JSON format
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Validate for LogConfig {
    fn validate(&self) -> ConfigResult<()> {
        match self.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            _ => Err(ConfigError::ValidationError(format!(
                "Invalid log level: {}",
                self.level
            ))),
        }
    }
}

/// Configuration loader.
#[derive(Debug)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    env_prefix: String,
}

impl ConfigLoader {
    /// Creates a new configuration loader.
    ///
    /// # Arguments
    ///
    /// * `config_path` - Optional path to the configuration file
    /// * `env_prefix` - Prefix for environment variables that override configuration values
    pub fn new<P: AsRef<Path>>(config_path: Option<P>, env_prefix: &str) -> Self {
        Self {
            config_path: config_path.map(|p| p.as_ref().to_path_buf()),
            env_prefix: env_prefix.to_string(),
        }
    }

    /// Loads the configuration from a file and environment variables.
    ///
    /// # Returns
    ///
    /// * `Ok(FsafConfig)` if the configuration was loaded successfully
    /// * `Err(ConfigError)` if there was an error loading the configuration
    pub fn load(&self) -> ConfigResult<FsafConfig> {
        let mut builder = Config::builder().add_source(
            Config::try_from(&FsafConfig::default())
                .map_err(|e| ConfigError::ParseError(e.to_string()))?,
        );

        if let Some(path) = &self.config_path {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.clone()));
            }

            let format = match path.extension().and_then(|ext| ext.to_str()) {
                Some("toml") => FileFormat::Toml,
                Some("json") => FileFormat::Json,
                Some("yaml" | "yml") => FileFormat::Yaml,
                _ => {
                    return Err(ConfigError::ParseError(format!(
                        "Unsupported file extension for: {path:?}"
                    )))
                }
            };

            builder = builder.add_source(File::from(path.as_path()).format(format));
        }

        builder = builder.add_source(
            Environment::with_prefix(&self.env_prefix)
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        let fsaf_config: FsafConfig = config
            .try_deserialize()
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        fsaf_config.validate()?;

        Ok(fsaf_config)
    }
}

/// Global configuration accessor.
#[derive(Debug, Clone)]
pub struct GlobalConfig {
    config: Arc<FsafConfig>,
}

impl GlobalConfig {
    /// Creates a new global configuration.
    pub fn new(config: FsafConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Returns a reference to the configuration.
    pub fn get(&self) -> &FsafConfig {
        &self.config
    }
}

static GLOBAL_CONFIG: OnceCell<Mutex<GlobalConfig>> = OnceCell::new();

/// Initialize the global configuration. Later calls are ignored.
pub fn init_global_config(config: FsafConfig) {
    if GLOBAL_CONFIG.set(Mutex::new(GlobalConfig::new(config))).is_err() {
        tracing::warn!("Global configuration was already initialized, ignoring new configuration");
    }
}

/// Get the global configuration, or the defaults if none was initialized.
pub fn get_global_config() -> GlobalConfig {
    match GLOBAL_CONFIG.get() {
        Some(mutex) => mutex
            .lock()
            .unwrap_or_else(|poisoned| {
                tracing::error!("Global config lock was poisoned, recovering");
                poisoned.into_inner()
            })
            .clone(),
        None => GlobalConfig::new(FsafConfig::default()),
    }
}
