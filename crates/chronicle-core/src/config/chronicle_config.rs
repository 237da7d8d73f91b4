//! Top-level Chronicle configuration with layered resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{DiffConfig, LoggingConfig, StorageConfig, VersioningConfig};
use crate::constants::MAX_READ_POOL_SIZE;
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`CHRONICLE_*`)
/// 2. Config file passed to [`ChronicleConfig::load`]
/// 3. Compiled defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ChronicleConfig {
    pub storage: StorageConfig,
    pub versioning: VersioningConfig,
    pub diff: DiffConfig,
    pub logging: LoggingConfig,
}

impl ChronicleConfig {
    /// Load a TOML file, then apply environment overrides and validate.
    /// A missing file is not an error; defaults are used.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?
        } else {
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    /// Pattern: `CHRONICLE_DB_PATH`, `CHRONICLE_READ_POOL_SIZE`, etc.
    /// Unparseable values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("CHRONICLE_DB_PATH") {
            if !val.trim().is_empty() {
                self.storage.path = Some(PathBuf::from(val));
            }
        }
        if let Some(val) = lookup("CHRONICLE_READ_POOL_SIZE") {
            if let Ok(v) = val.parse::<usize>() {
                self.storage.read_pool_size = v;
            }
        }
        if let Some(val) = lookup("CHRONICLE_BUSY_TIMEOUT_MS") {
            if let Ok(v) = val.parse::<u64>() {
                self.storage.busy_timeout_ms = v;
            }
        }
        if let Some(val) = lookup("CHRONICLE_VERSION_MAX_ATTEMPTS") {
            if let Ok(v) = val.parse::<u32>() {
                self.versioning.max_attempts = v;
            }
        }
        if let Some(val) = lookup("CHRONICLE_LOG_LEVEL") {
            if !val.trim().is_empty() {
                self.logging.level = val;
            }
        }
        if let Some(val) = lookup("CHRONICLE_LOG_JSON") {
            if let Ok(v) = val.parse::<bool>() {
                self.logging.json = v;
            }
        }
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.versioning.max_attempts == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "versioning.max_attempts".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if !(1..=MAX_READ_POOL_SIZE).contains(&self.storage.read_pool_size) {
            return Err(ConfigError::ValidationFailed {
                field: "storage.read_pool_size".to_string(),
                message: format!("must be between 1 and {MAX_READ_POOL_SIZE}"),
            });
        }
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::ValidationFailed {
                field: "logging.level".to_string(),
                message: "must not be blank".to_string(),
            });
        }
        Ok(())
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}
