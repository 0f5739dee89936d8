//! Configuration management for the tierstore daemon
//!
//! Sources, lowest to highest precedence:
//! 1. Hardcoded defaults
//! 2. /etc/tierstore/tierstore.{yaml,toml,json}
//! 3. ./config/tierstore.{yaml,toml,json}
//! 4. File named by the TIERSTORE_CONFIG env var
//! 5. Environment variables (TIERSTORE__MIGRATION__COLD_THRESHOLD_SECS=...)

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tierstore_storage::MigrationPolicy;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct TierStoreConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub migration: MigrationPolicy,
}

impl TierStoreConfig {
    /// Load configuration from all sources and validate it.
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Self::set_defaults(Config::builder())?;

        builder = builder
            .add_source(File::with_name("/etc/tierstore/tierstore").required(false))
            .add_source(File::with_name("./config/tierstore").required(false));

        if let Ok(config_path) = std::env::var("TIERSTORE_CONFIG") {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("TIERSTORE")
                .separator("__")
                .try_parsing(true),
        );

        let config: TierStoreConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path (defaults fill the gaps).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config: TierStoreConfig = Self::set_defaults(Config::builder())?
            .add_source(File::from(path.as_ref()))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn set_defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        let defaults = MigrationPolicy::default();
        builder
            .set_default("storage.cold_dir", "./data/cold")?
            .set_default("migration.hot_threshold_secs", defaults.hot_threshold_secs)?
            .set_default("migration.cold_threshold_secs", defaults.cold_threshold_secs)?
            .set_default("migration.interval_secs", defaults.interval_secs as i64)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.cold_dir.as_os_str().is_empty() {
            return Err(ConfigError::Message(
                "storage.cold_dir must not be empty".to_string(),
            ));
        }

        self.migration
            .validate()
            .map_err(|e| ConfigError::Message(format!("migration: {e}")))
    }
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory holding one JSON file per cold record
    pub cold_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            cold_dir: PathBuf::from("./data/cold"),
        }
    }
}
