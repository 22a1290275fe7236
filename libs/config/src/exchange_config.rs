//! Exchange Configuration Module
//!
//! Provides configuration loading and management for the exchange engine.
//! Supports loading from TOML files with environment-specific overrides.

use crate::defaults;
use anyhow::{bail, Context, Result};
use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Main exchange configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ExchangeConfig {
    /// Engine economics
    pub engine: EngineSettings,

    /// Log filter and format
    pub logging: LoggingSettings,

    /// Snapshot persistence
    pub storage: StorageSettings,
}

/// Settings that change engine arithmetic
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct EngineSettings {
    /// Swap fee retained by the pool, in basis points
    pub fee_bps: u32,

    /// Liquidity units locked on the first deposit into a pool (raw units)
    pub minimum_liquidity: u64,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
}

/// Snapshot storage configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct StorageSettings {
    pub snapshot_path: Option<PathBuf>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            fee_bps: defaults::engine::FEE_BPS,
            minimum_liquidity: defaults::engine::MINIMUM_LIQUIDITY,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: defaults::logging::LEVEL.to_string(),
            json: false,
        }
    }
}

impl EngineSettings {
    /// Reject settings the engine cannot operate with
    pub fn validate(&self) -> Result<()> {
        if self.fee_bps >= defaults::engine::BPS_DENOMINATOR {
            bail!(
                "fee_bps must be below {} (got {})",
                defaults::engine::BPS_DENOMINATOR,
                self.fee_bps
            );
        }
        if self.minimum_liquidity == 0 {
            bail!("minimum_liquidity must be positive");
        }
        Ok(())
    }
}

impl ExchangeConfig {
    /// Load configuration from files with environment overrides
    pub fn load(base_path: Option<&Path>, environment: Option<&str>) -> Result<Self> {
        Self::load_with_environments_dir(
            base_path,
            environment,
            Path::new(defaults::sources::ENVIRONMENTS_DIR),
        )
    }

    /// Same as [`ExchangeConfig::load`] with an explicit overrides directory
    pub fn load_with_environments_dir(
        base_path: Option<&Path>,
        environment: Option<&str>,
        environments_dir: &Path,
    ) -> Result<Self> {
        // An explicitly named base file must exist; the default location is optional
        let mut builder = match base_path {
            Some(path) => Config::builder().add_source(File::from(path).required(true)),
            None => Config::builder()
                .add_source(File::from(Path::new(defaults::sources::BASE_FILE)).required(false)),
        };

        // Add environment-specific overrides if specified
        if let Some(env) = environment {
            let env_file = environments_dir.join(format!("{}.toml", env));

            if env_file.exists() {
                info!("Loading environment config: {:?}", env_file);
                builder = builder.add_source(File::from(env_file));
            } else {
                warn!("Environment config not found: {:?}", env_file);
            }
        }

        // Override with environment variables (PAIRSWAP_ENGINE__FEE_BPS)
        builder = builder.add_source(
            Environment::with_prefix(defaults::sources::ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        debug!(?config, "Configuration loaded");
        Ok(config)
    }

    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        self.engine
            .validate()
            .context("Invalid [engine] configuration")
    }

    /// Expand environment variables in path values
    pub fn expand_env_vars(&mut self) -> Result<()> {
        if let Some(path) = &self.storage.snapshot_path {
            let raw = path.to_string_lossy();
            let expanded =
                shellexpand::env(&raw).context("Failed to expand snapshot path")?;
            self.storage.snapshot_path = Some(PathBuf::from(expanded.as_ref()));
        }

        Ok(())
    }

    /// Render as TOML, e.g. to write out a starter configuration file
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}

/// Convenience function to load configuration with defaults
pub fn load_config(environment: Option<&str>) -> Result<ExchangeConfig> {
    let mut config = ExchangeConfig::load(None, environment)?;
    config.expand_env_vars()?;
    Ok(config)
}
