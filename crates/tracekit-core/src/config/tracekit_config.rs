//! Top-level tracekit configuration with layered resolution.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{IndexConfig, LedgerConfig, PropagationConfig, ZeroTransferPolicy};
use crate::constants::{CONFIG_FILENAME, MAX_SHARE, MIN_SHARE};
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Programmatic overrides (`ConfigOverrides`)
/// 2. Environment variables (`TRACEKIT_*`)
/// 3. Project config (`tracekit.toml` in the project root)
/// 4. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TracekitConfig {
    pub ledger: LedgerConfig,
    pub propagation: PropagationConfig,
    pub index: IndexConfig,
}

/// Overrides applied on top of every other layer.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub parallel: Option<bool>,
    pub threads: Option<usize>,
    pub min_share: Option<f64>,
    pub incremental: Option<bool>,
    pub zero_transfers: Option<ZeroTransferPolicy>,
}

impl TracekitConfig {
    /// Load configuration with layered resolution rooted at `root`.
    pub fn load(root: &Path, overrides: Option<&ConfigOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let project_config_path = root.join(CONFIG_FILENAME);
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        Self::apply_env_overrides(&mut config);

        if let Some(overrides) = overrides {
            Self::apply_overrides(&mut config, overrides);
        }

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Serialize the configuration to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(config: &TracekitConfig) -> Result<(), ConfigError> {
        if let Some(min_share) = config.propagation.min_share {
            if !(MIN_SHARE..=MAX_SHARE).contains(&min_share) {
                return Err(ConfigError::ValidationFailed {
                    field: "propagation.min_share".to_string(),
                    message: "must be between 0.0 and 1.0".to_string(),
                });
            }
        }
        if let Some(threads) = config.propagation.threads {
            if threads == 0 {
                return Err(ConfigError::ValidationFailed {
                    field: "propagation.threads".to_string(),
                    message: "must be greater than 0".to_string(),
                });
            }
        }
        if let Some(ratio) = config.index.full_rebuild_ratio {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(ConfigError::ValidationFailed {
                    field: "index.full_rebuild_ratio".to_string(),
                    message: "must be between 0.0 and 1.0".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are ignored.
    fn merge_toml_file(config: &mut TracekitConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: TracekitConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// `other` values override `base` only where `other` has `Some`.
    fn merge(base: &mut TracekitConfig, other: &TracekitConfig) {
        if other.ledger.transfer_at_source_end.is_some() {
            base.ledger.transfer_at_source_end = other.ledger.transfer_at_source_end;
        }
        if other.ledger.zero_transfers.is_some() {
            base.ledger.zero_transfers = other.ledger.zero_transfers;
        }

        if other.propagation.parallel.is_some() {
            base.propagation.parallel = other.propagation.parallel;
        }
        if other.propagation.threads.is_some() {
            base.propagation.threads = other.propagation.threads;
        }
        if other.propagation.min_share.is_some() {
            base.propagation.min_share = other.propagation.min_share;
        }

        if other.index.incremental.is_some() {
            base.index.incremental = other.index.incremental;
        }
        if other.index.full_rebuild_ratio.is_some() {
            base.index.full_rebuild_ratio = other.index.full_rebuild_ratio;
        }
    }

    /// Unparseable values are skipped and the lower layer wins.
    fn apply_env_overrides(config: &mut TracekitConfig) {
        if let Ok(val) = std::env::var("TRACEKIT_PROPAGATION_PARALLEL") {
            if let Ok(v) = val.parse::<bool>() {
                config.propagation.parallel = Some(v);
            }
        }
        if let Ok(val) = std::env::var("TRACEKIT_PROPAGATION_THREADS") {
            if let Ok(v) = val.parse::<usize>() {
                config.propagation.threads = Some(v);
            }
        }
        if let Ok(val) = std::env::var("TRACEKIT_PROPAGATION_MIN_SHARE") {
            if let Ok(v) = val.parse::<f64>() {
                config.propagation.min_share = Some(v);
            }
        }
        if let Ok(val) = std::env::var("TRACEKIT_INDEX_INCREMENTAL") {
            if let Ok(v) = val.parse::<bool>() {
                config.index.incremental = Some(v);
            }
        }
        if let Ok(val) = std::env::var("TRACEKIT_INDEX_FULL_REBUILD_RATIO") {
            if let Ok(v) = val.parse::<f64>() {
                config.index.full_rebuild_ratio = Some(v);
            }
        }
        if let Ok(val) = std::env::var("TRACEKIT_LEDGER_ZERO_TRANSFERS") {
            if let Ok(v) = val.parse::<ZeroTransferPolicy>() {
                config.ledger.zero_transfers = Some(v);
            }
        }
    }

    fn apply_overrides(config: &mut TracekitConfig, overrides: &ConfigOverrides) {
        if let Some(v) = overrides.parallel {
            config.propagation.parallel = Some(v);
        }
        if let Some(v) = overrides.threads {
            config.propagation.threads = Some(v);
        }
        if let Some(v) = overrides.min_share {
            config.propagation.min_share = Some(v);
        }
        if let Some(v) = overrides.incremental {
            config.index.incremental = Some(v);
        }
        if let Some(v) = overrides.zero_transfers {
            config.ledger.zero_transfers = Some(v);
        }
    }
}
