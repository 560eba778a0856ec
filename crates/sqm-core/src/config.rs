//! Lowering configuration, loadable from TOML.

use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid lowering config: {0}")]
    Parse(#[from] toml::de::Error),
}

///
/// LoweringConfig
///
/// Knobs for the lowering walk, binding application, and the
/// interpretation cache. Every field has a default, so an empty document
/// is a valid configuration.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoweringConfig {
    /// Reject parameter occurrences whose type cannot be inferred while
    /// lowering, instead of deferring their typing to bind time.
    pub strict_parameter_typing: bool,

    /// Emit one `tracing` event per applied binding.
    pub trace_bindings: bool,

    pub plan_cache: PlanCacheConfig,
}

impl LoweringConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&source)
    }
}

impl Default for LoweringConfig {
    fn default() -> Self {
        Self {
            strict_parameter_typing: false,
            trace_bindings: false,
            plan_cache: PlanCacheConfig::default(),
        }
    }
}

///
/// PlanCacheConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlanCacheConfig {
    pub enabled: bool,

    /// Maximum number of cached interpretations; 0 disables insertion.
    pub capacity: usize,
}

impl Default for PlanCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: 256,
        }
    }
}
