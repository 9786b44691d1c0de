//! Run configuration.
//!
//! Loaded from an optional JSON file; every field has a default so a
//! partial file only overrides what it names. The API token is never
//! part of this file, it comes from `TRADIER_API_TOKEN`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::Environment;
use crate::screener::{CriteriaError, ScreeningCriteria};

/// Environment variable holding the Tradier bearer token.
pub const TOKEN_ENV_VAR: &str = "TRADIER_API_TOKEN";

/// Longest DTE window accepted, in days. Listed equity options do not
/// run past a few years.
pub const MAX_DTE_LIMIT: i64 = 3650;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid DTE window: min {min_dte} must be >= 0 and below max {max_dte}")]
    InvalidWindow { min_dte: i64, max_dte: i64 },

    #[error("Invalid DTE window: max {max_dte} exceeds the {limit}-day limit")]
    WindowTooLong { max_dte: i64, limit: i64 },

    #[error(transparent)]
    Criteria(#[from] CriteriaError),
}

/// Everything a screening run needs besides the symbol list and token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenerConfig {
    /// Tradier deployment.
    pub environment: Environment,
    /// Contract and price thresholds.
    pub criteria: ScreeningCriteria,
    /// Expirations must be more than this many days out.
    pub min_dte: i64,
    /// Expirations must be fewer than this many days out.
    pub max_dte: i64,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Sandbox,
            criteria: ScreeningCriteria::default(),
            min_dte: 10,
            max_dte: 47,
        }
    }
}

impl ScreenerConfig {
    /// Read and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_dte < 0 || self.min_dte >= self.max_dte {
            return Err(ConfigError::InvalidWindow {
                min_dte: self.min_dte,
                max_dte: self.max_dte,
            });
        }
        if self.max_dte > MAX_DTE_LIMIT {
            return Err(ConfigError::WindowTooLong {
                max_dte: self.max_dte,
                limit: MAX_DTE_LIMIT,
            });
        }
        self.criteria.validate()?;
        Ok(())
    }
}
