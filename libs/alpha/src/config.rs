//! Calculator configuration
//!
//! Loaded from an optional TOML file with `TORQ_ALPHA_` environment
//! overrides, the same layering the service configs use.

use crate::error::{AlphaError, AlphaResult};
use anyhow::{Context as _, Result};
use bigdecimal::RoundingMode;
use config_crate::{Config, Environment, File, Map};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU64;
use std::path::Path;
use tracing::{debug, info};

/// Significant digits used when nothing is configured
pub const DEFAULT_PRECISION: u64 = 100;

/// Upper bound on the configured precision
pub const MAX_PRECISION: u64 = 1_000;

/// Environment prefix for overrides (`TORQ_ALPHA_PRECISION=64`)
pub const ENV_PREFIX: &str = "TORQ_ALPHA";

/// Rounding applied to square roots and the final result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingPolicy {
    #[default]
    HalfEven,
    HalfUp,
    Down,
    Floor,
    Ceiling,
}

impl From<RoundingPolicy> for RoundingMode {
    fn from(policy: RoundingPolicy) -> Self {
        match policy {
            RoundingPolicy::HalfEven => RoundingMode::HalfEven,
            RoundingPolicy::HalfUp => RoundingMode::HalfUp,
            RoundingPolicy::Down => RoundingMode::Down,
            RoundingPolicy::Floor => RoundingMode::Floor,
            RoundingPolicy::Ceiling => RoundingMode::Ceiling,
        }
    }
}

/// Precision settings for arbitrary-precision evaluation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AlphaConfig {
    /// Significant decimal digits guaranteed in the result; intermediates
    /// widen this by the digit count of the reserves
    pub precision: u64,
    pub rounding: RoundingPolicy,
}

impl Default for AlphaConfig {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            rounding: RoundingPolicy::HalfEven,
        }
    }
}

impl AlphaConfig {
    /// Load configuration from an optional file with environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Like [`Self::load`], reading overrides from `env` instead of the
    /// process environment when it is given
    pub fn load_with_env(path: Option<&Path>, env: Option<Map<String, String>>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            info!("Loading alpha config: {:?}", path);
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .source(env),
        );

        let config: AlphaConfig = builder
            .build()
            .context("Failed to build alpha configuration")?
            .try_deserialize()
            .context("Failed to deserialize alpha configuration")?;

        config
            .validate()
            .context("Alpha configuration failed validation")?;

        debug!(
            precision = config.precision,
            rounding = ?config.rounding,
            "alpha config loaded"
        );
        Ok(config)
    }

    /// Check precision bounds
    pub fn validate(&self) -> AlphaResult<()> {
        if self.precision == 0 || self.precision > MAX_PRECISION {
            return Err(AlphaError::InvalidConfig {
                message: format!(
                    "precision must be within 1..={}, got {}",
                    MAX_PRECISION, self.precision
                ),
            });
        }
        Ok(())
    }

    /// Configured precision widened by `extra_digits` for intermediates
    pub fn working_precision(&self, extra_digits: u64) -> AlphaResult<NonZeroU64> {
        NonZeroU64::new(self.precision.saturating_add(extra_digits)).ok_or_else(|| {
            AlphaError::InvalidConfig {
                message: "precision must be non-zero".to_string(),
            }
        })
    }

    pub fn rounding_mode(&self) -> RoundingMode {
        self.rounding.into()
    }
}
