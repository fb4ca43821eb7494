//! Engine configuration.
//!
//! All knobs have defaults, so an empty document deserializes to a usable
//! configuration. [`EngineConfig::validate`] rejects values the decoders
//! cannot run with.

use crate::{QecError, QecResult};
use qec_common::limits::{LOOKUP_MAX_CHECKS, LOOKUP_MAX_ENUMERATED};
use serde::{Deserialize, Serialize};

/// Largest accepted `lookup.max_checks`; tables hold `2^max_checks` entries.
pub const LOOKUP_CHECKS_CEILING: usize = 24;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub union_find: UnionFindConfig,
    pub bp: BpConfig,
    pub lookup: LookupConfig,
}

impl EngineConfig {
    pub fn validate(&self) -> QecResult<()> {
        self.union_find.validate()?;
        self.bp.validate()?;
        self.lookup.validate()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UnionFindConfig {
    /// Cap on growth rounds; unset derives one from the graph size.
    pub max_rounds: Option<usize>,
}

impl UnionFindConfig {
    pub fn validate(&self) -> QecResult<()> {
        if self.max_rounds == Some(0) {
            return Err(QecError::InvalidConfig(
                "union_find.max_rounds must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BpConfig {
    pub max_iterations: usize,
    /// Normalization factor applied to check-to-variable messages.
    pub scaling: f64,
    /// Physical error rate behind the prior log-likelihoods.
    pub prior_error_rate: f64,
}

impl Default for BpConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            scaling: 0.75,
            prior_error_rate: 0.01,
        }
    }
}

impl BpConfig {
    pub fn validate(&self) -> QecResult<()> {
        if self.max_iterations == 0 {
            return Err(QecError::InvalidConfig(
                "bp.max_iterations must be positive".into(),
            ));
        }
        if !(self.scaling.is_finite() && self.scaling > 0.0 && self.scaling <= 1.0) {
            return Err(QecError::InvalidConfig(format!(
                "bp.scaling must lie in (0, 1], got {}",
                self.scaling
            )));
        }
        if !(self.prior_error_rate > 0.0 && self.prior_error_rate < 0.5) {
            return Err(QecError::InvalidConfig(format!(
                "bp.prior_error_rate must lie in (0, 0.5), got {}",
                self.prior_error_rate
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LookupConfig {
    /// Sectors with more checks get no table.
    pub max_checks: usize,
    /// Error patterns enumerated per sector before giving up.
    pub max_enumerated: usize,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            max_checks: LOOKUP_MAX_CHECKS,
            max_enumerated: LOOKUP_MAX_ENUMERATED,
        }
    }
}

impl LookupConfig {
    pub fn validate(&self) -> QecResult<()> {
        if self.max_checks > LOOKUP_CHECKS_CEILING {
            return Err(QecError::InvalidConfig(format!(
                "lookup.max_checks must be at most {LOOKUP_CHECKS_CEILING}, got {}",
                self.max_checks
            )));
        }
        if self.max_enumerated == 0 {
            return Err(QecError::InvalidConfig(
                "lookup.max_enumerated must be positive".into(),
            ));
        }
        Ok(())
    }
}
