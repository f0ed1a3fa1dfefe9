/*!
 * Simulation Configuration
 *
 * Immutable per-session settings: capacity and pressure thresholds
 */

use super::limits::{
    DEFAULT_CAPACITY, DEFAULT_CRITICAL_THRESHOLD, DEFAULT_WARNING_THRESHOLD, ENV_CAPACITY,
    ENV_CRITICAL_THRESHOLD, ENV_WARNING_THRESHOLD, MEDIUM_PRESSURE_THRESHOLD,
};
use super::types::Size;
use crate::memory::{InvalidInput, MemoryError, MemoryResult};
use serde::{Deserialize, Serialize};

/// Memory simulation configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Total capacity of the address space
    pub capacity: Size,
    /// Usage ratio reported as HIGH pressure
    pub warning_threshold: f64,
    /// Usage ratio reported as CRITICAL pressure
    pub critical_threshold: f64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY.get(),
            warning_threshold: DEFAULT_WARNING_THRESHOLD,
            critical_threshold: DEFAULT_CRITICAL_THRESHOLD,
        }
    }
}

impl MemoryConfig {
    /// Configuration with the given capacity and default thresholds
    pub fn new(capacity: Size) -> MemoryResult<Self> {
        Self::default().with_capacity(capacity)
    }

    pub fn with_capacity(mut self, capacity: Size) -> MemoryResult<Self> {
        self.capacity = capacity;
        self.validate()?;
        Ok(self)
    }

    pub fn with_thresholds(mut self, warning: f64, critical: f64) -> MemoryResult<Self> {
        self.warning_threshold = warning;
        self.critical_threshold = critical;
        self.validate()?;
        Ok(self)
    }

    /// Build configuration from defaults overridden by `MEMSIM_*` variables
    pub fn from_env() -> MemoryResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> MemoryResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_CAPACITY) {
            config.capacity = raw
                .trim()
                .parse::<Size>()
                .map_err(|_| invalid_config(ENV_CAPACITY, &raw))?;
        }
        if let Some(raw) = lookup(ENV_WARNING_THRESHOLD) {
            config.warning_threshold = parse_ratio(ENV_WARNING_THRESHOLD, &raw)?;
        }
        if let Some(raw) = lookup(ENV_CRITICAL_THRESHOLD) {
            config.critical_threshold = parse_ratio(ENV_CRITICAL_THRESHOLD, &raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> MemoryResult<()> {
        if self.capacity == 0 {
            return Err(MemoryError::InvalidInput(InvalidInput::ZeroCapacity));
        }
        // MEDIUM is fixed, so HIGH and CRITICAL must sit above it in order
        let ordered = MEDIUM_PRESSURE_THRESHOLD <= self.warning_threshold
            && self.warning_threshold <= self.critical_threshold
            && self.critical_threshold <= 1.0;
        if !ordered {
            return Err(MemoryError::InvalidInput(InvalidInput::InvalidThreshold {
                warning: self.warning_threshold,
                critical: self.critical_threshold,
            }));
        }
        Ok(())
    }
}

fn parse_ratio(key: &str, raw: &str) -> MemoryResult<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|ratio| ratio.is_finite())
        .ok_or_else(|| invalid_config(key, raw))
}

fn invalid_config(key: &str, raw: &str) -> MemoryError {
    MemoryError::InvalidInput(InvalidInput::InvalidConfig {
        key: key.to_string(),
        value: raw.to_string(),
    })
}
