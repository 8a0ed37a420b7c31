//! Table construction parameters, optionally loaded from TOML.

use crate::error::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_INITIAL_CAPACITY: usize = 16;
pub const DEFAULT_LOAD_FACTOR: f32 = 0.75;
/// Largest bucket count a table may grow to.
pub const MAXIMUM_CAPACITY: usize = 1 << 30;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TableConfig {
    /// Requested bucket count; rounded up to a power of two.
    pub initial_capacity: usize,
    pub load_factor: f32,
    pub max_capacity: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            load_factor: DEFAULT_LOAD_FACTOR,
            max_capacity: MAXIMUM_CAPACITY,
        }
    }
}

impl TableConfig {
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    pub fn with_load_factor(mut self, load_factor: f32) -> Self {
        self.load_factor = load_factor;
        self
    }

    pub fn with_max_capacity(mut self, max_capacity: usize) -> Self {
        self.max_capacity = max_capacity;
        self
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: TableConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.load_factor.is_finite() || self.load_factor <= 0.0 {
            return Err(ConfigError::InvalidLoadFactor(self.load_factor));
        }
        if !self.max_capacity.is_power_of_two() {
            return Err(ConfigError::InvalidMaxCapacity(self.max_capacity));
        }
        if self.initial_capacity == 0 || self.initial_capacity > self.max_capacity {
            return Err(ConfigError::InvalidCapacity {
                capacity: self.initial_capacity,
                max_capacity: self.max_capacity,
            });
        }
        Ok(())
    }

    /// Bucket count a table built from this config starts with.
    pub fn table_capacity(&self) -> usize {
        self.initial_capacity.next_power_of_two()
    }
}

/// `floor(capacity * load_factor)`, saturating at `usize::MAX`.
pub(crate) fn threshold_for(capacity: usize, load_factor: f32) -> usize {
    (capacity as f64 * load_factor as f64).floor() as usize
}
