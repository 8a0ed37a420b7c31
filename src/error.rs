//! Error types for the table, its configuration and its sinks.

use thiserror::Error;

/// A key's native hash could not be computed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("native hash failed: {reason}")]
pub struct KeyHashError {
    reason: String,
}

impl KeyHashError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Failures surfaced by `HashTable` operations.
#[derive(Debug, Error)]
pub enum TableError {
    #[error(transparent)]
    KeyHash(#[from] KeyHashError),
    #[error("cannot grow beyond {max_capacity} buckets (current capacity {capacity})")]
    CapacityOverflow {
        capacity: usize,
        max_capacity: usize,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("load factor must be finite and positive, got {0}")]
    InvalidLoadFactor(f32),
    #[error("initial capacity {capacity} must be within 1..={max_capacity}")]
    InvalidCapacity {
        capacity: usize,
        max_capacity: usize,
    },
    #[error("max capacity {0} is not a power of two")]
    InvalidMaxCapacity(usize),
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// A sink could not deliver an event. The table logs and otherwise ignores it.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("sink write failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("sink rejected event: {0}")]
    Rejected(String),
}
