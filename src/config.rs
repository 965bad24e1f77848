//! Engine tuning knobs.

use std::time::Duration;
use thiserror::Error;

/// Attempts `apply_delta` makes before giving up under contention.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Upper bound on a single store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max_attempts must be at least 1")]
    ZeroAttempts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Total compare-and-update attempts per `apply_delta` call, first try included.
    pub max_attempts: u32,
    /// Per-call store timeout. `None` waits indefinitely.
    pub store_timeout: Option<Duration>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            store_timeout: Some(DEFAULT_STORE_TIMEOUT),
        }
    }
}

impl LedgerConfig {
    /// Builds a validated configuration.
    ///
    /// A `store_timeout_ms` of zero disables the timeout.
    pub fn new(max_attempts: u32, store_timeout_ms: u64) -> Result<Self, ConfigError> {
        let config = Self {
            max_attempts,
            store_timeout: (store_timeout_ms > 0).then(|| Duration::from_millis(store_timeout_ms)),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        Ok(())
    }
}
