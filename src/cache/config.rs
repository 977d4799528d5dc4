use crate::cache::entry::DEFAULT_AGE_MS;
use crate::errors::KeeperError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the expiring cache.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Sweep interval for the background thread.
    pub check_frequency_ms: u64,
    /// Initial sizing hint for the entry map.
    pub initial_capacity: usize,
    /// Age applied to entries created with `Expiry::Default`.
    pub default_age_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            check_frequency_ms: 5_000,
            initial_capacity: 20,
            default_age_ms: DEFAULT_AGE_MS,
        }
    }
}

impl CacheConfig {
    pub fn validate(&self) -> Result<(), KeeperError> {
        if self.check_frequency_ms == 0 {
            return Err(KeeperError::Configuration("cache.check_frequency_ms must be > 0".into()));
        }
        if self.initial_capacity == 0 {
            return Err(KeeperError::Configuration("cache.initial_capacity must be > 0".into()));
        }
        if self.default_age_ms == 0 {
            return Err(KeeperError::Configuration("cache.default_age_ms must be > 0".into()));
        }
        Ok(())
    }

    #[must_use]
    pub const fn check_frequency(&self) -> Duration {
        Duration::from_millis(self.check_frequency_ms)
    }
}
