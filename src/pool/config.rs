use crate::errors::KeeperError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::num::NonZeroUsize;

/// Capacity used for classes without an override.
pub const DEFAULT_POOL_CAPACITY: usize = 128;

/// Configuration for the instance pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Global default capacity per class.
    pub capacity: usize,
    /// Keep constructing fresh instances until a class buffer is half full.
    pub debug: bool,
    /// Per-class capacity overrides, keyed by class name.
    pub capacities: HashMap<String, usize>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self { capacity: DEFAULT_POOL_CAPACITY, debug: false, capacities: HashMap::new() }
    }
}

impl PoolConfig {
    pub fn validate(&self) -> Result<(), KeeperError> {
        if self.capacity == 0 {
            return Err(KeeperError::Configuration("pool.capacity must be > 0".into()));
        }
        if let Some((class, _)) = self.capacities.iter().find(|(_, cap)| **cap == 0) {
            return Err(KeeperError::Configuration(format!(
                "pool.capacities.{class} must be > 0"
            )));
        }
        Ok(())
    }

    /// Per-class override if present, else the global default.
    #[must_use]
    pub fn capacity_for(&self, class_name: &str) -> NonZeroUsize {
        self.capacities
            .get(class_name)
            .copied()
            .and_then(NonZeroUsize::new)
            .or_else(|| NonZeroUsize::new(self.capacity))
            .unwrap_or(NonZeroUsize::MIN)
    }

    #[must_use]
    pub fn with_capacity_for(mut self, class_name: impl Into<String>, capacity: usize) -> Self {
        self.capacities.insert(class_name.into(), capacity);
        self
    }
}
