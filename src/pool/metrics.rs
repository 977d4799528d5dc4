use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for observing pool behavior.
#[derive(Default)]
pub struct PoolMetrics {
    pub recycled: AtomicU64,
    pub constructed: AtomicU64,
    pub instantiation_failures: AtomicU64,
    pub recycle_failures: AtomicU64,
    pub released: AtomicU64,
    pub rejected_full: AtomicU64,
    pub rejected_dispose: AtomicU64,
}

impl PoolMetrics {
    #[inline]
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PoolMetricsSnapshot {
        PoolMetricsSnapshot {
            recycled: self.recycled.load(Ordering::Relaxed),
            constructed: self.constructed.load(Ordering::Relaxed),
            instantiation_failures: self.instantiation_failures.load(Ordering::Relaxed),
            recycle_failures: self.recycle_failures.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
            rejected_full: self.rejected_full.load(Ordering::Relaxed),
            rejected_dispose: self.rejected_dispose.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PoolMetricsSnapshot {
    pub recycled: u64,
    pub constructed: u64,
    pub instantiation_failures: u64,
    pub recycle_failures: u64,
    pub released: u64,
    pub rejected_full: u64,
    pub rejected_dispose: u64,
}
