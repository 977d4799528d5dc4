use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for observing cache behavior.
#[derive(Default)]
pub struct CacheMetrics {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub expired_reads: AtomicU64,
    pub puts: AtomicU64,
    pub removes: AtomicU64,
    pub flushes: AtomicU64,
    pub refreshes: AtomicU64,
    pub refresh_failures: AtomicU64,
    pub sweep_evictions: AtomicU64,
    pub untouched_evictions: AtomicU64,
    pub sweeps: AtomicU64,
}

impl CacheMetrics {
    #[inline]
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add(counter: &AtomicU64, n: usize) {
        counter.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CacheMetricsSnapshot {
        CacheMetricsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expired_reads: self.expired_reads.load(Ordering::Relaxed),
            puts: self.puts.load(Ordering::Relaxed),
            removes: self.removes.load(Ordering::Relaxed),
            flushes: self.flushes.load(Ordering::Relaxed),
            refreshes: self.refreshes.load(Ordering::Relaxed),
            refresh_failures: self.refresh_failures.load(Ordering::Relaxed),
            sweep_evictions: self.sweep_evictions.load(Ordering::Relaxed),
            untouched_evictions: self.untouched_evictions.load(Ordering::Relaxed),
            sweeps: self.sweeps.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheMetricsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub expired_reads: u64,
    pub puts: u64,
    pub removes: u64,
    pub flushes: u64,
    pub refreshes: u64,
    pub refresh_failures: u64,
    pub sweep_evictions: u64,
    pub untouched_evictions: u64,
    pub sweeps: u64,
}
