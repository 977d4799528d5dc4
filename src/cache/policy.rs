use crate::cache::clock::Clock;
use crate::cache::entry::CachedObject;
use crate::cache::metrics::CacheMetrics;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

pub(crate) type EntryMap<V> = HashMap<String, Arc<CachedObject<V>>>;

/// Outcome of one sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Plain entries removed because they were stale.
    pub evicted: usize,
    /// Refreshable entries removed because nobody read them within their time-to-live.
    pub untouched: usize,
    pub refreshed: usize,
    pub refresh_failures: usize,
}

/// Evicts stale and untouched entries, then refreshes stale refreshable ones.
///
/// The map lock is held only for the scan; refresh hooks run after it is released.
pub(crate) fn sweep<V>(
    store: &Arc<RwLock<EntryMap<V>>>,
    clock: &dyn Clock,
    metrics: &Arc<CacheMetrics>,
) -> SweepReport {
    let now = clock.now_millis();
    let mut report = SweepReport::default();
    let mut refresh_these: Vec<(String, Arc<CachedObject<V>>)> = Vec::new();
    {
        let mut map = store.write();
        map.retain(|key, entry| {
            if entry.is_refreshable() {
                if entry.is_untouched_at(now) {
                    report.untouched += 1;
                    return false;
                }
                if entry.is_stale_at(now) {
                    refresh_these.push((key.clone(), Arc::clone(entry)));
                }
                true
            } else if entry.is_stale_at(now) {
                report.evicted += 1;
                false
            } else {
                true
            }
        });
    }

    for (key, entry) in refresh_these {
        match entry.refresh_at(now) {
            Ok(true) => report.refreshed += 1,
            Ok(false) => {}
            Err(e) => {
                report.refresh_failures += 1;
                log::warn!(target: "poolkeeper::cache", "refresh of '{key}' failed: {e}");
            }
        }
    }

    CacheMetrics::bump(&metrics.sweeps);
    CacheMetrics::add(&metrics.sweep_evictions, report.evicted);
    CacheMetrics::add(&metrics.untouched_evictions, report.untouched);
    CacheMetrics::add(&metrics.refreshes, report.refreshed);
    CacheMetrics::add(&metrics.refresh_failures, report.refresh_failures);
    if report != SweepReport::default() {
        log::debug!(
            target: "poolkeeper::cache",
            "sweep: evicted={} untouched={} refreshed={} failures={}",
            report.evicted,
            report.untouched,
            report.refreshed,
            report.refresh_failures
        );
    }
    report
}
