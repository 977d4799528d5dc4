use crate::integration_tests::_support::Quote;
use poolkeeper::cache::{CacheConfig, ManualClock};
use poolkeeper::{ExpiringCache, Expiry, KeeperError};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn wait_until(limit: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < limit {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    cond()
}

#[test]
fn sweep_thread_evicts_expired_entries() {
    let config = CacheConfig { check_frequency_ms: 20, ..Default::default() };
    let cache: ExpiringCache<u32> = ExpiringCache::new(config).unwrap();
    assert!(cache.is_sweeping());
    cache.put("short", cache.entry(1, Expiry::After(Duration::from_millis(30))));
    cache.put("long", cache.entry(2, Expiry::Forever));
    assert!(wait_until(Duration::from_secs(3), || !cache.contains("short")));
    assert!(matches!(cache.get("short"), Err(KeeperError::NotFound(_))));
    assert_eq!(cache.get_contents("long").unwrap(), 2);
    assert!(cache.metrics_snapshot().sweeps >= 1);
    cache.shutdown();
    assert!(!cache.is_sweeping());
}

#[test]
fn wake_triggers_an_early_sweep() {
    let clock = Arc::new(ManualClock::starting_at(0));
    let config = CacheConfig { check_frequency_ms: 600_000, ..Default::default() };
    let cache: ExpiringCache<u32> = ExpiringCache::with_clock(config, clock.clone()).unwrap();
    assert!(!cache.is_sweeping());
    assert!(!cache.wake());
    cache.start().unwrap();
    cache.put("k", cache.entry(1, Expiry::After(Duration::from_millis(10))));
    clock.set(100);
    assert!(cache.wake());
    assert!(wait_until(Duration::from_secs(3), || !cache.contains("k")));
    cache.shutdown();
    assert!(!cache.wake());
    // entries stay usable after shutdown
    cache.put("after", cache.entry(2, Expiry::Forever));
    assert_eq!(cache.get_contents("after").unwrap(), 2);
}

#[test]
fn failing_refresh_does_not_stop_the_sweep() {
    let clock = Arc::new(ManualClock::starting_at(0));
    let cache: ExpiringCache<Quote> =
        ExpiringCache::with_clock(CacheConfig::default(), clock.clone()).unwrap();
    let age = Expiry::After(Duration::from_millis(10));
    cache.put("bad", cache.refreshable_entry(Quote::failing(), age));
    cache.put("good", cache.refreshable_entry(Quote::default(), age));
    cache.put("plain", cache.entry(Quote::default(), age));
    clock.set(15);
    let report = cache.sweep_now();
    assert_eq!(report.evicted, 1);
    assert_eq!(report.refreshed, 1);
    assert_eq!(report.refresh_failures, 1);
    assert!(cache.contains("bad"));
    assert!(cache.get("good").is_ok());
    let snap = cache.metrics_snapshot();
    assert_eq!(snap.sweep_evictions, 1);
    assert_eq!(snap.refresh_failures, 1);
}

#[test]
fn clones_share_entries() {
    let clock = Arc::new(ManualClock::starting_at(0));
    let cache: ExpiringCache<u8> =
        ExpiringCache::with_clock(CacheConfig::default(), clock).unwrap();
    let other = cache.clone();
    other.put("k", other.entry(5, Expiry::Forever));
    assert_eq!(cache.get_contents("k").unwrap(), 5);
}
