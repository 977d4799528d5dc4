use crate::integration_tests::_support::Quote;
use poolkeeper::cache::{CacheConfig, ManualClock};
use poolkeeper::{ExpiringCache, Expiry};
use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

    #[test]
    fn prop_plain_entry_fresh_iff_age_within_expiry(expires in 1u64..10_000, elapsed in 0i64..20_000) {
        let clock = Arc::new(ManualClock::starting_at(0));
        let cache: ExpiringCache<u8> = ExpiringCache::with_clock(CacheConfig::default(), clock.clone()).unwrap();
        cache.put("k", cache.entry(1, Expiry::After(Duration::from_millis(expires))));
        clock.set(elapsed);
        prop_assert_eq!(cache.get("k").is_ok(), elapsed <= expires as i64);
        prop_assert!(cache.contains("k"));
    }

    #[test]
    fn prop_refresh_advances_by_one_period(expires in 1i64..5_000, frac in 1i64..100) {
        let clock = Arc::new(ManualClock::starting_at(0));
        let cache: ExpiringCache<Quote> = ExpiringCache::with_clock(CacheConfig::default(), clock.clone()).unwrap();
        cache.put("q", cache.refreshable_entry(Quote::default(), Expiry::After(Duration::from_millis(expires as u64))));
        // strictly stale, but within two periods
        let now = expires + 1 + (expires - 1) * frac / 100;
        clock.set(now);
        let entry = cache.get("q").unwrap();
        prop_assert_eq!(entry.created_millis(), expires);
        prop_assert_eq!(entry.contents().refresh_count(), 1);
    }
}
