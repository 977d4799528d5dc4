use crate::cache::clock::{Clock, SystemClock};
use crate::errors::HookResult;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::Duration;

/// Default entry age when `Expiry::Default` is used outside a configured cache (30 minutes).
pub const DEFAULT_AGE_MS: u64 = 1_800_000;

// Internal sentinel for "forever"/"never" in the atomic millisecond fields.
const NEVER: i64 = -1;

/// How long an entry stays fresh after its creation time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expiry {
    /// Use the configured default age.
    Default,
    /// Never goes stale.
    Forever,
    After(Duration),
}

impl Expiry {
    pub(crate) fn resolve_millis(self, default_age_ms: u64) -> i64 {
        match self {
            Expiry::Default => clamp_millis(u128::from(default_age_ms)),
            Expiry::Forever => NEVER,
            Expiry::After(d) => clamp_millis(d.as_millis()),
        }
    }
}

#[inline]
fn clamp_millis(ms: u128) -> i64 {
    i64::try_from(ms).unwrap_or(i64::MAX)
}

#[inline]
fn millis_to_duration(ms: i64) -> Option<Duration> {
    u64::try_from(ms).ok().map(Duration::from_millis)
}

/// Payloads that can renew themselves in place instead of being evicted.
///
/// `refresh` may be invoked from a reader thread or from the sweep thread;
/// the cache serializes calls per entry.
pub trait Refreshable: Send + Sync {
    fn refresh(&self) -> HookResult;
}

struct RefreshState<V> {
    refresher: fn(&V) -> HookResult,
    ttl_ms: AtomicI64,
    last_access_ms: AtomicI64,
    lock: Mutex<()>,
}

impl<V> fmt::Debug for RefreshState<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshState")
            .field("ttl_ms", &self.ttl_ms.load(Ordering::Relaxed))
            .field("last_access_ms", &self.last_access_ms.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

/// A cache payload plus its timing metadata.
///
/// Timestamps are wall-clock milliseconds. The stale flag caches the result of
/// the last staleness evaluation; `is_stale_at` recomputes it.
#[derive(Debug)]
pub struct CachedObject<V> {
    contents: V,
    created_ms: AtomicI64,
    expires_ms: AtomicI64,
    stale: AtomicBool,
    refresh: Option<RefreshState<V>>,
}

impl<V> CachedObject<V> {
    /// A plain entry stamped with the system clock.
    pub fn new(contents: V, expiry: Expiry) -> Self {
        Self::build(contents, expiry, DEFAULT_AGE_MS, SystemClock.now_millis(), None)
    }

    pub(crate) fn build(
        contents: V,
        expiry: Expiry,
        default_age_ms: u64,
        now: i64,
        refresher: Option<fn(&V) -> HookResult>,
    ) -> Self {
        let refresh = refresher.map(|refresher| RefreshState {
            refresher,
            ttl_ms: AtomicI64::new(NEVER),
            last_access_ms: AtomicI64::new(now),
            lock: Mutex::new(()),
        });
        Self {
            contents,
            created_ms: AtomicI64::new(now),
            expires_ms: AtomicI64::new(expiry.resolve_millis(default_age_ms)),
            stale: AtomicBool::new(false),
            refresh,
        }
    }

    /// Overrides the creation (and, for refreshable entries, last access) time.
    #[must_use]
    pub fn created_at(self, millis: i64) -> Self {
        self.created_ms.store(millis, Ordering::SeqCst);
        if let Some(r) = &self.refresh {
            r.last_access_ms.store(millis, Ordering::SeqCst);
        }
        self
    }

    /// Sets the untouched time-to-live. `None` means never. Ignored for plain entries.
    #[must_use]
    pub fn with_ttl(self, ttl: Option<Duration>) -> Self {
        self.set_ttl(ttl);
        self
    }

    pub fn contents(&self) -> &V {
        &self.contents
    }

    pub fn created_millis(&self) -> i64 {
        self.created_ms.load(Ordering::SeqCst)
    }

    /// `None` for entries that never expire.
    pub fn expires(&self) -> Option<Duration> {
        millis_to_duration(self.expires_ms.load(Ordering::SeqCst))
    }

    pub(crate) fn expires_millis(&self) -> Option<i64> {
        let ms = self.expires_ms.load(Ordering::SeqCst);
        (ms != NEVER).then_some(ms)
    }

    pub fn set_expires(&self, expiry: Expiry) {
        let ms = expiry.resolve_millis(DEFAULT_AGE_MS);
        self.expires_ms.store(ms, Ordering::SeqCst);
        if ms == NEVER {
            self.stale.store(false, Ordering::SeqCst);
        }
    }

    /// Last computed staleness, without consulting the clock.
    pub fn stale(&self) -> bool {
        self.stale.load(Ordering::SeqCst)
    }

    /// Recomputes staleness against `now`.
    pub fn is_stale_at(&self, now: i64) -> bool {
        let Some(expires) = self.expires_millis() else {
            return false;
        };
        let stale = now.saturating_sub(self.created_millis()) > expires;
        self.stale.store(stale, Ordering::SeqCst);
        stale
    }

    pub fn is_refreshable(&self) -> bool {
        self.refresh.is_some()
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.refresh.as_ref().and_then(|r| millis_to_duration(r.ttl_ms.load(Ordering::SeqCst)))
    }

    pub fn set_ttl(&self, ttl: Option<Duration>) {
        if let Some(r) = &self.refresh {
            let ms = ttl.map_or(NEVER, |d| clamp_millis(d.as_millis()));
            r.ttl_ms.store(ms, Ordering::SeqCst);
        }
    }

    /// `None` for plain entries.
    pub fn last_access_millis(&self) -> Option<i64> {
        self.refresh.as_ref().map(|r| r.last_access_ms.load(Ordering::SeqCst))
    }

    /// Records a read. No-op for plain entries.
    pub fn touch_at(&self, now: i64) {
        if let Some(r) = &self.refresh {
            r.last_access_ms.store(now, Ordering::SeqCst);
        }
    }

    /// A refreshable entry not read within its time-to-live.
    pub fn is_untouched_at(&self, now: i64) -> bool {
        let Some(r) = &self.refresh else {
            return false;
        };
        let ttl = r.ttl_ms.load(Ordering::SeqCst);
        if ttl == NEVER {
            return false;
        }
        now.saturating_sub(r.last_access_ms.load(Ordering::SeqCst)) > ttl
    }

    /// Refreshes the payload and pushes the creation time forward by one expiry period.
    ///
    /// Returns `Ok(false)` when there was nothing to do: plain entry, forever
    /// entry, or another thread already refreshed it past `now`.
    pub fn refresh_at(&self, now: i64) -> Result<bool, crate::errors::HookError> {
        let Some(r) = &self.refresh else {
            return Ok(false);
        };
        let Some(expires) = self.expires_millis() else {
            return Ok(false);
        };
        let _guard = r.lock.lock();
        if !self.is_stale_at(now) {
            return Ok(false);
        }
        (r.refresher)(&self.contents)?;
        self.created_ms.fetch_add(expires, Ordering::SeqCst);
        self.is_stale_at(now);
        Ok(true)
    }
}

impl<V: Refreshable> CachedObject<V> {
    /// A refreshable entry stamped with the system clock. Time-to-live defaults to never.
    pub fn refreshable(contents: V, expiry: Expiry) -> Self {
        Self::build(
            contents,
            expiry,
            DEFAULT_AGE_MS,
            SystemClock.now_millis(),
            Some(<V as Refreshable>::refresh as fn(&V) -> HookResult),
        )
    }
}
