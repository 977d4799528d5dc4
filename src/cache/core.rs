use crate::cache::clock::{Clock, SystemClock};
use crate::cache::config::CacheConfig;
use crate::cache::entry::{CachedObject, Expiry, Refreshable};
use crate::cache::metrics::{CacheMetrics, CacheMetricsSnapshot};
use crate::cache::policy::{EntryMap, SweepReport, sweep};
use crate::cache::size::serialized_size;
use crate::errors::{HookResult, KeeperError};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};

enum SweepSignal {
    Wake,
    Stop,
}

/// Owns the background sweep thread; stops and joins it when dropped.
#[derive(Default)]
struct Sweeper {
    tx: Mutex<Option<Sender<SweepSignal>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Sweeper {
    fn is_running(&self) -> bool {
        self.tx.lock().is_some()
    }

    fn wake(&self) -> bool {
        self.tx.lock().as_ref().is_some_and(|tx| tx.send(SweepSignal::Wake).is_ok())
    }

    fn stop(&self) {
        if let Some(tx) = self.tx.lock().take() {
            let _ = tx.send(SweepSignal::Stop);
        }
        if let Some(handle) = self.handle.lock().take() {
            if handle.thread().id() != thread::current().id() && handle.join().is_err() {
                log::error!(target: "poolkeeper::cache", "sweep thread panicked");
            }
        }
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.stop();
    }
}

/// A thread-safe key/value cache whose entries expire, or refresh themselves in place.
///
/// Clones share the same entries and sweep thread. The thread stops on
/// `shutdown` or when the last clone is dropped.
pub struct ExpiringCache<V> {
    store: Arc<RwLock<EntryMap<V>>>,
    config: Arc<CacheConfig>,
    clock: Arc<dyn Clock>,
    metrics: Arc<CacheMetrics>,
    sweeper: Arc<Sweeper>,
}

impl<V> Clone for ExpiringCache<V> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: Arc::clone(&self.config),
            clock: Arc::clone(&self.clock),
            metrics: Arc::clone(&self.metrics),
            sweeper: Arc::clone(&self.sweeper),
        }
    }
}

impl<V: Send + Sync + 'static> ExpiringCache<V> {
    /// Creates a cache on the system clock and starts its sweep thread.
    pub fn new(config: CacheConfig) -> Result<Self, KeeperError> {
        let cache = Self::with_clock(config, Arc::new(SystemClock))?;
        cache.start()?;
        Ok(cache)
    }

    /// Creates a cache on the given clock. The sweep thread is not started; call `start`.
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Result<Self, KeeperError> {
        config.validate()?;
        Ok(Self {
            store: Arc::new(RwLock::new(HashMap::with_capacity(config.initial_capacity))),
            config: Arc::new(config),
            clock,
            metrics: Arc::new(CacheMetrics::default()),
            sweeper: Arc::new(Sweeper::default()),
        })
    }

    /// Spawns the sweep thread. Calling it on a running cache does nothing.
    pub fn start(&self) -> Result<(), KeeperError> {
        let mut tx_slot = self.sweeper.tx.lock();
        if tx_slot.is_some() {
            return Ok(());
        }
        let (tx, rx) = mpsc::channel::<SweepSignal>();
        let store = Arc::clone(&self.store);
        let clock = Arc::clone(&self.clock);
        let metrics = Arc::clone(&self.metrics);
        let interval = self.config.check_frequency();

        let handle = thread::Builder::new()
            .name("poolkeeper-cache-sweep".into())
            .spawn(move || {
                log::info!(target: "poolkeeper::cache", "sweep thread started, interval {interval:?}");
                loop {
                    match rx.recv_timeout(interval) {
                        Ok(SweepSignal::Stop) | Err(RecvTimeoutError::Disconnected) => break,
                        // A wake-up is an early tick, never an error
                        Ok(SweepSignal::Wake) | Err(RecvTimeoutError::Timeout) => {}
                    }
                    sweep(&store, clock.as_ref(), &metrics);
                    if log::log_enabled!(target: "poolkeeper::metrics", log::Level::Debug) {
                        match serde_json::to_string(&metrics.snapshot()) {
                            Ok(line) => log::debug!(target: "poolkeeper::metrics", "{line}"),
                            Err(e) => log::warn!(target: "poolkeeper::metrics", "snapshot: {e}"),
                        }
                    }
                }
                log::info!(target: "poolkeeper::cache", "sweep thread stopped");
            })?;

        *tx_slot = Some(tx);
        *self.sweeper.handle.lock() = Some(handle);
        Ok(())
    }

    /// Stops and joins the sweep thread. Entries stay readable.
    pub fn shutdown(&self) {
        self.sweeper.stop();
    }

    pub fn is_sweeping(&self) -> bool {
        self.sweeper.is_running()
    }

    /// Cuts the current sweep sleep short. Returns false when no sweep thread is running.
    pub fn wake(&self) -> bool {
        self.sweeper.wake()
    }

    /// Runs one sweep pass on the calling thread.
    pub fn sweep_now(&self) -> SweepReport {
        sweep(&self.store, self.clock.as_ref(), &self.metrics)
    }
}

impl<V> ExpiringCache<V> {
    /// A plain entry stamped with this cache's clock and default age.
    pub fn entry(&self, contents: V, expiry: Expiry) -> CachedObject<V> {
        CachedObject::build(
            contents,
            expiry,
            self.config.default_age_ms,
            self.clock.now_millis(),
            None,
        )
    }

    /// A refreshable entry stamped with this cache's clock and default age.
    pub fn refreshable_entry(&self, contents: V, expiry: Expiry) -> CachedObject<V>
    where
        V: Refreshable,
    {
        CachedObject::build(
            contents,
            expiry,
            self.config.default_age_ms,
            self.clock.now_millis(),
            Some(<V as Refreshable>::refresh as fn(&V) -> HookResult),
        )
    }

    /// Inserts `entry` under `key`, replacing any previous entry.
    pub fn put(&self, key: impl Into<String>, entry: CachedObject<V>) {
        let key = key.into();
        let entry = Arc::new(entry);
        {
            let mut map = self.store.write();
            map.remove(&key);
            map.insert(key, entry);
        }
        CacheMetrics::bump(&self.metrics.puts);
    }

    /// Looks up `key`, refreshing a stale refreshable entry on the way.
    ///
    /// Fails with `NotFound` when absent and `Expired` when stale, untouched past
    /// its time-to-live, or still stale after a refresh. Stale entries are left
    /// in place for the sweep to remove.
    pub fn get(&self, key: &str) -> Result<Arc<CachedObject<V>>, KeeperError> {
        let found = self.store.read().get(key).cloned();
        let Some(entry) = found else {
            CacheMetrics::bump(&self.metrics.misses);
            return Err(KeeperError::NotFound(key.to_string()));
        };

        let now = self.clock.now_millis();
        if entry.is_stale_at(now) {
            if !entry.is_refreshable() || entry.is_untouched_at(now) {
                return Err(self.expired(key));
            }
            match entry.refresh_at(now) {
                Ok(true) => CacheMetrics::bump(&self.metrics.refreshes),
                Ok(false) => {}
                Err(e) => {
                    CacheMetrics::bump(&self.metrics.refresh_failures);
                    log::warn!(target: "poolkeeper::cache", "refresh of '{key}' on read failed: {e}");
                }
            }
            if entry.is_stale_at(now) {
                return Err(self.expired(key));
            }
        }

        entry.touch_at(now);
        CacheMetrics::bump(&self.metrics.hits);
        Ok(entry)
    }

    fn expired(&self, key: &str) -> KeeperError {
        CacheMetrics::bump(&self.metrics.expired_reads);
        KeeperError::Expired(key.to_string())
    }

    /// Like `get`, returning a clone of the payload.
    pub fn get_contents(&self, key: &str) -> Result<V, KeeperError>
    where
        V: Clone,
    {
        self.get(key).map(|e| e.contents().clone())
    }

    /// Deletes `key`. Removing an absent key is a no-op.
    pub fn remove(&self, key: &str) -> Option<Arc<CachedObject<V>>> {
        let removed = self.store.write().remove(key);
        if removed.is_some() {
            CacheMetrics::bump(&self.metrics.removes);
        }
        removed
    }

    /// Drops every entry.
    pub fn flush(&self) {
        self.store.write().clear();
        CacheMetrics::bump(&self.metrics.flushes);
        log::info!(target: "poolkeeper::cache", "cache flushed");
    }

    pub fn contains(&self, key: &str) -> bool {
        self.store.read().contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.store.read().keys().cloned().collect()
    }

    /// Number of entries, stale ones included.
    pub fn size(&self) -> usize {
        self.store.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.read().is_empty()
    }

    /// Serialized size of the whole cache in bytes. O(total payload size).
    pub fn byte_size(&self) -> Result<usize, KeeperError>
    where
        V: Serialize,
    {
        serialized_size(&self.store.read())
    }

    pub fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }
}
