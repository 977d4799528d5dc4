mod clock;
mod config;
mod core;
mod entry;
mod metrics;
mod policy;
mod size;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CacheConfig;
pub use self::core::ExpiringCache;
pub use entry::{CachedObject, DEFAULT_AGE_MS, Expiry, Refreshable};
pub use metrics::{CacheMetrics, CacheMetricsSnapshot};
pub use policy::SweepReport;
