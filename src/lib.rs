//! Object recycling and expiring-cache services.
//!
//! [`RecycledInstancePool`] keeps bounded per-class buffers of idle instances
//! and hands them back out after running their recycle hook. [`ExpiringCache`]
//! stores keyed entries that go stale after an age, are evicted by a
//! background sweep, or refresh themselves in place.

pub mod cache;
pub mod config;
pub mod errors;
pub mod logger;
pub mod pool;

pub use cache::{CachedObject, ExpiringCache, Expiry, Refreshable};
pub use config::KeeperConfig;
pub use errors::{HookError, HookResult, KeeperError};
pub use pool::{
    ArgValue, ArrayCtorRecyclable, CtorArgs, FactoryRegistry, InstanceFactory, Poolable,
    RecycleArgs, Recyclable, RecycledInstancePool,
};

/// Initializes logging from `log4rs.yaml` in the working directory.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    logger::init()
}
