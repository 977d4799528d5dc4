mod buffer;
mod config;
mod core;
mod factory;
mod metrics;
mod traits;

pub use buffer::BoundedBuffer;
pub use config::{DEFAULT_POOL_CAPACITY, PoolConfig};
pub use factory::{FactoryRegistry, InstanceFactory};
pub use metrics::{PoolMetrics, PoolMetricsSnapshot};
pub use self::core::RecycledInstancePool;
pub use traits::{
    ArgValue, ArrayCtorRecyclable, AsAny, CtorArgs, Hooks, Poolable, RecycleArgs, Recyclable,
    downcast,
};
