use crate::errors::KeeperError;
use crate::pool::buffer::BoundedBuffer;
use crate::pool::config::PoolConfig;
use crate::pool::factory::InstanceFactory;
use crate::pool::metrics::{PoolMetrics, PoolMetricsSnapshot};
use crate::pool::traits::{CtorArgs, Hooks, Poolable, RecycleArgs, downcast};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Idle instances of one class.
struct ClassPool {
    buffer: BoundedBuffer<Box<dyn Poolable>>,
}

impl ClassPool {
    fn new(capacity: NonZeroUsize) -> Self {
        Self { buffer: BoundedBuffer::new(capacity) }
    }
}

type Repository = HashMap<String, Arc<ClassPool>>;

/// Pool of reusable instances keyed by class name.
///
/// The class repository is copy-on-write: structural changes (new class,
/// capacity reset, clear) build a new map and swap it in under `write_lock`,
/// so readers only ever see a complete map. Buffers are shared between map
/// generations by `Arc`. No lock is held while hooks or the factory run.
pub struct RecycledInstancePool {
    repository: RwLock<Arc<Repository>>,
    write_lock: Mutex<()>,
    config: PoolConfig,
    factory: Arc<dyn InstanceFactory>,
    metrics: PoolMetrics,
}

impl RecycledInstancePool {
    pub fn new(config: PoolConfig, factory: Arc<dyn InstanceFactory>) -> Result<Self, KeeperError> {
        config.validate()?;
        if config.debug {
            log::info!(target: "poolkeeper::pool", "pool debugging active");
        }
        Ok(Self {
            repository: RwLock::new(Arc::new(HashMap::new())),
            write_lock: Mutex::new(()),
            config,
            factory,
            metrics: PoolMetrics::default(),
        })
    }

    fn repository(&self) -> Arc<Repository> {
        Arc::clone(&self.repository.read())
    }

    /// Applies `f` to a copy of the repository and publishes the copy.
    fn update<R>(&self, f: impl FnOnce(&mut Repository) -> R) -> R {
        let _w = self.write_lock.lock();
        let mut next = (*self.repository()).clone();
        let out = f(&mut next);
        *self.repository.write() = Arc::new(next);
        out
    }

    fn class_pool(&self, class_name: &str) -> Option<Arc<ClassPool>> {
        self.repository().get(class_name).cloned()
    }

    fn class_pool_or_create(&self, class_name: &str) -> Arc<ClassPool> {
        if let Some(pool) = self.class_pool(class_name) {
            return pool;
        }
        let _w = self.write_lock.lock();
        let current = self.repository();
        if let Some(pool) = current.get(class_name) {
            return Arc::clone(pool);
        }
        let capacity = self.config.capacity_for(class_name);
        let pool = Arc::new(ClassPool::new(capacity));
        let mut next = (*current).clone();
        next.insert(class_name.to_string(), Arc::clone(&pool));
        *self.repository.write() = Arc::new(next);
        log::debug!(target: "poolkeeper::pool", "created pool for {class_name} (capacity {capacity})");
        pool
    }

    fn poll(&self, class_name: &str) -> Option<Box<dyn Poolable>> {
        let pool = self.class_pool(class_name)?;
        if self.config.debug && pool.buffer.size() < pool.buffer.capacity() / 2 {
            log::debug!(
                target: "poolkeeper::pool",
                "{class_name}: size {}, capacity {}",
                pool.buffer.size(),
                pool.buffer.capacity()
            );
            return None;
        }
        pool.buffer.poll()
    }

    fn recycle(
        class_name: &str,
        instance: &mut dyn Poolable,
        args: Option<&CtorArgs>,
    ) -> Result<(), KeeperError> {
        let outcome = match instance.hooks() {
            Hooks::None => Ok(()),
            // raw argument array, no signature resolution
            Hooks::ArrayCtor(hook) => {
                hook.recycle_array(args.map(CtorArgs::values).unwrap_or_default())
            }
            Hooks::Recyclable(hook) => {
                if let Some(args) = args {
                    args.check_signature()
                        .map_err(|reason| KeeperError::recycle(class_name, reason))?;
                }
                let recycle_args = match args {
                    Some(a) if !a.signature().is_empty() => RecycleArgs::Values(a),
                    _ => RecycleArgs::Empty,
                };
                hook.recycle(recycle_args)
            }
        };
        outcome.map_err(|e| KeeperError::recycle(class_name, e))
    }

    /// Takes an instance of `class_name`, recycling a pooled one when available.
    ///
    /// A recycled instance has already left the pool when its recycle hook
    /// runs; if the hook fails the instance is dropped and the error returned.
    /// With nothing pooled, the factory builds a new instance. Never creates a
    /// class pool.
    pub fn acquire(
        &self,
        class_name: &str,
        args: Option<&CtorArgs>,
    ) -> Result<Box<dyn Poolable>, KeeperError> {
        if let Some(mut instance) = self.poll(class_name) {
            if let Err(e) = Self::recycle(class_name, instance.as_mut(), args) {
                PoolMetrics::bump(&self.metrics.recycle_failures);
                log::warn!(target: "poolkeeper::pool", "{e}");
                return Err(e);
            }
            PoolMetrics::bump(&self.metrics.recycled);
            return Ok(instance);
        }
        match self.factory.instantiate(class_name, args) {
            Ok(instance) => {
                PoolMetrics::bump(&self.metrics.constructed);
                Ok(instance)
            }
            Err(e) => {
                PoolMetrics::bump(&self.metrics.instantiation_failures);
                Err(e)
            }
        }
    }

    /// `acquire` followed by a downcast to `T`.
    pub fn acquire_as<T: Poolable>(
        &self,
        class_name: &str,
        args: Option<&CtorArgs>,
    ) -> Result<Box<T>, KeeperError> {
        let instance = self.acquire(class_name, args)?;
        downcast::<T>(instance).map_err(|other| {
            KeeperError::instantiation(
                class_name,
                format!("instance of '{}' is not a {}", other.class_name(), std::any::type_name::<T>()),
            )
        })
    }

    /// Disposes `instance` and buffers it for reuse.
    ///
    /// Returns false when the dispose hook fails or the class buffer is full;
    /// the instance is dropped in both cases.
    pub fn release(&self, mut instance: Box<dyn Poolable>) -> bool {
        let class_name = instance.class_name().to_string();
        let disposed = match instance.hooks() {
            Hooks::None => Ok(()),
            Hooks::Recyclable(hook) => hook.dispose(),
            Hooks::ArrayCtor(hook) => hook.dispose(),
        };
        if let Err(e) = disposed {
            PoolMetrics::bump(&self.metrics.rejected_dispose);
            log::warn!(target: "poolkeeper::pool", "dispose failed for {class_name}: {e}");
            return false;
        }

        let pool = self.class_pool_or_create(&class_name);
        if pool.buffer.offer(instance).is_ok() {
            PoolMetrics::bump(&self.metrics.released);
            true
        } else {
            PoolMetrics::bump(&self.metrics.rejected_full);
            false
        }
    }

    /// Capacity of the live pool, else the configured capacity. Never creates a pool.
    pub fn capacity(&self, class_name: &str) -> usize {
        self.class_pool(class_name)
            .map_or_else(|| self.config.capacity_for(class_name).get(), |p| p.buffer.capacity())
    }

    /// Replaces the class pool with an empty one of `capacity`; 0 means the configured capacity.
    /// Pooled instances are dropped without being disposed.
    pub fn set_capacity(&self, class_name: &str, capacity: usize) {
        let capacity =
            NonZeroUsize::new(capacity).unwrap_or_else(|| self.config.capacity_for(class_name));
        self.update(|repo| {
            repo.insert(class_name.to_string(), Arc::new(ClassPool::new(capacity)));
        });
        log::debug!(target: "poolkeeper::pool", "reset pool for {class_name} to capacity {capacity}");
    }

    /// Number of idle instances of `class_name`.
    pub fn size(&self, class_name: &str) -> usize {
        self.class_pool(class_name).map_or(0, |p| p.buffer.size())
    }

    /// Forgets the pool for `class_name`; the next release recreates it.
    pub fn clear_pool(&self, class_name: &str) {
        if self.class_pool(class_name).is_some() {
            self.update(|repo| {
                repo.remove(class_name);
            });
        }
    }

    /// Forgets every class pool.
    pub fn clear_all(&self) {
        let _w = self.write_lock.lock();
        *self.repository.write() = Arc::new(HashMap::new());
    }

    /// Names of classes with a live pool, sorted.
    pub fn class_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.repository().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn has_pool(&self, class_name: &str) -> bool {
        self.class_pool(class_name).is_some()
    }

    pub fn metrics_snapshot(&self) -> PoolMetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }
}
