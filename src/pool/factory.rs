use crate::errors::{HookError, KeeperError};
use crate::pool::traits::{CtorArgs, Poolable};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Builds new instances when the pool has none to recycle.
pub trait InstanceFactory: Send + Sync {
    fn instantiate(
        &self,
        class_name: &str,
        args: Option<&CtorArgs>,
    ) -> Result<Box<dyn Poolable>, KeeperError>;
}

type Constructor =
    Arc<dyn Fn(Option<&CtorArgs>) -> Result<Box<dyn Poolable>, HookError> + Send + Sync>;

/// Name-to-constructor table. Cheap to clone; clones share registrations.
#[derive(Clone, Default)]
pub struct FactoryRegistry {
    ctors: Arc<RwLock<HashMap<String, Constructor>>>,
}

impl FactoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the constructor for `class_name`.
    pub fn register<F>(&self, class_name: impl Into<String>, ctor: F)
    where
        F: Fn(Option<&CtorArgs>) -> Result<Box<dyn Poolable>, HookError> + Send + Sync + 'static,
    {
        self.ctors.write().insert(class_name.into(), Arc::new(ctor));
    }

    pub fn unregister(&self, class_name: &str) -> bool {
        self.ctors.write().remove(class_name).is_some()
    }

    pub fn contains(&self, class_name: &str) -> bool {
        self.ctors.read().contains_key(class_name)
    }
}

impl InstanceFactory for FactoryRegistry {
    fn instantiate(
        &self,
        class_name: &str,
        args: Option<&CtorArgs>,
    ) -> Result<Box<dyn Poolable>, KeeperError> {
        let ctor = self
            .ctors
            .read()
            .get(class_name)
            .cloned()
            .ok_or_else(|| KeeperError::instantiation(class_name, "no constructor registered"))?;
        let instance = ctor(args).map_err(|e| KeeperError::instantiation(class_name, e))?;
        if instance.class_name() != class_name {
            return Err(KeeperError::instantiation(
                class_name,
                format!("constructor produced '{}'", instance.class_name()),
            ));
        }
        Ok(instance)
    }
}
