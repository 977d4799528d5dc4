#![allow(dead_code)]

use poolkeeper::{
    ArgValue, ArrayCtorRecyclable, CtorArgs, FactoryRegistry, HookResult, Poolable, RecycleArgs,
    Recyclable, Refreshable,
};
use poolkeeper::pool::{Hooks, PoolConfig, RecycledInstancePool};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Recyclable fixture that re-targets itself from (host, port) arguments.
#[derive(Debug)]
pub struct Connection {
    pub id: u64,
    pub host: String,
    pub port: i64,
    pub recycled: u32,
    pub disposed: u32,
    pub fail_recycle: bool,
    pub fail_dispose: bool,
}

impl Connection {
    pub fn new(host: &str, port: i64) -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            host: host.to_string(),
            port,
            recycled: 0,
            disposed: 0,
            fail_recycle: false,
            fail_dispose: false,
        }
    }

    fn apply(&mut self, values: &[ArgValue]) {
        if let Some(host) = values.first().and_then(ArgValue::as_str) {
            self.host = host.to_string();
        }
        if let Some(port) = values.get(1).and_then(ArgValue::as_int) {
            self.port = port;
        }
    }
}

impl Recyclable for Connection {
    fn recycle(&mut self, args: RecycleArgs<'_>) -> HookResult {
        if self.fail_recycle {
            return Err("recycle refused".into());
        }
        if let RecycleArgs::Values(args) = args {
            self.apply(args.values());
        }
        self.recycled += 1;
        Ok(())
    }

    fn dispose(&mut self) -> HookResult {
        if self.fail_dispose {
            return Err("dispose refused".into());
        }
        self.disposed += 1;
        Ok(())
    }
}

impl Poolable for Connection {
    fn class_name(&self) -> &str {
        "Connection"
    }

    fn hooks(&mut self) -> Hooks<'_> {
        Hooks::Recyclable(self)
    }
}

/// Array-constructor fixture.
#[derive(Debug, Default)]
pub struct Scratch {
    pub data: Vec<i64>,
    pub last_arg_count: Option<usize>,
}

impl Recyclable for Scratch {
    fn recycle(&mut self, _args: RecycleArgs<'_>) -> HookResult {
        Err("array constructor expected".into())
    }
}

impl ArrayCtorRecyclable for Scratch {
    fn recycle_array(&mut self, args: &[ArgValue]) -> HookResult {
        self.data.clear();
        self.data.extend(args.iter().filter_map(ArgValue::as_int));
        self.last_arg_count = Some(args.len());
        Ok(())
    }
}

impl Poolable for Scratch {
    fn class_name(&self) -> &str {
        "Scratch"
    }

    fn hooks(&mut self) -> Hooks<'_> {
        Hooks::ArrayCtor(self)
    }
}

/// Plain fixture with no hooks.
#[derive(Debug)]
pub struct Marker(pub u64);

impl Poolable for Marker {
    fn class_name(&self) -> &str {
        "Marker"
    }
}

pub fn registry() -> FactoryRegistry {
    let reg = FactoryRegistry::new();
    reg.register("Connection", |args: Option<&CtorArgs>| {
        let mut c = Connection::new("localhost", 80);
        if let Some(args) = args {
            c.apply(args.values());
        }
        Ok(Box::new(c) as Box<dyn Poolable>)
    });
    reg.register("Scratch", |_| Ok(Box::new(Scratch::default()) as Box<dyn Poolable>));
    reg.register("Marker", |_| Ok(Box::new(Marker(0)) as Box<dyn Poolable>));
    reg
}

pub fn pool(config: PoolConfig) -> RecycledInstancePool {
    RecycledInstancePool::new(config, Arc::new(registry())).unwrap()
}

pub fn pool_with_capacity(capacity: usize) -> RecycledInstancePool {
    pool(PoolConfig { capacity, ..Default::default() })
}

/// Refreshable cache payload counting its refreshes.
#[derive(Debug, Default)]
pub struct Quote {
    pub refreshes: AtomicU32,
    pub fail: AtomicBool,
}

impl Quote {
    pub fn failing() -> Self {
        Self { refreshes: AtomicU32::new(0), fail: AtomicBool::new(true) }
    }

    pub fn refresh_count(&self) -> u32 {
        self.refreshes.load(Ordering::SeqCst)
    }
}

impl Refreshable for Quote {
    fn refresh(&self) -> HookResult {
        if self.fail.load(Ordering::SeqCst) {
            return Err("upstream unavailable".into());
        }
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
