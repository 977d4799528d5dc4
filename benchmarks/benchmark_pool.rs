// Run with: cargo run --release --bin benchmark_pool
// Results saved to benchmarks/results/benchmark_pool_{datetime}.csv

use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use poolkeeper::cache::CacheConfig;
use poolkeeper::pool::PoolConfig;
use poolkeeper::{
    ArgValue, CtorArgs, ExpiringCache, Expiry, FactoryRegistry, HookResult, Poolable,
    RecycleArgs, Recyclable, RecycledInstancePool,
};

struct Frame {
    payload: Vec<u8>,
}

impl Recyclable for Frame {
    fn recycle(&mut self, args: RecycleArgs<'_>) -> HookResult {
        if let RecycleArgs::Values(args) = args {
            let len = args.values().first().and_then(ArgValue::as_int).unwrap_or(0);
            self.payload.resize(usize::try_from(len).unwrap_or(0), 0);
        }
        Ok(())
    }

    fn dispose(&mut self) -> HookResult {
        self.payload.clear();
        Ok(())
    }
}

impl Poolable for Frame {
    fn class_name(&self) -> &str {
        "Frame"
    }

    fn hooks(&mut self) -> poolkeeper::pool::Hooks<'_> {
        poolkeeper::pool::Hooks::Recyclable(self)
    }
}

fn frame_len(args: Option<&CtorArgs>) -> usize {
    args.and_then(|a| a.values().first())
        .and_then(ArgValue::as_int)
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let n = 200_000usize;
    let registry = FactoryRegistry::new();
    registry.register("Frame", |args: Option<&CtorArgs>| {
        Ok(Box::new(Frame { payload: vec![0; frame_len(args)] }) as Box<dyn Poolable>)
    });
    let args: CtorArgs = [4096i64].into_iter().collect();

    // Recycled path: one instance bounces through the pool
    let pool = RecycledInstancePool::new(PoolConfig::default(), Arc::new(registry.clone()))?;
    let start = Instant::now();
    for _ in 0..n {
        let f = pool.acquire("Frame", Some(&args))?;
        pool.release(f);
    }
    let recycled_ns = start.elapsed().as_nanos();

    // Constructed path: nothing is ever released, so every acquire builds
    let cold_pool = RecycledInstancePool::new(
        PoolConfig::default(),
        Arc::new(registry),
    )?;
    let start = Instant::now();
    for _ in 0..n {
        let f = cold_pool.acquire("Frame", Some(&args))?;
        drop(f);
    }
    let constructed_ns = start.elapsed().as_nanos();

    // Cache reads on fresh entries
    let cache: ExpiringCache<u64> =
        ExpiringCache::new(CacheConfig { check_frequency_ms: 1_000, ..Default::default() })?;
    for i in 0..1_000u64 {
        cache.put(format!("k{i}"), cache.entry(i, Expiry::After(Duration::from_secs(600))));
    }
    let start = Instant::now();
    for i in 0..n {
        let _ = cache.get(&format!("k{}", i % 1_000))?;
    }
    let cache_get_ns = start.elapsed().as_nanos();
    cache.shutdown();

    let mut root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    root.push("benchmarks/results");
    create_dir_all(&root)?;
    let datetime = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let mut f = File::create(root.join(format!("benchmark_pool_{datetime}.csv")))?;
    writeln!(f, "operation,iterations,total_ns")?;
    writeln!(f, "acquire_release_recycled,{n},{recycled_ns}")?;
    writeln!(f, "acquire_constructed,{n},{constructed_ns}")?;
    writeln!(f, "cache_get,{n},{cache_get_ns}")?;
    println!("recycled={recycled_ns}ns constructed={constructed_ns}ns cache_get={cache_get_ns}ns");
    Ok(())
}
