use crate::cache::{CacheConfig, ExpiringCache};
use crate::errors::KeeperError;
use crate::pool::{InstanceFactory, PoolConfig, RecycledInstancePool};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// Combined settings for both services.
///
/// ```toml
/// [pool]
/// capacity = 128
/// debug = false
/// [pool.capacities]
/// Session = 16
///
/// [cache]
/// check_frequency_ms = 5000
/// initial_capacity = 20
/// default_age_ms = 1800000
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeeperConfig {
    pub pool: PoolConfig,
    pub cache: CacheConfig,
}

impl KeeperConfig {
    /// Parses and validates a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, KeeperError> {
        let cfg: Self = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self, KeeperError> {
        let s = std::fs::read_to_string(path).map_err(|e| {
            KeeperError::Io(format!("failed to read config {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&s)
    }

    /// Loads configuration with precedence: environment > file > defaults.
    ///
    /// The file is `path` if given, else `$POOLKEEPER_CONFIG`, else
    /// `./poolkeeper.toml` when it exists.
    pub fn load(path: Option<&Path>) -> Result<Self, KeeperError> {
        let file = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("POOLKEEPER_CONFIG").ok().map(PathBuf::from))
            .or_else(|| {
                let local = PathBuf::from("poolkeeper.toml");
                local.exists().then_some(local)
            });
        let mut cfg = match file {
            Some(p) => Self::from_file(&p)?,
            None => Self::default(),
        };
        cfg.apply_overrides(|key| std::env::var(key).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Applies `POOLKEEPER_*` overrides looked up through `lookup`.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), KeeperError> {
        if let Some(v) = lookup("POOLKEEPER_POOL_CAPACITY") {
            self.pool.capacity = parse_var("POOLKEEPER_POOL_CAPACITY", &v)?;
        }
        if let Some(v) = lookup("POOLKEEPER_POOL_DEBUG") {
            self.pool.debug = parse_flag("POOLKEEPER_POOL_DEBUG", &v)?;
        }
        if let Some(v) = lookup("POOLKEEPER_CACHE_CHECK_FREQUENCY_MS") {
            self.cache.check_frequency_ms = parse_var("POOLKEEPER_CACHE_CHECK_FREQUENCY_MS", &v)?;
        }
        if let Some(v) = lookup("POOLKEEPER_CACHE_DEFAULT_AGE_MS") {
            self.cache.default_age_ms = parse_var("POOLKEEPER_CACHE_DEFAULT_AGE_MS", &v)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), KeeperError> {
        self.pool.validate()?;
        self.cache.validate()
    }

    pub fn build_pool(
        &self,
        factory: Arc<dyn InstanceFactory>,
    ) -> Result<RecycledInstancePool, KeeperError> {
        RecycledInstancePool::new(self.pool.clone(), factory)
    }

    /// Builds the cache and starts its sweep thread.
    pub fn build_cache<V: Send + Sync + 'static>(&self) -> Result<ExpiringCache<V>, KeeperError> {
        ExpiringCache::new(self.cache.clone())
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T, KeeperError>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| KeeperError::Configuration(format!("{key}={value:?}: {e}")))
}

fn parse_flag(key: &str, value: &str) -> Result<bool, KeeperError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(KeeperError::Configuration(format!("{key}={value:?}: expected a boolean"))),
    }
}
