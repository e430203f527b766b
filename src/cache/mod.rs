pub mod invalidation;
pub mod keys;
pub mod manager;
pub mod memory;
pub mod redis;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::config::{redact_url, Config};

pub use keys::{CacheKey, Namespace};
pub use manager::{CacheManager, CacheTtls};
pub use memory::MemoryCacheStore;
pub use self::redis::RedisCacheStore;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] ::redis::RedisError),

    #[error("Cache operation timed out")]
    Timeout,

    #[error("Cache unavailable: {0}")]
    Unavailable(String),
}

impl From<tokio::time::error::Elapsed> for CacheError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        CacheError::Timeout
    }
}

/// Key-value store with per-key expiration.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Delete every key matching `pattern` (an exact key or a prefix ending in `*`).
    /// Returns how many keys were removed.
    async fn scan_delete(&self, pattern: &str) -> Result<u64, CacheError>;
}

/// Build the cache store selected by the configuration.
pub async fn init_cache(config: &Config) -> Result<Arc<dyn CacheStore>, CacheError> {
    match &config.redis_url {
        Some(url) => {
            let store = RedisCacheStore::connect(url, config.redis_timeout).await?;
            info!("Cache backed by redis at {}", redact_url(url));
            Ok(Arc::new(store))
        }
        None => {
            info!(
                "Cache backed by in-process store with capacity {}",
                config.cache_max_capacity
            );
            Ok(Arc::new(MemoryCacheStore::new(config.cache_max_capacity)))
        }
    }
}
