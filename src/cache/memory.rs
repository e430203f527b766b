//! In-process cache store implementation using Moka

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use tracing::debug;

use super::keys::matches_pattern;
use super::{CacheError, CacheStore};

#[derive(Clone)]
struct CachedValue {
    payload: Arc<str>,
    ttl: Duration,
}

/// Expires every entry after the TTL it was written with.
struct PerEntryTtl;

impl Expiry<String, CachedValue> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, value: &CachedValue, _created_at: Instant) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Bounded in-process cache store with per-key TTL
#[derive(Clone)]
pub struct MemoryCacheStore {
    cache: Cache<String, CachedValue>,
}

impl MemoryCacheStore {
    pub fn new(capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(capacity)
            .expire_after(PerEntryTtl)
            .build();

        Self { cache }
    }

    /// Keys currently held that match `pattern`
    pub fn keys_matching(&self, pattern: &str) -> Vec<String> {
        self.cache
            .iter()
            .filter(|(key, _)| matches_pattern(pattern, key))
            .map(|(key, _)| key.as_ref().clone())
            .collect()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.cache.get(key).await.map(|value| value.payload.to_string()))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let value = CachedValue {
            payload: Arc::from(value),
            ttl,
        };
        self.cache.insert(key.to_string(), value).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.cache.invalidate(key).await;
        Ok(())
    }

    async fn scan_delete(&self, pattern: &str) -> Result<u64, CacheError> {
        let keys = self.keys_matching(pattern);
        for key in &keys {
            self.cache.invalidate(key.as_str()).await;
        }

        debug!("Deleted {} keys matching {}", keys.len(), pattern);
        Ok(keys.len() as u64)
    }
}
