//! Typed read-through access to the cache store

use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use super::keys::{CacheKey, Namespace};
use super::CacheStore;

pub const TRANSACTIONS_HISTORY_TTL: Duration = Duration::from_secs(120);
pub const TRANSACTIONS_ANALYTICS_TTL: Duration = Duration::from_secs(300);

/// Expiry applied per key namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    /// Single records and listing pages
    pub history: Duration,
    pub analytics: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            history: TRANSACTIONS_HISTORY_TTL,
            analytics: TRANSACTIONS_ANALYTICS_TTL,
        }
    }
}

impl CacheTtls {
    pub fn for_key(&self, key: &CacheKey) -> Duration {
        match key.namespace() {
            Namespace::Transaction | Namespace::Transactions => self.history,
            Namespace::Analytics => self.analytics,
        }
    }
}

/// Serializes values into the cache store and reads them back.
///
/// A failing cache store is treated like a miss on reads and ignored on
/// writes, so requests degrade to the record store instead of failing.
#[derive(Clone)]
pub struct CacheManager {
    store: Arc<dyn CacheStore>,
    ttls: CacheTtls,
}

impl CacheManager {
    pub fn new(store: Arc<dyn CacheStore>, ttls: CacheTtls) -> Self {
        Self { store, ttls }
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    /// Get a cached value, `None` on miss
    pub async fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let key = key.to_string();
        match self.store.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    debug!("Cache hit for key: {}", key);
                    Some(value)
                }
                Err(e) => {
                    warn!("Discarding unreadable cache entry {}: {}", key, e);
                    None
                }
            },
            Ok(None) => {
                debug!("Cache miss for key: {}", key);
                None
            }
            Err(e) => {
                warn!("Cache read failed for key {}, using record store: {}", key, e);
                None
            }
        }
    }

    /// Store a value under `key` with the TTL of its namespace
    pub async fn insert<T: Serialize + ?Sized>(&self, key: &CacheKey, value: &T) {
        let ttl = self.ttls.for_key(key);
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Could not serialize cache entry {}: {}", key, e);
                return;
            }
        };

        match self.store.set(&key.to_string(), payload, ttl).await {
            Ok(()) => debug!("Cached {} with TTL: {:?}", key, ttl),
            Err(e) => warn!("Cache write failed for key {}: {}", key, e),
        }
    }
}
