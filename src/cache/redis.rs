//! Redis cache store implementation

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tokio::time::timeout;
use tracing::debug;

use super::{CacheError, CacheStore};

// Keys requested per SCAN round trip, also the DEL batch size
const SCAN_BATCH: usize = 500;

/// Cache store on a shared multiplexed redis connection
#[derive(Clone)]
pub struct RedisCacheStore {
    connection: MultiplexedConnection,
    command_timeout: Duration,
}

impl RedisCacheStore {
    pub async fn connect(url: &str, command_timeout: Duration) -> Result<Self, CacheError> {
        let client = redis::Client::open(url)?;
        let connection = timeout(command_timeout, client.get_multiplexed_async_connection()).await??;

        Ok(Self {
            connection,
            command_timeout,
        })
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection.clone();
        let value: Option<String> = timeout(self.command_timeout, conn.get(key)).await??;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.connection.clone();
        // SET EX rejects a zero expiry
        let seconds = ttl.as_secs().max(1);
        timeout(self.command_timeout, conn.set_ex::<_, _, ()>(key, value, seconds)).await??;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.connection.clone();
        timeout(self.command_timeout, conn.del::<_, ()>(key)).await??;
        Ok(())
    }

    async fn scan_delete(&self, pattern: &str) -> Result<u64, CacheError> {
        let mut conn = self.connection.clone();
        let mut cursor: u64 = 0;
        let mut keys: Vec<String> = Vec::new();

        loop {
            let (next, batch): (u64, Vec<String>) = timeout(
                self.command_timeout,
                redis::cmd("SCAN")
                    .arg(cursor)
                    .arg("MATCH")
                    .arg(pattern)
                    .arg("COUNT")
                    .arg(SCAN_BATCH)
                    .query_async(&mut conn),
            )
            .await??;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        // SCAN may report a key more than once
        keys.sort_unstable();
        keys.dedup();

        let mut deleted = 0;
        for chunk in keys.chunks(SCAN_BATCH) {
            let removed: u64 = timeout(self.command_timeout, conn.del(chunk.to_vec())).await??;
            deleted += removed;
        }

        debug!("Deleted {} keys matching {}", deleted, pattern);
        Ok(deleted)
    }
}
