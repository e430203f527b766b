//! Shared fixtures: in-memory stores and fakes of the store traits

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::{
    cache::{CacheError, CacheManager, CacheStore, CacheTtls, MemoryCacheStore},
    db::{connection, RecordStore, SqliteRecordStore, StoreError, UpdatedTransaction},
    models::{DailyCount, DateRange, NewTransaction, Transaction, TransactionType, TransactionUpdate},
    service::{AnalyticsService, TransactionService},
    validation::parse_timestamp,
};

/// Record store that counts how often it is queried
pub struct CountingRecordStore {
    inner: SqliteRecordStore,
    calls: AtomicUsize,
}

impl CountingRecordStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RecordStore for CountingRecordStore {
    async fn insert(&self, new: &NewTransaction) -> Result<Transaction, StoreError> {
        self.hit();
        self.inner.insert(new).await
    }

    async fn fetch(&self, id: i64) -> Result<Option<Transaction>, StoreError> {
        self.hit();
        self.inner.fetch(id).await
    }

    async fn list(&self, user_id: Option<i64>) -> Result<Vec<Transaction>, StoreError> {
        self.hit();
        self.inner.list(user_id).await
    }

    async fn update(
        &self,
        id: i64,
        changes: &TransactionUpdate,
    ) -> Result<Option<UpdatedTransaction>, StoreError> {
        self.hit();
        self.inner.update(id, changes).await
    }

    async fn delete(&self, id: i64) -> Result<Option<Transaction>, StoreError> {
        self.hit();
        self.inner.delete(id).await
    }

    async fn average_amount(&self, user_id: i64) -> Result<Option<f64>, StoreError> {
        self.hit();
        self.inner.average_amount(user_id).await
    }

    async fn busiest_day(&self, user_id: i64) -> Result<Option<DailyCount>, StoreError> {
        self.hit();
        self.inner.busiest_day(user_id).await
    }

    async fn totals_by_type(
        &self,
        user_id: i64,
        range: &DateRange,
    ) -> Result<Vec<(TransactionType, f64)>, StoreError> {
        self.hit();
        self.inner.totals_by_type(user_id, range).await
    }
}

/// Cache store whose every operation fails, like an unreachable redis
pub struct UnavailableCacheStore;

#[async_trait]
impl CacheStore for UnavailableCacheStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn scan_delete(&self, _pattern: &str) -> Result<u64, CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }
}

pub struct Harness {
    pub records: Arc<CountingRecordStore>,
    pub store: Arc<MemoryCacheStore>,
    pub transactions: TransactionService,
    pub analytics: AnalyticsService,
}

pub async fn sqlite_store() -> SqliteRecordStore {
    let pool = connection::establish_connection("sqlite::memory:", 1)
        .await
        .expect("Failed to open in-memory database");
    SqliteRecordStore::new(pool)
}

/// Services over an in-memory database and an in-process cache
pub async fn setup() -> Harness {
    let records = Arc::new(CountingRecordStore {
        inner: sqlite_store().await,
        calls: AtomicUsize::new(0),
    });
    let store = Arc::new(MemoryCacheStore::new(1_000));
    let cache = CacheManager::new(store.clone(), CacheTtls::default());

    Harness {
        transactions: TransactionService::new(records.clone(), cache.clone()),
        analytics: AnalyticsService::new(records.clone(), cache),
        records,
        store,
    }
}

pub fn new_transaction(
    user_id: i64,
    amount: f64,
    kind: TransactionType,
    date: &str,
) -> NewTransaction {
    NewTransaction {
        user_id,
        full_name: "John Doe".to_string(),
        transaction_date: parse_timestamp(date).expect("valid test timestamp"),
        transaction_amount: amount,
        transaction_type: kind,
    }
}
