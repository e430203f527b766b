use crate::cache::{CacheManager, CacheStore, CacheTtls};
use crate::db::RecordStore;
use crate::service::{AnalyticsService, TransactionService};
use std::sync::Arc;

pub struct AppState {
    pub transactions: TransactionService,
    pub analytics: AnalyticsService,
}

impl AppState {
    /// Wire the services to the given record and cache stores.
    pub fn new(ttls: CacheTtls, records: Arc<dyn RecordStore>, cache: Arc<dyn CacheStore>) -> Self {
        let cache = CacheManager::new(cache, ttls);

        Self {
            transactions: TransactionService::new(records.clone(), cache.clone()),
            analytics: AnalyticsService::new(records, cache),
        }
    }
}
