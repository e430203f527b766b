pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod models;
pub mod service;
pub mod state;
pub mod validation;

#[cfg(test)]
pub mod tests;

// Re-export specific items for convenience
pub use api::error::ApiError;
pub use api::route::create_router;
pub use cache::{CacheKey, CacheManager, CacheStore, MemoryCacheStore, RedisCacheStore};
pub use db::{RecordStore, SqliteRecordStore, StoreError};
pub use models::{Analytics, DateRange, NewTransaction, Transaction, TransactionType, TransactionUpdate};
pub use service::{AnalyticsService, ServiceError, TransactionService};
pub use state::AppState;
