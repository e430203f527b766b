pub mod connection;
pub mod migration;
pub mod transaction;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{DailyCount, DateRange, NewTransaction, Transaction, TransactionType, TransactionUpdate};

pub use transaction::SqliteRecordStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt row: {0}")]
    Decode(String),
}

/// A transaction before and after an in-place update.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdatedTransaction {
    pub previous: Transaction,
    pub current: Transaction,
}

/// Query surface of the authoritative transaction store.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert(&self, new: &NewTransaction) -> Result<Transaction, StoreError>;

    async fn fetch(&self, id: i64) -> Result<Option<Transaction>, StoreError>;

    /// All transactions, restricted to one owner when `user_id` is set.
    async fn list(&self, user_id: Option<i64>) -> Result<Vec<Transaction>, StoreError>;

    /// Returns `None` when no transaction has this id.
    async fn update(
        &self,
        id: i64,
        changes: &TransactionUpdate,
    ) -> Result<Option<UpdatedTransaction>, StoreError>;

    /// Returns the removed row, or `None` when no transaction has this id.
    async fn delete(&self, id: i64) -> Result<Option<Transaction>, StoreError>;

    /// Mean amount over all of the user's transactions, `None` when there are none.
    async fn average_amount(&self, user_id: i64) -> Result<Option<f64>, StoreError>;

    /// The calendar day with the most transactions, latest day winning ties.
    async fn busiest_day(&self, user_id: i64) -> Result<Option<DailyCount>, StoreError>;

    /// Sum of amounts per type within the inclusive range. Types without rows are omitted.
    async fn totals_by_type(
        &self,
        user_id: i64,
        range: &DateRange,
    ) -> Result<Vec<(TransactionType, f64)>, StoreError>;
}
