//! Read-through access to transactions and write-around mutations

use std::sync::Arc;

use tracing::info;

use crate::cache::{CacheKey, CacheManager};
use crate::db::RecordStore;
use crate::models::{NewTransaction, Transaction, TransactionUpdate};
use crate::service::ServiceError;

#[derive(Clone)]
pub struct TransactionService {
    records: Arc<dyn RecordStore>,
    cache: CacheManager,
}

impl TransactionService {
    pub fn new(records: Arc<dyn RecordStore>, cache: CacheManager) -> Self {
        Self { records, cache }
    }

    /// Insert a transaction. Cached listings and analytics are left to expire.
    pub async fn create(&self, new: &NewTransaction) -> Result<Transaction, ServiceError> {
        let transaction = self.records.insert(new).await?;
        info!(
            "Created transaction {} for user {}",
            transaction.id, transaction.user_id
        );
        Ok(transaction)
    }

    /// One page of transactions, for `user_id` or for everybody.
    ///
    /// `page` only partitions the cache: every page holds the full result set.
    pub async fn get_list(
        &self,
        user_id: Option<i64>,
        page: i64,
    ) -> Result<Vec<Transaction>, ServiceError> {
        let key = CacheKey::transaction_list(user_id, page);
        if let Some(transactions) = self.cache.get::<Vec<Transaction>>(&key).await {
            return Ok(transactions);
        }

        let transactions = self.records.list(user_id).await?;
        self.cache.insert(&key, &transactions).await;
        Ok(transactions)
    }

    /// A transaction by id. Misses on unknown ids are not cached.
    pub async fn get_one(&self, id: i64) -> Result<Option<Transaction>, ServiceError> {
        let key = CacheKey::transaction(id);
        if let Some(transaction) = self.cache.get::<Transaction>(&key).await {
            return Ok(Some(transaction));
        }

        let transaction = self.records.fetch(id).await?;
        if let Some(transaction) = &transaction {
            self.cache.insert(&key, transaction).await;
        }
        Ok(transaction)
    }

    pub async fn update(
        &self,
        id: i64,
        changes: &TransactionUpdate,
    ) -> Result<Transaction, ServiceError> {
        let updated = self
            .records
            .update(id, changes)
            .await?
            .ok_or(ServiceError::NotFound(id))?;

        self.cache
            .invalidate_transaction(id, &[updated.previous.user_id, updated.current.user_id])
            .await;
        info!("Updated transaction {}", id);

        Ok(updated.current)
    }

    pub async fn delete(&self, id: i64) -> Result<Transaction, ServiceError> {
        let removed = self
            .records
            .delete(id)
            .await?
            .ok_or(ServiceError::NotFound(id))?;

        self.cache.invalidate_transaction(id, &[removed.user_id]).await;
        info!("Deleted transaction {}", id);

        Ok(removed)
    }
}
