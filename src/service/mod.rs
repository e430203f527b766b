pub mod analytics;
pub mod transaction;

use thiserror::Error;

use crate::db::StoreError;

pub use analytics::{AnalyticsService, BusiestDay, ValueTotals, NO_TRANSACTIONS_DAY};
pub use transaction::TransactionService;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Transaction with the given ID does not exist: {0}")]
    NotFound(i64),

    #[error(transparent)]
    Store(#[from] StoreError),
}
