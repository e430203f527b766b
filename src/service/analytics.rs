//! Per-user analytics, each metric cached on its own

use std::sync::Arc;

use tracing::debug;

use crate::cache::{CacheKey, CacheManager};
use crate::db::RecordStore;
use crate::models::{Analytics, DateRange, TransactionType};
use crate::service::ServiceError;

/// Day label reported for a user without transactions.
pub const NO_TRANSACTIONS_DAY: &str = "None";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusiestDay {
    /// `YYYY-MM-DD`, or [`NO_TRANSACTIONS_DAY`]
    pub day: String,
    pub count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ValueTotals {
    pub credit: f64,
    pub debit: f64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Clone)]
pub struct AnalyticsService {
    records: Arc<dyn RecordStore>,
    cache: CacheManager,
}

impl AnalyticsService {
    pub fn new(records: Arc<dyn RecordStore>, cache: CacheManager) -> Self {
        Self { records, cache }
    }

    /// All metrics for `user_id`; the totals are restricted to `range`.
    pub async fn analytics(&self, user_id: i64, range: &DateRange) -> Result<Analytics, ServiceError> {
        let average = self.average_transaction_value(user_id).await?;
        let busiest = self.busiest_day(user_id).await?;
        let totals = self.value_totals(user_id, range).await?;

        Ok(Analytics {
            average_transaction_value: average,
            day_of_highest_number_of_transactions: busiest.day,
            highest_number_of_transactions_in_a_day: busiest.count,
            total_debit_value: totals.debit,
            total_credit_value: totals.credit,
        })
    }

    pub async fn average_transaction_value(&self, user_id: i64) -> Result<f64, ServiceError> {
        let key = CacheKey::AverageTransactionValue(user_id);
        if let Some(average) = self.cache.get::<f64>(&key).await {
            return Ok(average);
        }

        let average = round2(self.records.average_amount(user_id).await?.unwrap_or(0.0));
        self.cache.insert(&key, &average).await;
        Ok(average)
    }

    pub async fn busiest_day(&self, user_id: i64) -> Result<BusiestDay, ServiceError> {
        let day_key = CacheKey::DayOfHighestNumberOfTransactions(user_id);
        let count_key = CacheKey::HighestNumberOfTransactionsInADay(user_id);

        let cached_day = self.cache.get::<String>(&day_key).await;
        let cached_count = self.cache.get::<i64>(&count_key).await;
        if let (Some(day), Some(count)) = (cached_day, cached_count) {
            return Ok(BusiestDay { day, count });
        }

        let busiest = match self.records.busiest_day(user_id).await? {
            Some(daily) => BusiestDay {
                day: daily.day.format("%Y-%m-%d").to_string(),
                count: daily.count,
            },
            None => BusiestDay {
                day: NO_TRANSACTIONS_DAY.to_string(),
                count: 0,
            },
        };
        debug!("Busiest day for user {}: {:?}", user_id, busiest);

        self.cache.insert(&day_key, &busiest.day).await;
        self.cache.insert(&count_key, &busiest.count).await;
        Ok(busiest)
    }

    pub async fn value_totals(&self, user_id: i64, range: &DateRange) -> Result<ValueTotals, ServiceError> {
        let credit_key = CacheKey::total_value(user_id, TransactionType::Credit, *range);
        let debit_key = CacheKey::total_value(user_id, TransactionType::Debit, *range);

        let cached_credit = self.cache.get::<f64>(&credit_key).await;
        let cached_debit = self.cache.get::<f64>(&debit_key).await;
        if let (Some(credit), Some(debit)) = (cached_credit, cached_debit) {
            return Ok(ValueTotals { credit, debit });
        }

        let mut totals = ValueTotals::default();
        for (kind, total) in self.records.totals_by_type(user_id, range).await? {
            match kind {
                TransactionType::Credit => totals.credit = round2(total),
                TransactionType::Debit => totals.debit = round2(total),
            }
        }

        self.cache.insert(&credit_key, &totals.credit).await;
        self.cache.insert(&debit_key, &totals.debit).await;
        Ok(totals)
    }
}
