use async_trait::async_trait;
use chrono::{NaiveDate, SubsecRound};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::debug;

use crate::db::{RecordStore, StoreError, UpdatedTransaction};
use crate::models::{DailyCount, DateRange, NewTransaction, Transaction, TransactionType, TransactionUpdate};

// Dates are stored at millisecond precision, the resolution of date() and julianday()
const COLUMNS: &str =
    "id, user_id, full_name, transaction_date, transaction_amount, transaction_type";

/// SQLite-backed record store.
#[derive(Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn transaction_from_row(row: &SqliteRow) -> Result<Transaction, StoreError> {
    let kind: String = row.try_get("transaction_type")?;
    let transaction_type = kind
        .parse::<TransactionType>()
        .map_err(|e| StoreError::Decode(e.to_string()))?;

    Ok(Transaction {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        full_name: row.try_get("full_name")?,
        transaction_date: row.try_get("transaction_date")?,
        transaction_amount: row.try_get("transaction_amount")?,
        transaction_type,
    })
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn insert(&self, new: &NewTransaction) -> Result<Transaction, StoreError> {
        let row = sqlx::query(&format!(
            "INSERT INTO transactions
             (user_id, full_name, transaction_date, transaction_amount, transaction_type)
             VALUES (?, ?, ?, ?, ?)
             RETURNING {COLUMNS}"
        ))
        .bind(new.user_id)
        .bind(&new.full_name)
        .bind(new.transaction_date.trunc_subsecs(3))
        .bind(new.transaction_amount)
        .bind(new.transaction_type.as_str())
        .fetch_one(&self.pool)
        .await?;

        transaction_from_row(&row)
    }

    async fn fetch(&self, id: i64) -> Result<Option<Transaction>, StoreError> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM transactions WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(transaction_from_row).transpose()
    }

    async fn list(&self, user_id: Option<i64>) -> Result<Vec<Transaction>, StoreError> {
        let rows = match user_id {
            Some(user_id) => {
                sqlx::query(&format!(
                    "SELECT {COLUMNS} FROM transactions WHERE user_id = ? ORDER BY id ASC"
                ))
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!("SELECT {COLUMNS} FROM transactions ORDER BY id ASC"))
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        rows.iter().map(transaction_from_row).collect()
    }

    async fn update(
        &self,
        id: i64,
        changes: &TransactionUpdate,
    ) -> Result<Option<UpdatedTransaction>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let previous = sqlx::query(&format!("SELECT {COLUMNS} FROM transactions WHERE id = ?"))
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(previous) = previous.as_ref().map(transaction_from_row).transpose()? else {
            return Ok(None);
        };

        let row = sqlx::query(&format!(
            "UPDATE transactions SET
                user_id = COALESCE(?, user_id),
                full_name = COALESCE(?, full_name),
                transaction_date = COALESCE(?, transaction_date),
                transaction_amount = COALESCE(?, transaction_amount),
                transaction_type = COALESCE(?, transaction_type)
             WHERE id = ?
             RETURNING {COLUMNS}"
        ))
        .bind(changes.user_id)
        .bind(changes.full_name.as_deref())
        .bind(changes.transaction_date.map(|at| at.trunc_subsecs(3)))
        .bind(changes.transaction_amount)
        .bind(changes.transaction_type.map(|kind| kind.as_str()))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        let current = transaction_from_row(&row)?;

        tx.commit().await?;

        Ok(Some(UpdatedTransaction { previous, current }))
    }

    async fn delete(&self, id: i64) -> Result<Option<Transaction>, StoreError> {
        let row = sqlx::query(&format!("DELETE FROM transactions WHERE id = ? RETURNING {COLUMNS}"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(transaction_from_row).transpose()
    }

    async fn average_amount(&self, user_id: i64) -> Result<Option<f64>, StoreError> {
        let average = sqlx::query_scalar::<_, Option<f64>>(
            "SELECT AVG(transaction_amount) FROM transactions WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(average)
    }

    async fn busiest_day(&self, user_id: i64) -> Result<Option<DailyCount>, StoreError> {
        let row = sqlx::query(
            r#"SELECT COUNT(id) AS transaction_count, date(transaction_date) AS transaction_day
               FROM transactions
               WHERE user_id = ?
               GROUP BY transaction_day
               ORDER BY transaction_count DESC, transaction_day DESC
               LIMIT 1"#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let day: String = row.try_get("transaction_day")?;
        let day = NaiveDate::parse_from_str(&day, "%Y-%m-%d")
            .map_err(|e| StoreError::Decode(format!("transaction_day {}: {}", day, e)))?;
        let count: i64 = row.try_get("transaction_count")?;

        Ok(Some(DailyCount { day, count }))
    }

    async fn totals_by_type(
        &self,
        user_id: i64,
        range: &DateRange,
    ) -> Result<Vec<(TransactionType, f64)>, StoreError> {
        debug!("Summing totals for user {} over {:?}", user_id, range);

        let rows = sqlx::query(
            r#"SELECT transaction_type, SUM(transaction_amount) AS total
               FROM transactions
               WHERE user_id = ?
               AND (? IS NULL OR julianday(transaction_date) >= julianday(?))
               AND (? IS NULL OR julianday(transaction_date) <= julianday(?))
               GROUP BY transaction_type"#,
        )
        .bind(user_id)
        .bind(range.start)
        .bind(range.start)
        .bind(range.end)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<(TransactionType, f64), StoreError> {
                let kind: String = row.try_get("transaction_type")?;
                let kind = kind
                    .parse::<TransactionType>()
                    .map_err(|e| StoreError::Decode(e.to_string()))?;
                let total: f64 = row.try_get("total")?;
                Ok((kind, total))
            })
            .collect()
    }
}
