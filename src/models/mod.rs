// Transaction records, write payloads and analytics response shapes

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::validation::{parse_timestamp, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Credit,
    Debit,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credit" => Ok(Self::Credit),
            "debit" => Ok(Self::Debit),
            other => Err(ValidationError::InvalidTransactionType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub full_name: String,
    pub transaction_date: DateTime<Utc>,
    pub transaction_amount: f64,
    pub transaction_type: TransactionType,
}

/// Payload for creating a transaction. Every field is required.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTransaction {
    pub user_id: i64,
    pub full_name: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub transaction_date: DateTime<Utc>,
    pub transaction_amount: f64,
    pub transaction_type: TransactionType,
}

/// Payload for updating a transaction. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionUpdate {
    pub user_id: Option<i64>,
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub transaction_date: Option<DateTime<Utc>>,
    pub transaction_amount: Option<f64>,
    pub transaction_type: Option<TransactionType>,
}

/// Inclusive date window for the credit/debit totals. Either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, at: &DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| *at >= start) && self.end.map_or(true, |end| *at <= end)
    }
}

/// Number of transactions recorded on a single calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyCount {
    pub day: NaiveDate,
    pub count: i64,
}

/// Analytics response returned for a single user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analytics {
    pub average_transaction_value: f64,
    pub day_of_highest_number_of_transactions: String,
    pub highest_number_of_transactions_in_a_day: i64,
    pub total_debit_value: f64,
    pub total_credit_value: f64,
}

/// Token used for a timestamp inside cache keys and logs.
pub fn timestamp_token(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

fn deserialize_optional_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_timestamp(&raw).map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}
