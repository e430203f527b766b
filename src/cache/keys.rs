//! Cache key generation and management

use std::fmt;

use crate::models::{timestamp_token, DateRange, TransactionType};

/// Token used in place of an absent scope or range bound.
pub const ALL: &str = "all";

/// Top-level key namespace. Decides which TTL an entry gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Transaction,
    Transactions,
    Analytics,
}

impl Namespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transaction => "transaction",
            Self::Transactions => "transactions",
            Self::Analytics => "analytics",
        }
    }
}

/// A structured cache key that can be converted to a string
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// A single transaction by id
    Transaction(i64),
    /// One page of the transaction listing, for one user or for everybody
    TransactionList { user_id: Option<i64>, page: i64 },
    AverageTransactionValue(i64),
    DayOfHighestNumberOfTransactions(i64),
    HighestNumberOfTransactionsInADay(i64),
    /// Credit or debit total restricted to an optional date window
    TotalValue {
        user_id: i64,
        kind: TransactionType,
        range: DateRange,
    },
}

impl CacheKey {
    pub fn transaction(id: i64) -> Self {
        Self::Transaction(id)
    }

    pub fn transaction_list(user_id: Option<i64>, page: i64) -> Self {
        Self::TransactionList { user_id, page }
    }

    pub fn total_value(user_id: i64, kind: TransactionType, range: DateRange) -> Self {
        Self::TotalValue { user_id, kind, range }
    }

    pub fn namespace(&self) -> Namespace {
        match self {
            Self::Transaction(_) => Namespace::Transaction,
            Self::TransactionList { .. } => Namespace::Transactions,
            Self::AverageTransactionValue(_)
            | Self::DayOfHighestNumberOfTransactions(_)
            | Self::HighestNumberOfTransactionsInADay(_)
            | Self::TotalValue { .. } => Namespace::Analytics,
        }
    }

    /// Owning user of the cached data, when the key is scoped to one
    pub fn user_id(&self) -> Option<i64> {
        match self {
            Self::Transaction(_) => None,
            Self::TransactionList { user_id, .. } => *user_id,
            Self::AverageTransactionValue(user_id)
            | Self::DayOfHighestNumberOfTransactions(user_id)
            | Self::HighestNumberOfTransactionsInADay(user_id)
            | Self::TotalValue { user_id, .. } => Some(*user_id),
        }
    }

    /// Pattern matching every listing page cached for `user_id` (`None` is the unscoped listing).
    pub fn transaction_list_pattern(user_id: Option<i64>) -> String {
        format!("{}:{}:*", Namespace::Transactions.as_str(), scope_token(user_id))
    }

    /// Pattern matching every analytics metric cached for `user_id`, whatever the date window.
    pub fn analytics_pattern(user_id: i64) -> String {
        format!("{}:{}:*", Namespace::Analytics.as_str(), user_id)
    }
}

fn scope_token(user_id: Option<i64>) -> String {
    user_id.map_or_else(|| ALL.to_string(), |id| id.to_string())
}

fn bound_token(bound: Option<&chrono::DateTime<chrono::Utc>>) -> String {
    bound.map_or_else(|| ALL.to_string(), timestamp_token)
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transaction(id) => write!(f, "transaction:{}", id),
            Self::TransactionList { user_id, page } => {
                write!(f, "transactions:{}:{}", scope_token(*user_id), page)
            }
            Self::AverageTransactionValue(user_id) => {
                write!(f, "analytics:{}:average_transaction_value", user_id)
            }
            Self::DayOfHighestNumberOfTransactions(user_id) => {
                write!(f, "analytics:{}:day_of_highest_number_of_transactions", user_id)
            }
            Self::HighestNumberOfTransactionsInADay(user_id) => {
                write!(f, "analytics:{}:highest_number_of_transaction_in_a_day", user_id)
            }
            Self::TotalValue { user_id, kind, range } => write!(
                f,
                "analytics:{}:total_{}_value:{}:{}",
                user_id,
                kind,
                bound_token(range.start.as_ref()),
                bound_token(range.end.as_ref())
            ),
        }
    }
}

/// Glob matching as used by `scan_delete`: an exact key, or a prefix ending in `*`.
pub fn matches_pattern(pattern: &str, key: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => key.starts_with(prefix),
        None => key == pattern,
    }
}
