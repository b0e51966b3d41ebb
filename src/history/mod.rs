use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::types::{AccountNumber, TransactionType};

pub mod in_memory_log;

/// A completed money movement, filed under `account_number`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    pub account_number: AccountNumber,
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub created_at: DateTime<Utc>,
}

/// Log entry before the log stamps it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewTransaction {
    pub account_number: AccountNumber,
    pub amount: Decimal,
    pub transaction_type: TransactionType,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Account {0} already has transaction history")]
pub struct AlreadyRegistered(pub AccountNumber);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Account {0} has no transaction history")]
pub struct NoHistory(pub AccountNumber);

/// Append-only, per-account ordered history.
pub trait TransactionLog {
    /// Creates an empty history bucket for the account.
    fn register_account(&self, account_number: AccountNumber) -> Result<(), AlreadyRegistered>;

    /// Stamps `created_at`, rounds the amount and appends the entry. A missing
    /// bucket is created on the fly.
    fn append(&self, transaction: NewTransaction) -> Transaction;

    /// Entries in append order. An empty bucket yields an empty list, a missing
    /// one fails with [`NoHistory`].
    fn history(&self, account_number: AccountNumber) -> Result<Vec<Transaction>, NoHistory>;

    /// Accounts that have a history bucket, in ascending order. Deleted accounts
    /// keep their bucket.
    fn accounts(&self) -> Vec<AccountNumber>;
}
