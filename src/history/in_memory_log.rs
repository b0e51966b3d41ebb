use std::collections::{HashMap, hash_map::Entry};

use chrono::Utc;
use parking_lot::Mutex;

use crate::types::{AccountNumber, to_money};

use super::{AlreadyRegistered, NewTransaction, NoHistory, Transaction, TransactionLog};

#[derive(Debug, Default)]
pub struct InMemoryTransactionLog {
    buckets: Mutex<HashMap<AccountNumber, Vec<Transaction>>>,
}

impl InMemoryTransactionLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TransactionLog for InMemoryTransactionLog {
    fn register_account(&self, account_number: AccountNumber) -> Result<(), AlreadyRegistered> {
        match self.buckets.lock().entry(account_number) {
            Entry::Occupied(_) => Err(AlreadyRegistered(account_number)),
            Entry::Vacant(entry) => {
                entry.insert(Vec::new());
                Ok(())
            }
        }
    }

    fn append(&self, transaction: NewTransaction) -> Transaction {
        let mut buckets = self.buckets.lock();
        // stamped under the lock so timestamps follow append order
        let stored = Transaction {
            account_number: transaction.account_number,
            amount: to_money(transaction.amount),
            transaction_type: transaction.transaction_type,
            created_at: Utc::now(),
        };
        buckets
            .entry(stored.account_number)
            .or_default()
            .push(stored.clone());
        stored
    }

    fn history(
        &self,
        account_number: AccountNumber,
    ) -> Result<Vec<Transaction>, NoHistory> {
        self.buckets
            .lock()
            .get(&account_number)
            .cloned()
            .ok_or(NoHistory(account_number))
    }

    fn accounts(&self) -> Vec<AccountNumber> {
        let mut numbers: Vec<_> = self.buckets.lock().keys().copied().collect();
        numbers.sort_unstable();
        numbers
    }
}
