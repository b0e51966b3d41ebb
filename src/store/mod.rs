use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    account::{Account, NewAccount},
    types::AccountNumber,
};

pub mod in_memory_store;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccountStoreError {
    #[error("Account {0} not found")]
    AccountNotFound(AccountNumber),
}

/// Source of truth for account existence and balances.
///
/// Implementations must serialize every mutation of a given account, so that
/// a read-validate-write done through [`AccountStore::modify_balance`] or
/// [`AccountStore::transfer`] can never lose a concurrent update.
pub trait AccountStore {
    /// Stores the account under a freshly assigned, never reused number.
    fn create(&self, draft: NewAccount) -> Account;

    fn get(&self, account_number: AccountNumber) -> Result<Account, AccountStoreError>;

    /// All accounts, ordered by account number.
    fn list(&self) -> Vec<Account>;

    /// Removing an absent account is not an error.
    fn delete(&self, account_number: AccountNumber);

    /// Replaces the stored balance.
    fn update_balance(
        &self,
        account_number: AccountNumber,
        balance: Decimal,
    ) -> Result<(), AccountStoreError>;

    /// Computes and stores a new balance from the current record in one critical section.
    /// Nothing is written when `compute` fails.
    fn modify_balance<F, E>(&self, account_number: AccountNumber, compute: F) -> Result<Account, E>
    where
        F: FnOnce(&Account) -> Result<Decimal, E>,
        E: From<AccountStoreError>;

    /// Moves funds between two accounts in one critical section. `compute` receives
    /// `(sender, receiver)` and returns their new balances; both are written or neither.
    ///
    /// The sender is looked up before the receiver.
    fn transfer<F, E>(
        &self,
        sender: AccountNumber,
        receiver: AccountNumber,
        compute: F,
    ) -> Result<(Account, Account), E>
    where
        F: FnOnce(&Account, &Account) -> Result<(Decimal, Decimal), E>,
        E: From<AccountStoreError>;
}
