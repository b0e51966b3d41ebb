use std::collections::BTreeMap;

use parking_lot::Mutex;
use rust_decimal::Decimal;

use crate::{
    account::{Account, NewAccount},
    types::AccountNumber,
};

use super::{AccountStore, AccountStoreError};

#[derive(Debug, Default)]
struct Accounts {
    last_account_number: AccountNumber,
    by_number: BTreeMap<AccountNumber, Account>,
}

impl Accounts {
    fn get(&self, account_number: AccountNumber) -> Result<&Account, AccountStoreError> {
        self.by_number
            .get(&account_number)
            .ok_or(AccountStoreError::AccountNotFound(account_number))
    }

    fn set_balance(
        &mut self,
        account_number: AccountNumber,
        balance: Decimal,
    ) -> Result<&Account, AccountStoreError> {
        let account = self
            .by_number
            .get_mut(&account_number)
            .ok_or(AccountStoreError::AccountNotFound(account_number))?;
        account.balance = balance;
        Ok(account)
    }
}

/// Account store behind a single store-wide lock. The number sequence lives
/// under the same lock, so concurrent creates never share a number.
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    inner: Mutex<Accounts>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountStore for InMemoryAccountStore {
    fn create(&self, draft: NewAccount) -> Account {
        let mut accounts = self.inner.lock();
        accounts.last_account_number += 1;
        let account = Account::new(accounts.last_account_number, draft);
        accounts
            .by_number
            .insert(account.account_number, account.clone());
        account
    }

    fn get(&self, account_number: AccountNumber) -> Result<Account, AccountStoreError> {
        self.inner.lock().get(account_number).cloned()
    }

    fn list(&self) -> Vec<Account> {
        self.inner.lock().by_number.values().cloned().collect()
    }

    fn delete(&self, account_number: AccountNumber) {
        self.inner.lock().by_number.remove(&account_number);
    }

    fn update_balance(
        &self,
        account_number: AccountNumber,
        balance: Decimal,
    ) -> Result<(), AccountStoreError> {
        self.inner.lock().set_balance(account_number, balance)?;
        Ok(())
    }

    fn modify_balance<F, E>(&self, account_number: AccountNumber, compute: F) -> Result<Account, E>
    where
        F: FnOnce(&Account) -> Result<Decimal, E>,
        E: From<AccountStoreError>,
    {
        let mut accounts = self.inner.lock();
        let balance = compute(accounts.get(account_number)?)?;
        Ok(accounts.set_balance(account_number, balance)?.clone())
    }

    fn transfer<F, E>(
        &self,
        sender: AccountNumber,
        receiver: AccountNumber,
        compute: F,
    ) -> Result<(Account, Account), E>
    where
        F: FnOnce(&Account, &Account) -> Result<(Decimal, Decimal), E>,
        E: From<AccountStoreError>,
    {
        let mut accounts = self.inner.lock();
        let (sender_balance, receiver_balance) =
            compute(accounts.get(sender)?, accounts.get(receiver)?)?;
        // both lookups succeeded above, so neither write can fail halfway
        let sender_account = accounts.set_balance(sender, sender_balance)?.clone();
        let receiver_account = accounts.set_balance(receiver, receiver_balance)?.clone();
        Ok((sender_account, receiver_account))
    }
}
