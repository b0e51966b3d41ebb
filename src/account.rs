use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::types::{AccountNumber, AccountType, Currency};

/// Business rules violated by a money movement against existing accounts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccountError {
    #[error("Account {account_number} is {account_type} and cannot take part in a {operation}")]
    AccountTypeNotEligible {
        account_number: AccountNumber,
        account_type: AccountType,
        operation: &'static str,
    },
    #[error("Currency codes of the accounts are not the same ({sender} vs {receiver})")]
    CurrencyMismatch { sender: Currency, receiver: Currency },
    #[error("Insufficient balance on account {account_number}: {balance} < {requested}")]
    InsufficientBalance {
        account_number: AccountNumber,
        balance: Decimal,
        requested: Decimal,
    },
    #[error("Crediting {amount} would overflow the balance of account {account_number}")]
    BalanceOverflow {
        account_number: AccountNumber,
        amount: Decimal,
    },
}

/// Account fields that passed validation, before a number is assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub currency_code: Currency,
    pub owner_name: String,
    pub account_type: AccountType,
    pub balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub account_number: AccountNumber,
    pub currency_code: Currency,
    pub owner_name: String,
    pub account_type: AccountType,
    pub balance: Decimal,
}

impl Account {
    pub fn new(account_number: AccountNumber, draft: NewAccount) -> Self {
        Self {
            account_number,
            currency_code: draft.currency_code,
            owner_name: draft.owner_name,
            account_type: draft.account_type,
            balance: draft.balance,
        }
    }

    /// Balance after crediting `amount`. Only individual accounts take deposits.
    pub fn deposit(&self, amount: Decimal) -> Result<Decimal, AccountError> {
        self.require_individual("deposit")?;
        self.credit(amount)
    }

    /// Balance after debiting `amount`.
    pub fn withdraw(&self, amount: Decimal) -> Result<Decimal, AccountError> {
        self.require_individual("withdraw")?;
        self.debit(amount)
    }

    /// New `(sender, receiver)` balances for a payment from `self` to `receiver`.
    ///
    /// Checks run in a fixed order: account types, then currencies, then funds.
    pub fn pay(
        &self,
        receiver: &Account,
        amount: Decimal,
    ) -> Result<(Decimal, Decimal), AccountError> {
        self.require_individual("payment")?;
        if receiver.account_type != AccountType::Corporate {
            return Err(AccountError::AccountTypeNotEligible {
                account_number: receiver.account_number,
                account_type: receiver.account_type,
                operation: "payment",
            });
        }
        if self.currency_code != receiver.currency_code {
            return Err(AccountError::CurrencyMismatch {
                sender: self.currency_code,
                receiver: receiver.currency_code,
            });
        }
        let sender_balance = self.debit(amount)?;
        Ok((sender_balance, receiver.credit(amount)?))
    }

    fn credit(&self, amount: Decimal) -> Result<Decimal, AccountError> {
        self.balance
            .checked_add(amount)
            .ok_or(AccountError::BalanceOverflow {
                account_number: self.account_number,
                amount,
            })
    }

    fn debit(&self, amount: Decimal) -> Result<Decimal, AccountError> {
        if self.balance < amount {
            return Err(AccountError::InsufficientBalance {
                account_number: self.account_number,
                balance: self.balance,
                requested: amount,
            });
        }
        Ok(self.balance - amount)
    }

    fn require_individual(&self, operation: &'static str) -> Result<(), AccountError> {
        match self.account_type {
            AccountType::Individual => Ok(()),
            AccountType::Corporate => Err(AccountError::AccountTypeNotEligible {
                account_number: self.account_number,
                account_type: self.account_type,
                operation,
            }),
        }
    }
}
