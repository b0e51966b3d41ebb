use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    account::NewAccount,
    types::{AccountNumber, AccountType, Currency, to_money},
};

/// Account creation request as received from an adapter, fields not yet validated.
#[derive(Debug, Clone, Default)]
pub struct AccountDraft {
    pub currency_code: String,
    pub owner_name: String,
    pub account_type: String,
    pub balance: Decimal,
}

#[derive(Debug, Clone, Copy)]
pub struct DepositCommand {
    pub account_number: AccountNumber,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Copy)]
pub struct WithdrawCommand {
    pub account_number: AccountNumber,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Copy)]
pub struct PaymentCommand {
    pub sender_account: AccountNumber,
    pub receiver_account: AccountNumber,
    pub amount: Decimal,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccountCommandError {
    #[error("Invalid currency code `{0}`")]
    InvalidCurrencyCode(String),
    #[error("Invalid account type `{0}`")]
    InvalidAccountType(String),
    #[error("Invalid owner name `{0}`, individual accounts need a first and last name")]
    InvalidOwnerName(String),
    #[error("Opening balance must not be negative, got {0}")]
    NegativeOpeningBalance(Decimal),
}

impl AccountDraft {
    /// Validates the draft in order: currency, account type, owner name, balance.
    pub fn parse(self) -> Result<NewAccount, AccountCommandError> {
        let currency_code: Currency = self
            .currency_code
            .parse()
            .map_err(|_| AccountCommandError::InvalidCurrencyCode(self.currency_code.clone()))?;
        let account_type: AccountType = self
            .account_type
            .parse()
            .map_err(|_| AccountCommandError::InvalidAccountType(self.account_type.clone()))?;

        if account_type == AccountType::Individual
            && self.owner_name.split_whitespace().count() < 2
        {
            return Err(AccountCommandError::InvalidOwnerName(self.owner_name));
        }

        let balance = to_money(self.balance);
        if balance < Decimal::ZERO {
            return Err(AccountCommandError::NegativeOpeningBalance(self.balance));
        }

        Ok(NewAccount {
            currency_code,
            owner_name: self.owner_name,
            account_type,
            balance,
        })
    }
}
