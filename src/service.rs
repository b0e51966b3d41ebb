use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    account::{Account, AccountError},
    command::{AccountCommandError, AccountDraft, DepositCommand, PaymentCommand, WithdrawCommand},
    history::{
        AlreadyRegistered, NewTransaction, NoHistory, Transaction, TransactionLog,
        in_memory_log::InMemoryTransactionLog,
    },
    store::{AccountStore, AccountStoreError, in_memory_store::InMemoryAccountStore},
    types::{AccountNumber, TransactionType, to_money},
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error(transparent)]
    CommandErr(#[from] AccountCommandError),
    #[error(transparent)]
    AccountErr(#[from] AccountError),
    #[error("Account {0} not found")]
    AccountNotFound(AccountNumber),
    #[error("Amount must be greater than zero, got {0}")]
    InvalidAmount(Decimal),
    #[error("Account {0} has no transaction history")]
    TransactionHistoryNotFound(AccountNumber),
}

/// Stable name of each failure condition, for adapters that need one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerErrorKind {
    InvalidCurrencyCode,
    InvalidAccountType,
    InvalidOwnerName,
    NegativeOpeningBalance,
    AccountNotFound,
    AccountTypeNotEligible,
    CurrencyMismatch,
    InsufficientBalance,
    BalanceOverflow,
    InvalidAmount,
    TransactionHistoryNotFound,
}

impl LedgerError {
    pub fn kind(&self) -> LedgerErrorKind {
        match self {
            Self::CommandErr(AccountCommandError::InvalidCurrencyCode(_)) => {
                LedgerErrorKind::InvalidCurrencyCode
            }
            Self::CommandErr(AccountCommandError::InvalidAccountType(_)) => {
                LedgerErrorKind::InvalidAccountType
            }
            Self::CommandErr(AccountCommandError::InvalidOwnerName(_)) => {
                LedgerErrorKind::InvalidOwnerName
            }
            Self::CommandErr(AccountCommandError::NegativeOpeningBalance(_)) => {
                LedgerErrorKind::NegativeOpeningBalance
            }
            Self::AccountErr(AccountError::AccountTypeNotEligible { .. }) => {
                LedgerErrorKind::AccountTypeNotEligible
            }
            Self::AccountErr(AccountError::CurrencyMismatch { .. }) => {
                LedgerErrorKind::CurrencyMismatch
            }
            Self::AccountErr(AccountError::InsufficientBalance { .. }) => {
                LedgerErrorKind::InsufficientBalance
            }
            Self::AccountErr(AccountError::BalanceOverflow { .. }) => {
                LedgerErrorKind::BalanceOverflow
            }
            Self::AccountNotFound(_) => LedgerErrorKind::AccountNotFound,
            Self::InvalidAmount(_) => LedgerErrorKind::InvalidAmount,
            Self::TransactionHistoryNotFound(_) => LedgerErrorKind::TransactionHistoryNotFound,
        }
    }
}

impl From<AccountStoreError> for LedgerError {
    fn from(err: AccountStoreError) -> Self {
        match err {
            AccountStoreError::AccountNotFound(account_number) => {
                Self::AccountNotFound(account_number)
            }
        }
    }
}

/// Business rules on top of an [`AccountStore`] and a [`TransactionLog`].
///
/// A money movement either fails before anything is written, or updates the
/// balance(s) and then files exactly one transaction. Payments apply both legs
/// inside one store critical section, so no half-applied payment is visible.
#[derive(Debug)]
pub struct LedgerService<S, L> {
    store: S,
    log: L,
}

pub type InMemoryLedger = LedgerService<InMemoryAccountStore, InMemoryTransactionLog>;

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new(InMemoryAccountStore::new(), InMemoryTransactionLog::new())
    }
}

impl<S, L> LedgerService<S, L>
where
    S: AccountStore,
    L: TransactionLog,
{
    pub fn new(store: S, log: L) -> Self {
        Self { store, log }
    }

    pub fn create_account(&self, draft: AccountDraft) -> Result<Account, LedgerError> {
        let account = draft.parse()?;
        Ok(self.store.create(account))
    }

    pub fn get_account(&self, account_number: AccountNumber) -> Result<Account, LedgerError> {
        Ok(self.store.get(account_number)?)
    }

    pub fn list_accounts(&self) -> Vec<Account> {
        self.store.list()
    }

    /// Removes the account but keeps its transaction history.
    pub fn delete_account(&self, account_number: AccountNumber) {
        self.store.delete(account_number);
    }

    pub fn deposit(&self, command: DepositCommand) -> Result<Transaction, LedgerError> {
        let amount = positive_amount(command.amount)?;
        self.ensure_registered(command.account_number);
        self.store
            .modify_balance(command.account_number, |account| -> Result<_, LedgerError> {
                Ok(account.deposit(amount)?)
            })?;
        Ok(self.record(command.account_number, amount, TransactionType::Deposit))
    }

    pub fn withdraw(&self, command: WithdrawCommand) -> Result<Transaction, LedgerError> {
        let amount = positive_amount(command.amount)?;
        self.ensure_registered(command.account_number);
        self.store
            .modify_balance(command.account_number, |account| -> Result<_, LedgerError> {
                Ok(account.withdraw(amount)?)
            })?;
        Ok(self.record(command.account_number, amount, TransactionType::Withdraw))
    }

    /// Debits an individual sender and credits a corporate receiver of the same
    /// currency. The transaction is filed under the sender only.
    pub fn payment(&self, command: PaymentCommand) -> Result<Transaction, LedgerError> {
        let amount = positive_amount(command.amount)?;
        self.ensure_registered(command.sender_account);
        self.store.transfer(
            command.sender_account,
            command.receiver_account,
            |sender, receiver| -> Result<_, LedgerError> { Ok(sender.pay(receiver, amount)?) },
        )?;
        Ok(self.record(command.sender_account, amount, TransactionType::Payment))
    }

    pub fn transaction_history(
        &self,
        account_number: AccountNumber,
    ) -> Result<Vec<Transaction>, LedgerError> {
        self.log
            .history(account_number)
            .map_err(|NoHistory(n)| LedgerError::TransactionHistoryNotFound(n))
    }

    /// Accounts with a transaction history, deleted ones included.
    pub fn accounts_with_history(&self) -> Vec<AccountNumber> {
        self.log.accounts()
    }

    fn ensure_registered(&self, account_number: AccountNumber) {
        match self.log.register_account(account_number) {
            // every movement after the first one finds the bucket in place
            Ok(()) | Err(AlreadyRegistered(_)) => {}
        }
    }

    fn record(
        &self,
        account_number: AccountNumber,
        amount: Decimal,
        transaction_type: TransactionType,
    ) -> Transaction {
        self.log.append(NewTransaction {
            account_number,
            amount,
            transaction_type,
        })
    }
}

/// Amounts are rounded to cents before the positivity check, so `0.004` is rejected.
fn positive_amount(amount: Decimal) -> Result<Decimal, LedgerError> {
    let rounded = to_money(amount);
    if rounded <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount(amount));
    }
    Ok(rounded)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use crate::{
        account::NewAccount,
        types::{AccountType, Currency},
    };

    use super::*;

    fn individual(owner: &str, currency: &str) -> AccountDraft {
        AccountDraft {
            currency_code: currency.to_string(),
            owner_name: owner.to_string(),
            account_type: "individual".to_string(),
            balance: Decimal::ZERO,
        }
    }

    fn corporate(owner: &str, currency: &str) -> AccountDraft {
        AccountDraft {
            account_type: "corporate".to_string(),
            ..individual(owner, currency)
        }
    }

    fn deposit(account_number: AccountNumber, amount: Decimal) -> DepositCommand {
        DepositCommand {
            account_number,
            amount,
        }
    }

    fn withdraw(account_number: AccountNumber, amount: Decimal) -> WithdrawCommand {
        WithdrawCommand {
            account_number,
            amount,
        }
    }

    fn payment(sender: AccountNumber, receiver: AccountNumber, amount: Decimal) -> PaymentCommand {
        PaymentCommand {
            sender_account: sender,
            receiver_account: receiver,
            amount,
        }
    }

    fn balance(ledger: &InMemoryLedger, account_number: AccountNumber) -> Decimal {
        ledger.get_account(account_number).unwrap().balance
    }

    /// Store that must never be reached.
    struct UntouchedStore;

    impl AccountStore for UntouchedStore {
        fn create(&self, _: NewAccount) -> Account {
            panic!("create called")
        }
        fn get(&self, _: AccountNumber) -> Result<Account, AccountStoreError> {
            panic!("get called")
        }
        fn list(&self) -> Vec<Account> {
            panic!("list called")
        }
        fn delete(&self, _: AccountNumber) {
            panic!("delete called")
        }
        fn update_balance(&self, _: AccountNumber, _: Decimal) -> Result<(), AccountStoreError> {
            panic!("update_balance called")
        }
        fn modify_balance<F, E>(&self, _: AccountNumber, _: F) -> Result<Account, E>
        where
            F: FnOnce(&Account) -> Result<Decimal, E>,
            E: From<AccountStoreError>,
        {
            panic!("modify_balance called")
        }
        fn transfer<F, E>(
            &self,
            _: AccountNumber,
            _: AccountNumber,
            _: F,
        ) -> Result<(Account, Account), E>
        where
            F: FnOnce(&Account, &Account) -> Result<(Decimal, Decimal), E>,
            E: From<AccountStoreError>,
        {
            panic!("transfer called")
        }
    }

    /// Log that records the calls it receives.
    #[derive(Default)]
    struct RecordingLog {
        registered: RefCell<Vec<AccountNumber>>,
        appended: RefCell<Vec<NewTransaction>>,
    }

    impl TransactionLog for RecordingLog {
        fn register_account(
            &self,
            account_number: AccountNumber,
        ) -> Result<(), AlreadyRegistered> {
            let mut registered = self.registered.borrow_mut();
            if registered.contains(&account_number) {
                return Err(AlreadyRegistered(account_number));
            }
            registered.push(account_number);
            Ok(())
        }

        fn append(&self, transaction: NewTransaction) -> Transaction {
            self.appended.borrow_mut().push(transaction);
            Transaction {
                account_number: transaction.account_number,
                amount: transaction.amount,
                transaction_type: transaction.transaction_type,
                created_at: chrono::Utc::now(),
            }
        }

        fn history(
            &self,
            account_number: AccountNumber,
        ) -> Result<Vec<Transaction>, NoHistory> {
            Err(NoHistory(account_number))
        }

        fn accounts(&self) -> Vec<AccountNumber> {
            self.registered.borrow().clone()
        }
    }

    #[test]
    fn create_account_validates_owner_name() {
        let ledger = InMemoryLedger::default();
        let err = ledger.create_account(individual("Ada", "USD")).unwrap_err();
        assert_eq!(err.kind(), LedgerErrorKind::InvalidOwnerName);

        let acc = ledger.create_account(individual("Ada Lovelace", "USD")).unwrap();
        assert_eq!(acc.account_number, 1);
        assert_eq!(acc.account_type, AccountType::Individual);
        assert_eq!(acc.currency_code, Currency::Usd);
        assert_eq!(ledger.get_account(1).unwrap(), acc);

        let err = ledger.create_account(individual("Ada Lovelace", "JPY")).unwrap_err();
        assert_eq!(err.kind(), LedgerErrorKind::InvalidCurrencyCode);
        assert_eq!(err.to_string(), "Invalid currency code `JPY`");
        let err = ledger
            .create_account(AccountDraft {
                account_type: "charity".to_string(),
                ..individual("Ada Lovelace", "USD")
            })
            .unwrap_err();
        assert_eq!(err.kind(), LedgerErrorKind::InvalidAccountType);
    }

    #[test]
    fn payment_scenario() {
        let ledger = InMemoryLedger::default();
        let a = ledger.create_account(individual("Ada Lovelace", "USD")).unwrap();
        let b = ledger.create_account(corporate("Analytical Engines", "USD")).unwrap();

        ledger
            .deposit(deposit(a.account_number, Decimal::from(100)))
            .unwrap();
        assert_eq!(balance(&ledger, a.account_number).to_string(), "100.00");

        let tx = ledger
            .payment(payment(a.account_number, b.account_number, Decimal::from(40)))
            .unwrap();
        assert_eq!(tx.account_number, a.account_number);
        assert_eq!(tx.transaction_type, TransactionType::Payment);
        assert_eq!(tx.amount.to_string(), "40.00");
        assert_eq!(balance(&ledger, a.account_number).to_string(), "60.00");
        assert_eq!(balance(&ledger, b.account_number).to_string(), "40.00");

        let err = ledger
            .withdraw(withdraw(a.account_number, Decimal::from(1000)))
            .unwrap_err();
        assert_eq!(err.kind(), LedgerErrorKind::InsufficientBalance);
        assert_eq!(balance(&ledger, a.account_number).to_string(), "60.00");

        let history = ledger.transaction_history(a.account_number).unwrap();
        let kinds: Vec<_> = history.iter().map(|t| t.transaction_type).collect();
        assert_eq!(kinds, vec![TransactionType::Deposit, TransactionType::Payment]);

        // no mirror entry is filed under the receiver
        assert_eq!(
            ledger.transaction_history(b.account_number).unwrap_err(),
            LedgerError::TransactionHistoryNotFound(b.account_number)
        );
    }

    #[test]
    fn history_after_single_deposit() {
        let ledger = InMemoryLedger::default();
        let a = ledger.create_account(individual("Ada Lovelace", "EUR")).unwrap();
        assert_eq!(
            ledger.transaction_history(a.account_number).unwrap_err().kind(),
            LedgerErrorKind::TransactionHistoryNotFound
        );

        ledger
            .deposit(deposit(a.account_number, Decimal::new(1250, 2)))
            .unwrap();
        let history = ledger.transaction_history(a.account_number).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].amount, Decimal::new(1250, 2));
        assert_eq!(history[0].transaction_type, TransactionType::Deposit);
    }

    #[test]
    fn corporate_accounts_cannot_deposit_or_withdraw() {
        let ledger = InMemoryLedger::default();
        let b = ledger
            .create_account(AccountDraft {
                balance: Decimal::TEN,
                ..corporate("Acme", "TRY")
            })
            .unwrap();

        let err = ledger.deposit(deposit(b.account_number, Decimal::ONE)).unwrap_err();
        assert_eq!(err.kind(), LedgerErrorKind::AccountTypeNotEligible);
        let err = ledger.withdraw(withdraw(b.account_number, Decimal::ONE)).unwrap_err();
        assert_eq!(err.kind(), LedgerErrorKind::AccountTypeNotEligible);
        assert_eq!(balance(&ledger, b.account_number), Decimal::TEN);

        // the bucket was still registered, but nothing was appended
        assert!(ledger.transaction_history(b.account_number).unwrap().is_empty());
    }

    #[test]
    fn payment_rejections_leave_balances_untouched() {
        let ledger = InMemoryLedger::default();
        let ada = ledger
            .create_account(AccountDraft {
                balance: Decimal::from(50),
                ..individual("Ada Lovelace", "USD")
            })
            .unwrap()
            .account_number;
        let alan = ledger
            .create_account(individual("Alan Turing", "USD"))
            .unwrap()
            .account_number;
        let usd_corp = ledger.create_account(corporate("Acme", "USD")).unwrap().account_number;
        let eur_corp = ledger.create_account(corporate("Euro", "EUR")).unwrap().account_number;

        let cases = [
            (payment(ada, alan, Decimal::ONE), LedgerErrorKind::AccountTypeNotEligible),
            (payment(usd_corp, ada, Decimal::ONE), LedgerErrorKind::AccountTypeNotEligible),
            (payment(ada, eur_corp, Decimal::ONE), LedgerErrorKind::CurrencyMismatch),
            (payment(ada, usd_corp, Decimal::from(51)), LedgerErrorKind::InsufficientBalance),
            (payment(ada, 99, Decimal::ONE), LedgerErrorKind::AccountNotFound),
            (payment(99, usd_corp, Decimal::ONE), LedgerErrorKind::AccountNotFound),
            (payment(ada, usd_corp, Decimal::ZERO), LedgerErrorKind::InvalidAmount),
        ];
        for (command, kind) in cases {
            assert_eq!(ledger.payment(command).unwrap_err().kind(), kind, "{command:?}");
        }

        assert_eq!(balance(&ledger, ada), Decimal::from(50));
        assert_eq!(balance(&ledger, alan), Decimal::ZERO);
        assert_eq!(balance(&ledger, usd_corp), Decimal::ZERO);
        assert_eq!(balance(&ledger, eur_corp), Decimal::ZERO);
        assert!(ledger.transaction_history(ada).unwrap().is_empty());
    }

    #[test]
    fn withdraw_exact_balance() {
        let ledger = InMemoryLedger::default();
        let a = ledger
            .create_account(AccountDraft {
                balance: Decimal::new(1999, 2),
                ..individual("Ada Lovelace", "USD")
            })
            .unwrap();
        ledger
            .withdraw(withdraw(a.account_number, Decimal::new(1999, 2)))
            .unwrap();
        assert_eq!(balance(&ledger, a.account_number), Decimal::ZERO);
        let err = ledger
            .withdraw(withdraw(a.account_number, Decimal::new(1, 2)))
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::AccountErr(AccountError::InsufficientBalance { .. })
        ));
    }

    #[test]
    fn overflowing_credits_leave_balances_untouched() {
        let ledger = InMemoryLedger::default();
        let a = ledger.create_account(individual("Ada Lovelace", "USD")).unwrap();
        let b = ledger
            .create_account(AccountDraft {
                balance: Decimal::MAX,
                ..corporate("Acme", "USD")
            })
            .unwrap();
        ledger.deposit(deposit(a.account_number, Decimal::ONE)).unwrap();

        let err = ledger
            .deposit(deposit(a.account_number, Decimal::MAX))
            .unwrap_err();
        assert_eq!(err.kind(), LedgerErrorKind::BalanceOverflow);
        assert_eq!(balance(&ledger, a.account_number), Decimal::ONE);

        let receiver_balance = balance(&ledger, b.account_number);
        let err = ledger
            .payment(payment(a.account_number, b.account_number, Decimal::ONE))
            .unwrap_err();
        assert_eq!(err.kind(), LedgerErrorKind::BalanceOverflow);
        assert_eq!(balance(&ledger, a.account_number), Decimal::ONE);
        assert_eq!(balance(&ledger, b.account_number), receiver_balance);

        // only the first deposit was recorded
        assert_eq!(ledger.transaction_history(a.account_number).unwrap().len(), 1);
    }

    #[test]
    fn deposit_on_missing_account() {
        let ledger = InMemoryLedger::default();
        let err = ledger.deposit(deposit(7, Decimal::ONE)).unwrap_err();
        assert_eq!(err, LedgerError::AccountNotFound(7));
        assert_eq!(err.to_string(), "Account 7 not found");
    }

    #[test]
    fn delete_keeps_history() {
        let ledger = InMemoryLedger::default();
        let a = ledger.create_account(individual("Ada Lovelace", "USD")).unwrap();
        ledger.deposit(deposit(a.account_number, Decimal::ONE)).unwrap();
        ledger.delete_account(a.account_number);
        ledger.delete_account(a.account_number);

        assert_eq!(
            ledger.get_account(a.account_number).unwrap_err(),
            LedgerError::AccountNotFound(a.account_number)
        );
        assert!(ledger.list_accounts().is_empty());
        assert_eq!(ledger.transaction_history(a.account_number).unwrap().len(), 1);
        assert_eq!(ledger.accounts_with_history(), vec![a.account_number]);
    }

    #[test]
    fn invalid_amount_is_rejected_before_any_lookup() {
        let ledger = LedgerService::new(UntouchedStore, RecordingLog::default());
        for amount in [Decimal::ZERO, Decimal::from(-5), Decimal::new(4, 3)] {
            assert_eq!(
                ledger.deposit(deposit(1, amount)).unwrap_err(),
                LedgerError::InvalidAmount(amount)
            );
            assert_eq!(
                ledger.withdraw(withdraw(1, amount)).unwrap_err().kind(),
                LedgerErrorKind::InvalidAmount
            );
            assert_eq!(
                ledger.payment(payment(1, 2, amount)).unwrap_err().kind(),
                LedgerErrorKind::InvalidAmount
            );
        }
        assert!(ledger.log.registered.borrow().is_empty());
        assert!(ledger.log.appended.borrow().is_empty());
    }

    #[test]
    fn registration_is_lazy_and_idempotent() {
        let ledger = LedgerService::new(InMemoryAccountStore::new(), RecordingLog::default());
        let a = ledger.create_account(individual("Ada Lovelace", "USD")).unwrap();
        let b = ledger.create_account(corporate("Acme", "USD")).unwrap();
        assert!(ledger.log.registered.borrow().is_empty());

        ledger.deposit(deposit(a.account_number, Decimal::TEN)).unwrap();
        ledger.deposit(deposit(a.account_number, Decimal::TEN)).unwrap();
        ledger
            .payment(payment(a.account_number, b.account_number, Decimal::new(333, 2)))
            .unwrap();
        // failed movements still register the bucket
        ledger.withdraw(withdraw(b.account_number, Decimal::ONE)).unwrap_err();

        assert_eq!(
            *ledger.log.registered.borrow(),
            vec![a.account_number, b.account_number]
        );
        let appended = ledger.log.appended.borrow();
        assert_eq!(appended.len(), 3);
        assert_eq!(appended[2].account_number, a.account_number);
        assert_eq!(appended[2].amount, Decimal::new(333, 2));
        assert_eq!(appended[2].transaction_type, TransactionType::Payment);
    }

    #[test]
    fn amounts_are_rounded_to_cents() {
        let ledger = InMemoryLedger::default();
        let a = ledger.create_account(individual("Ada Lovelace", "USD")).unwrap();
        let tx = ledger
            .deposit(deposit(a.account_number, Decimal::new(10005, 3)))
            .unwrap();
        assert_eq!(tx.amount.to_string(), "10.01");
        assert_eq!(balance(&ledger, a.account_number).to_string(), "10.01");
    }
}
