//! This module could be a separate crate on its own, to bootstrap [`mini_ledger`](crate) within
//! a binary: it turns a CSV command file into typed ledger calls and prints CSV reports.

use std::io::{Read, Write};

use anyhow::{Context, Result};
use csv_parser::{CommandKind, CommandRecord, CsvCommandParser};
use csv_printer::{print_accounts, print_transactions};
use thiserror::Error;

use crate::{
    command::{AccountDraft, DepositCommand, PaymentCommand, WithdrawCommand},
    history::Transaction,
    service::{InMemoryLedger, LedgerError},
};

pub mod config;
pub mod csv_parser;
pub mod csv_printer;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Malformed row: {0}")]
    Malformed(#[from] csv::Error),
    #[error("Column `{column}` is required for {kind:?}")]
    MissingColumn {
        column: &'static str,
        kind: CommandKind,
    },
    #[error(transparent)]
    Rejected(#[from] LedgerError),
}

pub struct Service<'w, R, W: 'w> {
    pub input: R,
    pub output: &'w mut W,
    pub print_history: bool,
    pub error_printer: Box<dyn FnMut(u64, CommandError) + 'w>,
}

impl<'w, R, W> Service<'w, R, W>
where
    R: Read,
    W: Write + 'w,
{
    pub fn run(mut self) -> Result<()> {
        let parser = CsvCommandParser::new(self.input).context("Failed to read CSV header")?;

        let ledger = InMemoryLedger::default();
        let mut applied = 0usize;
        let mut rejected = 0usize;

        for (line, row) in parser {
            let result = row
                .map_err(CommandError::from)
                .and_then(|record| apply(&ledger, line, record));
            match result {
                Ok(()) => applied += 1,
                Err(err) => {
                    rejected += 1;
                    (self.error_printer)(line, err);
                }
            }
        }
        tracing::info!(applied, rejected, "command file processed");

        let accounts = ledger.list_accounts();
        print_accounts(&mut *self.output, accounts.iter())?;

        if self.print_history {
            writeln!(self.output).context("Failed to write report separator")?;
            // closed accounts still print their history
            let transactions: Vec<Transaction> = ledger
                .accounts_with_history()
                .into_iter()
                .filter_map(|account_number| ledger.transaction_history(account_number).ok())
                .flatten()
                .collect();
            print_transactions(self.output, transactions.iter())?;
        }
        Ok(())
    }
}

fn apply(ledger: &InMemoryLedger, line: u64, record: CommandRecord) -> Result<(), CommandError> {
    let kind = record.kind;
    tracing::debug!(line, ?kind, "applying command");
    match kind {
        CommandKind::Open => {
            let account = ledger.create_account(AccountDraft {
                currency_code: required(record.currency, "currency", kind)?,
                owner_name: required(record.owner, "owner", kind)?,
                account_type: required(record.account_type, "account_type", kind)?,
                balance: record.amount.unwrap_or_default(),
            })?;
            tracing::debug!(line, account_number = account.account_number, "account opened");
        }
        CommandKind::Close => ledger.delete_account(required(record.account, "account", kind)?),
        CommandKind::Deposit => {
            ledger.deposit(DepositCommand {
                account_number: required(record.account, "account", kind)?,
                amount: required(record.amount, "amount", kind)?,
            })?;
        }
        CommandKind::Withdraw => {
            ledger.withdraw(WithdrawCommand {
                account_number: required(record.account, "account", kind)?,
                amount: required(record.amount, "amount", kind)?,
            })?;
        }
        CommandKind::Payment => {
            ledger.payment(PaymentCommand {
                sender_account: required(record.account, "account", kind)?,
                receiver_account: required(record.receiver, "receiver", kind)?,
                amount: required(record.amount, "amount", kind)?,
            })?;
        }
    }
    Ok(())
}

fn required<T>(
    value: Option<T>,
    column: &'static str,
    kind: CommandKind,
) -> Result<T, CommandError> {
    value.ok_or(CommandError::MissingColumn { column, kind })
}
