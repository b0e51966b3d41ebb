use std::io::Read;

use csv::{Position, StringRecord, StringRecordsIntoIter, Trim};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::types::AccountNumber;

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    Open,
    Close,
    Deposit,
    Withdraw,
    Payment,
}

/// One row of the command file. Which columns are required depends on `kind`.
#[derive(Debug, Deserialize)]
pub struct CommandRecord {
    #[serde(rename = "type")]
    pub kind: CommandKind,
    pub account: Option<AccountNumber>,
    pub receiver: Option<AccountNumber>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub owner: Option<String>,
    pub account_type: Option<String>,
}

/// Parses ledger commands in CSV format, yielding each row with its line number.
pub struct CsvCommandParser<R> {
    headers: StringRecord,
    records: StringRecordsIntoIter<R>,
}

impl<R> CsvCommandParser<R>
where
    R: Read,
{
    pub fn new(source: R) -> csv::Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(source);
        let headers = reader.headers()?.clone();

        Ok(Self {
            headers,
            records: reader.into_records(),
        })
    }
}

impl<R> Iterator for CsvCommandParser<R>
where
    R: Read,
{
    type Item = (u64, csv::Result<CommandRecord>);

    fn next(&mut self) -> Option<Self::Item> {
        let item = match self.records.next()? {
            Ok(record) => (
                record.position().map_or(0, Position::line),
                record.deserialize(Some(&self.headers)),
            ),
            Err(err) => (err.position().map_or(0, Position::line), Err(err)),
        };
        Some(item)
    }
}
