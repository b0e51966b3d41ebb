use std::io::Write;

use csv::Writer;
use serde::Serialize;

use crate::{account::Account, history::Transaction};

pub fn print_accounts<'a, W>(
    output: &mut W,
    accounts: impl Iterator<Item = &'a Account>,
) -> anyhow::Result<()>
where
    W: Write,
{
    print_rows(output, accounts)
}

pub fn print_transactions<'a, W>(
    output: &mut W,
    transactions: impl Iterator<Item = &'a Transaction>,
) -> anyhow::Result<()>
where
    W: Write,
{
    print_rows(output, transactions)
}

fn print_rows<W, T>(output: &mut W, rows: impl Iterator<Item = T>) -> anyhow::Result<()>
where
    W: Write,
    T: Serialize,
{
    let mut writer = Writer::from_writer(output);
    for row in rows {
        if let Err(err) = writer.serialize(row) {
            anyhow::bail!("Failed to write to CSV: {err}")
        }
    }
    // Ensure all data is flushed to the output
    if let Err(err) = writer.flush() {
        anyhow::bail!("Failed to flush CSV writer: {err}")
    }
    Ok(())
}
