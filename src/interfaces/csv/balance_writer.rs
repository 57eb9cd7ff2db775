use crate::domain::account::{AccountId, Balance};
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct BalanceRow<'a> {
    account: &'a str,
    balance: String,
}

/// Writes `account,balance` rows to any `Write` sink.
pub struct BalanceWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> BalanceWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_balances<'a, I>(&mut self, balances: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a AccountId, Balance)>,
    {
        for (account, balance) in balances {
            self.writer.serialize(BalanceRow {
                account: account.as_str(),
                balance: balance.to_string(),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
