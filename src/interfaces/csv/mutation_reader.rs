use crate::domain::account::AccountId;
use crate::domain::mutation::Mutation;
use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use std::io::Read;
use std::str::FromStr;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
enum MutationType {
    Deposit,
    #[serde(alias = "withdrawal")]
    Withdraw,
}

#[derive(Debug, Deserialize)]
struct MutationRow {
    r#type: MutationType,
    account: String,
    #[serde(deserialize_with = "deserialize_decimal")]
    amount: Decimal,
}

/// Parses the raw field text so no digit goes through a float.
fn deserialize_decimal<'de, D>(deserializer: D) -> std::result::Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Decimal::from_str(&raw).map_err(serde::de::Error::custom)
}

impl TryFrom<MutationRow> for Mutation {
    type Error = LedgerError;

    fn try_from(row: MutationRow) -> Result<Self> {
        let account = AccountId::new(row.account)?;
        Ok(match row.r#type {
            MutationType::Deposit => Mutation::deposit(account, row.amount),
            MutationType::Withdraw => Mutation::withdraw(account, row.amount),
        })
    }
}

/// Reads mutation requests from a CSV source with a `type, account, amount` header.
///
/// Whitespace is trimmed and record lengths are flexible. Amounts are passed
/// through unvalidated; the engine decides whether they are acceptable.
pub struct MutationReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> MutationReader<R> {
    /// Creates a new `MutationReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and converts rows.
    pub fn mutations(self) -> impl Iterator<Item = Result<Mutation>> {
        self.reader
            .into_deserialize::<MutationRow>()
            .map(|row| -> Result<Mutation> { Mutation::try_from(row?) })
    }
}
