use super::account::{AccountId, Balance};
use crate::error::Result;
use async_trait::async_trait;

/// Operations available to code running inside a store transaction.
///
/// Reads are tracked so the store can detect, at commit time, whether another
/// transaction changed them. Writes are buffered until commit.
pub trait StoreTransaction {
    /// Returns the current balance, or `None` if the account has no record.
    fn read_for_update(&mut self, account: &AccountId) -> Result<Option<Balance>>;

    /// Creates the record if absent, otherwise overwrites it.
    fn write(&mut self, account: &AccountId, balance: Balance) -> Result<()>;
}

/// Body of a transaction. Returning an error discards every buffered write.
pub type TransactionWork<'a> =
    dyn FnMut(&mut dyn StoreTransaction) -> Result<Balance> + Send + 'a;

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Reads the committed balance outside of any transaction.
    async fn get(&self, account: &AccountId) -> Result<Option<Balance>>;

    /// Runs `work` in an optimistic transaction and commits its writes.
    ///
    /// Fails with `LedgerError::Conflict` if anything `work` read was changed
    /// by another committed transaction in the meantime; nothing is applied
    /// in that case.
    async fn run_transaction(&self, work: &mut TransactionWork<'_>) -> Result<Balance>;
}

pub type AccountStoreBox = Box<dyn AccountStore>;
