use crate::domain::account::{AccountId, AccountRecord, Balance};
use crate::domain::ports::{AccountStore, StoreTransaction, TransactionWork};
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use rocksdb::{ErrorKind, OptimisticTransactionDB, Options, Transaction};
use std::path::Path;
use std::sync::Arc;

/// A persistent account store backed by RocksDB optimistic transactions.
///
/// Accounts are keyed by the raw bytes of their identifier and stored as
/// JSON-encoded `AccountRecord`s. Conflict detection is left to RocksDB:
/// keys read through `get_for_update` are validated when the transaction
/// commits.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<OptimisticTransactionDB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);

        let db = OptimisticTransactionDB::open(&opts, path)?;

        Ok(Self { db: Arc::new(db) })
    }
}

fn decode(bytes: &[u8]) -> Result<Balance> {
    let record: AccountRecord =
        serde_json::from_slice(bytes).map_err(LedgerError::store_unavailable)?;
    Ok(record.balance)
}

fn encode(balance: Balance) -> Result<Vec<u8>> {
    serde_json::to_vec(&AccountRecord { balance }).map_err(LedgerError::store_unavailable)
}

/// RocksDB reports a failed optimistic validation as `Busy` (or `TryAgain`
/// when the memtable history is too short to decide).
fn commit_error(err: rocksdb::Error) -> LedgerError {
    match err.kind() {
        ErrorKind::Busy | ErrorKind::TryAgain => LedgerError::Conflict,
        _ => LedgerError::from(err),
    }
}

struct RocksDBTransaction<'t, 'db> {
    txn: &'t Transaction<'db, OptimisticTransactionDB>,
}

impl StoreTransaction for RocksDBTransaction<'_, '_> {
    fn read_for_update(&mut self, account: &AccountId) -> Result<Option<Balance>> {
        self.txn
            .get_for_update(account.as_str().as_bytes(), true)?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    fn write(&mut self, account: &AccountId, balance: Balance) -> Result<()> {
        self.txn.put(account.as_str().as_bytes(), encode(balance)?)?;
        Ok(())
    }
}

#[async_trait]
impl AccountStore for RocksDBStore {
    async fn get(&self, account: &AccountId) -> Result<Option<Balance>> {
        self.db
            .get(account.as_str().as_bytes())?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    async fn run_transaction(&self, work: &mut TransactionWork<'_>) -> Result<Balance> {
        let txn = self.db.transaction();

        // An early return drops `txn`, which rolls it back.
        let value = {
            let mut handle = RocksDBTransaction { txn: &txn };
            let handle: &mut dyn StoreTransaction = &mut handle;
            work(handle)?
        };

        txn.commit().map_err(commit_error)?;
        Ok(value)
    }
}
