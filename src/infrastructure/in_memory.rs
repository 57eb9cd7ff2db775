use crate::domain::account::{AccountId, Balance};
use crate::domain::ports::{AccountStore, StoreTransaction, TransactionWork};
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Version 0 stands for "no record".
const ABSENT: u64 = 0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct VersionedBalance {
    balance: Balance,
    version: u64,
}

type Accounts = HashMap<AccountId, VersionedBalance>;

/// A thread-safe in-memory account store with optimistic transactions.
///
/// Every record carries a version bumped on each commit. A transaction reads
/// under a shared lock, remembers the versions it saw, and commits under the
/// exclusive lock only if none of them moved.
#[derive(Default, Clone)]
pub struct InMemoryAccountStore {
    accounts: Arc<RwLock<Accounts>>,
}

impl InMemoryAccountStore {
    /// Creates a new, empty in-memory account store.
    pub fn new() -> Self {
        Self::default()
    }

    async fn commit(&self, changes: ChangeSet) -> Result<()> {
        let mut accounts = self.accounts.write().await;

        for (account, seen) in &changes.read_set {
            let current = accounts.get(account).map_or(ABSENT, |r| r.version);
            if current != *seen {
                return Err(LedgerError::Conflict);
            }
        }

        for (account, balance) in changes.write_set {
            let record = accounts.entry(account).or_insert(VersionedBalance {
                balance: Balance::ZERO,
                version: ABSENT,
            });
            record.balance = balance;
            record.version += 1;
        }

        Ok(())
    }
}

#[cfg(test)]
impl InMemoryAccountStore {
    /// Holds a shared guard: transactions still read, but every commit
    /// waits until the guard is dropped.
    pub(crate) async fn stall_commits(&self) -> tokio::sync::OwnedRwLockReadGuard<Accounts> {
        self.accounts.clone().read_owned().await
    }

    pub(crate) async fn version_of(&self, account: &AccountId) -> u64 {
        let accounts = self.accounts.read().await;
        accounts.get(account).map_or(ABSENT, |r| r.version)
    }
}

#[derive(Debug, Default)]
struct ChangeSet {
    read_set: HashMap<AccountId, u64>,
    write_set: HashMap<AccountId, Balance>,
}

struct InMemoryTransaction<'a> {
    accounts: &'a Accounts,
    changes: ChangeSet,
}

impl StoreTransaction for InMemoryTransaction<'_> {
    fn read_for_update(&mut self, account: &AccountId) -> Result<Option<Balance>> {
        if let Some(balance) = self.changes.write_set.get(account) {
            return Ok(Some(*balance));
        }

        let record = self.accounts.get(account);
        self.changes
            .read_set
            .entry(account.clone())
            .or_insert_with(|| record.map_or(ABSENT, |r| r.version));
        Ok(record.map(|r| r.balance))
    }

    fn write(&mut self, account: &AccountId, balance: Balance) -> Result<()> {
        self.changes.write_set.insert(account.clone(), balance);
        Ok(())
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn get(&self, account: &AccountId) -> Result<Option<Balance>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(account).map(|r| r.balance))
    }

    async fn run_transaction(&self, work: &mut TransactionWork<'_>) -> Result<Balance> {
        let (value, changes) = {
            let accounts = self.accounts.read().await;
            let mut txn = InMemoryTransaction {
                accounts: &accounts,
                changes: ChangeSet::default(),
            };
            let handle: &mut dyn StoreTransaction = &mut txn;
            let value = work(handle)?;
            (value, txn.changes)
        };

        // Another writer may slip in here; `commit` detects it.
        self.commit(changes).await?;
        Ok(value)
    }
}
