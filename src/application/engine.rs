use crate::config::EngineConfig;
use crate::domain::account::{AccountId, Amount, Balance};
use crate::domain::mutation::{Mutation, MutationKind};
use crate::domain::ports::{AccountStoreBox, StoreTransaction};
use crate::error::{LedgerError, Result};
use tracing::{debug, warn};

/// The main entry point for balance mutations.
///
/// `BalanceEngine` holds no balances of its own: every call re-reads the
/// authoritative value inside a store transaction, so one engine can be shared
/// (e.g. behind an `Arc`) by any number of concurrent callers.
pub struct BalanceEngine {
    store: AccountStoreBox,
    config: EngineConfig,
}

impl BalanceEngine {
    /// Creates a new `BalanceEngine`.
    ///
    /// # Arguments
    ///
    /// * `store` - The transactional account store.
    /// * `config` - Retry policy for conflicting transactions.
    pub fn new(store: AccountStoreBox, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// Returns the committed balance, or zero for an account never seen.
    pub async fn get_balance(&self, account: &AccountId) -> Result<Balance> {
        Ok(self.store.get(account).await?.unwrap_or(Balance::ZERO))
    }

    /// Validates and atomically commits a deposit or withdrawal.
    ///
    /// Returns the balance committed by this mutation. Conflicts with
    /// concurrent mutations are retried with backoff up to
    /// `EngineConfig::max_attempts` times before `LedgerError::Conflict` is
    /// surfaced; every other failure is returned as-is.
    pub async fn apply(&self, mutation: Mutation) -> Result<Balance> {
        let amount = Amount::new(mutation.amount())?;
        let account = mutation.account();
        let kind = mutation.kind();

        let mut attempt = 1;
        loop {
            match self.try_apply(account, kind, amount).await {
                Ok(balance) => {
                    debug!(%account, ?kind, %amount, %balance, attempt, "Mutation committed");
                    return Ok(balance);
                }
                Err(e) if e.is_retryable() && attempt < self.config.max_attempts => {
                    let delay = self.config.backoff_for(attempt);
                    warn!(
                        %account,
                        error = %e,
                        "Concurrency conflict, retrying in {:?} (attempt {}/{})",
                        delay,
                        attempt,
                        self.config.max_attempts
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    if e.is_retryable() {
                        warn!(%account, attempts = attempt, "Giving up after repeated conflicts");
                    }
                    return Err(e);
                }
            }
        }
    }

    /// One read-compute-write attempt.
    async fn try_apply(
        &self,
        account: &AccountId,
        kind: MutationKind,
        amount: Amount,
    ) -> Result<Balance> {
        let mut work = |txn: &mut dyn StoreTransaction| -> Result<Balance> {
            let current = txn.read_for_update(account)?;
            let new_balance = match kind {
                MutationKind::Deposit => current
                    .unwrap_or(Balance::ZERO)
                    .credit(amount)
                    .ok_or_else(|| LedgerError::BalanceOverflow(account.clone()))?,
                MutationKind::Withdraw => {
                    let current =
                        current.ok_or_else(|| LedgerError::AccountNotFound(account.clone()))?;
                    current
                        .debit(amount)
                        .ok_or_else(|| LedgerError::InsufficientFunds {
                            account: account.clone(),
                            balance: current,
                            requested: amount,
                        })?
                }
            };
            txn.write(account, new_balance)?;
            Ok(new_balance)
        };

        self.store.run_transaction(&mut work).await
    }
}
