use crate::domain::account::{AccountId, Amount, Balance};
use miette::Diagnostic;
use rust_decimal::Decimal;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Error, Diagnostic, Debug)]
pub enum LedgerError {
    #[error("Amount must be greater than 0, got {0}")]
    #[diagnostic(code(ledger::invalid_amount))]
    InvalidAmount(Decimal),

    #[error("Account identifier must not be empty")]
    #[diagnostic(code(ledger::invalid_account_id))]
    InvalidAccountId,

    #[error("Account {0} not found")]
    #[diagnostic(code(ledger::account_not_found))]
    AccountNotFound(AccountId),

    #[error("Insufficient funds in account {account}: balance {balance}, requested {requested}")]
    #[diagnostic(code(ledger::insufficient_funds))]
    InsufficientFunds {
        account: AccountId,
        balance: Balance,
        requested: Amount,
    },

    #[error("Deposit would overflow the balance of account {0}")]
    #[diagnostic(code(ledger::balance_overflow))]
    BalanceOverflow(AccountId),

    #[error("Conflicting concurrent update, transaction aborted")]
    #[diagnostic(
        code(ledger::conflict),
        help("another mutation committed first; the request may be retried")
    )]
    Conflict,

    #[error("Account store unavailable: {0}")]
    #[diagnostic(code(ledger::store_unavailable))]
    StoreUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LedgerError {
    /// Only conflicts are transient; everything else is surfaced as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::Conflict)
    }

    pub fn store_unavailable<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        LedgerError::StoreUnavailable(err.into())
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for LedgerError {
    fn from(err: rocksdb::Error) -> Self {
        LedgerError::StoreUnavailable(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_conflict_is_retryable() {
        assert!(LedgerError::Conflict.is_retryable());
        assert!(!LedgerError::InvalidAmount(Decimal::ZERO).is_retryable());
        assert!(!LedgerError::AccountNotFound(AccountId::new("u1").unwrap()).is_retryable());
        assert!(!LedgerError::store_unavailable("disk gone").is_retryable());
        assert!(!LedgerError::BalanceOverflow(AccountId::new("u1").unwrap()).is_retryable());
    }

    #[test]
    fn test_store_unavailable_keeps_source_message() {
        let err = LedgerError::store_unavailable("disk gone");
        assert_eq!(err.to_string(), "Account store unavailable: disk gone");
    }
}
