use super::account::AccountId;
use rust_decimal::Decimal;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MutationKind {
    Deposit,
    Withdraw,
}

/// A request to change one account's balance.
///
/// The amount is carried exactly as the caller supplied it; the engine
/// validates it before opening a transaction.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Mutation {
    Deposit { account: AccountId, amount: Decimal },
    Withdraw { account: AccountId, amount: Decimal },
}

impl Mutation {
    pub fn deposit(account: AccountId, amount: Decimal) -> Self {
        Mutation::Deposit { account, amount }
    }

    pub fn withdraw(account: AccountId, amount: Decimal) -> Self {
        Mutation::Withdraw { account, amount }
    }

    pub fn account(&self) -> &AccountId {
        match self {
            Mutation::Deposit { account, .. } | Mutation::Withdraw { account, .. } => account,
        }
    }

    pub fn amount(&self) -> Decimal {
        match self {
            Mutation::Deposit { amount, .. } | Mutation::Withdraw { amount, .. } => *amount,
        }
    }

    pub fn kind(&self) -> MutationKind {
        match self {
            Mutation::Deposit { .. } => MutationKind::Deposit,
            Mutation::Withdraw { .. } => MutationKind::Withdraw,
        }
    }
}
