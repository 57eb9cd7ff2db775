//! Application layer containing the balance mutation logic.
//!
//! This module defines the `BalanceEngine`, the single entry point callers use
//! to read balances and apply deposits or withdrawals. Coordination between
//! concurrent callers is delegated to the account store's transactions.

pub mod engine;
