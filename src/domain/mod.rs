//! Domain types and the storage port the engine is written against.

pub mod account;
pub mod mutation;
pub mod ports;
