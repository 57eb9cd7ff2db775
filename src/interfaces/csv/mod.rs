//! CSV adapters used by the command-line host.

pub mod balance_writer;
pub mod mutation_reader;

pub use balance_writer::BalanceWriter;
pub use mutation_reader::MutationReader;
