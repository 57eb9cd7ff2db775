use balance_engine::application::engine::BalanceEngine;
use balance_engine::config::EngineConfig;
use balance_engine::domain::account::AccountId;
use balance_engine::domain::ports::AccountStoreBox;
use balance_engine::infrastructure::in_memory::InMemoryAccountStore;
#[cfg(feature = "storage-rocksdb")]
use balance_engine::infrastructure::rocksdb::RocksDBStore;
use balance_engine::interfaces::csv::{BalanceWriter, MutationReader};
use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply deposits and withdrawals from a CSV file, then print the balances
    Process {
        /// Input CSV file with a `type, account, amount` header
        input: PathBuf,

        /// Maximum number of mutations in flight (1 keeps file order)
        #[arg(long, default_value_t = 1)]
        concurrency: usize,

        /// Transaction attempts per mutation before a conflict is reported
        #[arg(long, default_value_t = EngineConfig::default().max_attempts)]
        max_attempts: u32,
    },
    /// Print the balance of one or more accounts (0 if never seen)
    Balance {
        #[arg(required = true)]
        accounts: Vec<String>,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();
}

/// The store is opened once here and owned by the engine for the life of the process.
fn open_store(db_path: Option<PathBuf>) -> Result<AccountStoreBox> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => Ok(Box::new(RocksDBStore::open(path)?)),
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            warn!(
                "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
            Ok(Box::new(InMemoryAccountStore::new()))
        }
        None => Ok(Box::new(InMemoryAccountStore::new())),
    }
}

async fn process(
    engine: Arc<BalanceEngine>,
    input: PathBuf,
    concurrency: usize,
) -> Result<Vec<AccountId>> {
    let file = File::open(input).into_diagnostic()?;
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();
    let mut touched = BTreeSet::new();

    for (index, result) in MutationReader::new(file).mutations().enumerate() {
        let mutation = match result {
            Ok(mutation) => mutation,
            Err(e) => {
                // +2: header row and 1-based numbering
                warn!(line = index + 2, "Error reading mutation: {}", e);
                continue;
            }
        };

        touched.insert(mutation.account().clone());
        let permit = permits.clone().acquire_owned().await.into_diagnostic()?;
        let engine = engine.clone();
        tasks.spawn(async move {
            let _permit = permit;
            let account = mutation.account().clone();
            if let Err(e) = engine.apply(mutation).await {
                warn!(%account, "Error applying mutation: {}", e);
            }
        });

        while let Some(done) = tasks.try_join_next() {
            done.into_diagnostic()?;
        }
    }

    while let Some(done) = tasks.join_next().await {
        done.into_diagnostic()?;
    }

    Ok(touched.into_iter().collect())
}

async fn print_balances(engine: &BalanceEngine, accounts: &[AccountId]) -> Result<()> {
    let mut balances = Vec::with_capacity(accounts.len());
    for account in accounts {
        balances.push((account, engine.get_balance(account).await?));
    }

    let stdout = io::stdout();
    let mut writer = BalanceWriter::new(stdout.lock());
    writer.write_balances(balances)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let store = open_store(cli.db_path)?;

    match cli.command {
        Command::Process {
            input,
            concurrency,
            max_attempts,
        } => {
            let config = EngineConfig::default().with_max_attempts(max_attempts);
            let engine = Arc::new(BalanceEngine::new(store, config));
            let accounts = process(engine.clone(), input, concurrency).await?;
            print_balances(&engine, &accounts).await
        }
        Command::Balance { accounts } => {
            let accounts = accounts
                .into_iter()
                .map(AccountId::new)
                .collect::<Result<Vec<_>, _>>()?;
            let engine = BalanceEngine::new(store, EngineConfig::default());
            print_balances(&engine, &accounts).await
        }
    }
}
