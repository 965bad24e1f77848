use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use wallet_ledger::application::engine::LedgerEngine;
use wallet_ledger::config::{DEFAULT_MAX_ATTEMPTS, LedgerConfig};
use wallet_ledger::domain::ports::WalletStoreBox;
use wallet_ledger::infrastructure::in_memory::InMemoryWalletStore;
use wallet_ledger::interfaces::csv::command_reader::CommandReader;
use wallet_ledger::interfaces::facade::WalletFacade;
use wallet_ledger::interfaces::response_writer::ResponseWriter;
use wallet_ledger::logging;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input commands CSV file (action, wallet, player, amount)
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Conditional-update attempts per credit/debit before reporting contention
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    max_attempts: u32,

    /// Timeout for a single store call in milliseconds (0 disables it)
    #[arg(long, default_value_t = 5000)]
    store_timeout_ms: u64,
}

#[cfg(feature = "storage-rocksdb")]
fn open_store(db_path: Option<PathBuf>) -> Result<WalletStoreBox> {
    use wallet_ledger::infrastructure::rocksdb::RocksDBWalletStore;

    match db_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "using RocksDB wallet store");
            Ok(Box::new(RocksDBWalletStore::open(path).into_diagnostic()?))
        }
        None => Ok(Box::new(InMemoryWalletStore::new())),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_store(db_path: Option<PathBuf>) -> Result<WalletStoreBox> {
    if db_path.is_some() {
        eprintln!(
            "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(Box::new(InMemoryWalletStore::new()))
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    let config = LedgerConfig::new(cli.max_attempts, cli.store_timeout_ms).into_diagnostic()?;
    let store = open_store(cli.db_path)?;
    let facade = WalletFacade::new(Arc::new(LedgerEngine::with_config(store, config)));

    let file = File::open(cli.input).into_diagnostic()?;
    let reader = CommandReader::new(file);
    let stdout = io::stdout();
    let mut writer = ResponseWriter::new(stdout.lock());

    for record in reader.commands() {
        match record {
            Ok(record) => {
                let response = facade.handle(record.into()).await;
                writer.write_response(&response).into_diagnostic()?;
            }
            Err(e) => {
                eprintln!("Error reading command: {}", e);
            }
        }
    }

    writer.flush().into_diagnostic()?;
    Ok(())
}
