mod amount;
mod dispatch;
mod error;
mod ledger;
mod transactions;

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::dispatch::Dispatcher;
use crate::error::BalanceError;
use crate::ledger::LedgerRegistry;
use crate::transactions::{csv_to_transaction_records, DEFAULT_HEADER_MARKER};

/// Per-asset balances from an exchange transaction report.
#[derive(Parser, Debug)]
#[clap(version)]
struct Args {
    /// Full transaction report CSV exported from the exchange
    #[clap(default_value = "coinbase.csv")]
    transactions_filepath: PathBuf,

    /// Text identifying the header row, lines above it are skipped
    #[clap(long, default_value = DEFAULT_HEADER_MARKER)]
    header_marker: String,

    /// Log filter used when RUST_LOG is not set
    #[clap(long, default_value = "warn")]
    log_level: String,
}

fn init_tracing(log_level: &str) {
    // Logs go to stderr, stdout carries only the report
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<LedgerRegistry, BalanceError> {
    info!(path = %args.transactions_filepath.display(), "reading transactions");
    let records = csv_to_transaction_records(&args.transactions_filepath, &args.header_marker)?;

    let mut registry = LedgerRegistry::default();
    let mut dispatcher = Dispatcher::new(&mut registry);
    dispatcher.process(records)?;
    let processed = dispatcher.processed();
    info!(
        transactions = processed,
        assets = registry.len(),
        "balances calculated"
    );

    for ledger in registry.iter() {
        debug!(asset = ledger.asset(), balance = %ledger.balance(), "final balance");
    }
    Ok(registry)
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(&args.log_level);

    match run(&args) {
        Ok(registry) => {
            println!(
                "Calculated balances for {}",
                args.transactions_filepath.display()
            );
            if !registry.is_empty() {
                println!("{}", registry.summarize());
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::from(&err)
        }
    }
}
