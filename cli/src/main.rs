//! hashchain: operator CLI for the tamper-evident person ledger.
//!
//! Every invocation loads the ledger file, verifies its HMAC seal and chain
//! hash, and refuses to go further if either check fails.
//!
//! Usage:
//!   HASHCHAIN_HMAC_SECRET=... hashchain list
//!   hashchain add --first-name Ivan --last-name Ivanov --patronymic Ivanovich \
//!       --birth-date 1990-05-17 --x 12 --y -4 --kind core --quality 87
//!   hashchain delete 2
//!   hashchain verify

mod commands;

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hashchain_config::LedgerConfig;
use hashchain_contracts::{LedgerError, LedgerResult, MarkKind};
use hashchain_core::{ChainEvent, ChainObserver, Ledger};
use hashchain_store::FileLedgerStore;

/// Config file picked up from the working directory when `--config` is absent.
const DEFAULT_CONFIG_FILE: &str = "hashchain.toml";

// ── CLI definition ────────────────────────────────────────────────────────────

/// Tamper-evident, HMAC-sealed ledger of person records.
#[derive(Parser)]
#[command(
    name = "hashchain",
    about = "Tamper-evident hash-chain ledger of person records",
    long_about = "Maintains a SHA-256 hash chain of person records in a file sealed with\n\
                  HMAC-SHA-256. Out-of-process edits are detected on every load."
)]
struct Cli {
    /// TOML config file (defaults to ./hashchain.toml when present).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Ledger file, overriding the configured path. The backup is kept next to it.
    #[arg(long, global = true, value_name = "FILE")]
    ledger: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show every record in chain order.
    List {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Append a person record and save the ledger.
    Add(AddArgs),
    /// Delete a record, if the chain stays intact without it.
    Delete {
        /// Zero-based record index, as shown by `list`.
        index: usize,
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },
    /// Load the ledger, verify it, and report the outcome.
    Verify,
    /// Print the current chain hash.
    Hash,
    /// Replace the ledger file with its backup copy, then verify it.
    Restore,
}

#[derive(Args)]
struct AddArgs {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    patronymic: String,
    /// Date of birth, YYYY-MM-DD.
    #[arg(long)]
    birth_date: NaiveDate,
    /// Mark X coordinate.
    #[arg(long, allow_negative_numbers = true)]
    x: i32,
    /// Mark Y coordinate.
    #[arg(long, allow_negative_numbers = true)]
    y: i32,
    /// Mark kind: point, core, or delta.
    #[arg(long, value_parser = parse_kind)]
    kind: MarkKind,
    /// Mark quality score.
    #[arg(long, allow_negative_numbers = true)]
    quality: i32,
}

fn parse_kind(s: &str) -> Result<MarkKind, String> {
    s.trim()
        .to_ascii_uppercase()
        .parse::<MarkKind>()
        .map_err(|_| format!("'{s}' is not one of: point, core, delta"))
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Ledger(#[from] LedgerError),

    #[error("invalid input: {0}")]
    Input(String),

    #[error("output failed: {0}")]
    Output(String),
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Initialize structured logging.  Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        match &e {
            CliError::Ledger(err) if err.is_integrity_fault() => {
                eprintln!("Ledger rejected: {e}");
                eprintln!("The ledger file was not loaded. Restore it from backup or investigate the edit.");
            }
            _ => eprintln!("Error: {e}"),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(cli.config.as_deref(), cli.ledger.as_deref())?;

    match cli.command {
        Command::List { json } => commands::list(&open_ledger(&config)?, json),
        Command::Add(args) => commands::add(&mut open_ledger(&config)?, args),
        Command::Delete { index, yes } => commands::delete(&mut open_ledger(&config)?, index, yes),
        Command::Verify => commands::verify(&open_ledger(&config)?),
        Command::Hash => {
            println!("{}", open_ledger(&config)?.aggregate_hash());
            Ok(())
        }
        Command::Restore => commands::restore(&config, file_store(&config)),
    }
}

// ── Wiring ────────────────────────────────────────────────────────────────────

fn load_config(path: Option<&Path>, ledger: Option<&Path>) -> LedgerResult<LedgerConfig> {
    let mut config = match path {
        Some(path) => LedgerConfig::from_file(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            LedgerConfig::from_file(Path::new(DEFAULT_CONFIG_FILE))?
        }
        None => LedgerConfig::default(),
    };

    if let Some(ledger) = ledger {
        config.storage.path = ledger.to_path_buf();
        config.storage.backup_path = backup_path_for(ledger);
    }
    Ok(config)
}

/// `dir/name.ext` → `dir/name_backup.ext`.
fn backup_path_for(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "hashchain".to_string());
    let name = match path.extension() {
        Some(ext) => format!("{stem}_backup.{}", ext.to_string_lossy()),
        None => format!("{stem}_backup"),
    };
    path.with_file_name(name)
}

fn file_store(config: &LedgerConfig) -> FileLedgerStore {
    FileLedgerStore::new(&config.storage.path, &config.storage.backup_path)
}

fn open_ledger(config: &LedgerConfig) -> LedgerResult<Ledger> {
    let secret = config.security.resolve_secret()?;
    let mut ledger = Ledger::open(Box::new(file_store(config)), secret, config.verify_options())?;
    ledger.subscribe(Box::new(LogObserver));
    Ok(ledger)
}

/// Logs each committed chain change.
struct LogObserver;

impl ChainObserver for LogObserver {
    fn chain_changed(&self, event: &ChainEvent) {
        match event {
            ChainEvent::Loaded { records } => info!(records, "chain loaded"),
            ChainEvent::Appended { index, hash } => info!(index, hash = %hash, "chain appended"),
            ChainEvent::Removed { index, hash } => info!(index, hash = %hash, "chain record removed"),
        }
    }
}
