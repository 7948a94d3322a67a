//! Subcommand handlers.
//!
//! Each handler works on an already verified `Ledger`; a ledger that failed
//! its load checks never reaches this module.

use std::io::{self, BufRead, Write};

use serde::Serialize;

use hashchain_config::LedgerConfig;
use hashchain_contracts::{FingerprintMark, LedgerError, PersonRecord};
use hashchain_core::{ChainRecord, Ledger};
use hashchain_store::FileLedgerStore;

use crate::{open_ledger, AddArgs, CliError};

const SHORT_HASH: usize = 12;

/// Characters the fingerprint mark syntax uses.
const RESERVED_NAME_CHARS: [char; 4] = ['[', ']', ',', '='];

/// One row of `list --json`.
#[derive(Serialize)]
struct RecordView<'a> {
    index: usize,
    hash: &'a str,
    previous_hash: Option<&'a str>,
    person: &'a PersonRecord,
}

pub(crate) fn list(ledger: &Ledger, json: bool) -> Result<(), CliError> {
    if json {
        let rows: Vec<RecordView<'_>> = ledger
            .records()
            .iter()
            .enumerate()
            .map(|(index, r)| RecordView {
                index,
                hash: r.hash(),
                previous_hash: r.previous_hash(),
                person: r.person(),
            })
            .collect();
        let out = serde_json::to_string_pretty(&rows).map_err(|e| CliError::Output(e.to_string()))?;
        println!("{out}");
        return Ok(());
    }

    if ledger.is_empty() {
        println!("The ledger is empty.");
        return Ok(());
    }

    println!(
        "{:>5}  {:<12}  {:<12}  {:<36}  {:<10}  {:<5}  {:>7}",
        "INDEX", "HASH", "PREVIOUS", "NAME", "BORN", "MARK", "QUALITY"
    );
    for (index, record) in ledger.records().iter().enumerate() {
        println!("{}", row(index, record));
    }
    println!();
    println!("Chain hash: {}", ledger.aggregate_hash());
    Ok(())
}

fn row(index: usize, record: &ChainRecord) -> String {
    let person = record.person();
    format!(
        "{:>5}  {:<12}  {:<12}  {:<36}  {:<10}  {:<5}  {:>7}",
        index,
        short(record.hash()),
        record.previous_hash().map(short).unwrap_or("-"),
        person.full_name(),
        person.birth_date.format("%Y-%m-%d").to_string(),
        person.mark.kind.label(),
        person.mark.quality,
    )
}

fn short(hash: &str) -> &str {
    hash.get(..SHORT_HASH).unwrap_or(hash)
}

pub(crate) fn add(ledger: &mut Ledger, args: AddArgs) -> Result<(), CliError> {
    let person = PersonRecord::new(
        name_field("first name", &args.first_name)?,
        name_field("last name", &args.last_name)?,
        name_field("patronymic", &args.patronymic)?,
        args.birth_date,
        FingerprintMark::new(args.x, args.y, args.kind, args.quality),
    );

    let hash = ledger.append(person)?.hash().to_string();
    println!("Appended record {}: {}", ledger.len() - 1, hash);
    println!("Chain hash: {}", ledger.aggregate_hash());
    Ok(())
}

/// Names are stored space-separated, so they must be single non-empty words.
fn name_field(what: &str, value: &str) -> Result<String, CliError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CliError::Input(format!("{what} must not be empty")));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(CliError::Input(format!("{what} must not contain whitespace")));
    }
    if let Some(c) = value.chars().find(|c| RESERVED_NAME_CHARS.contains(c)) {
        return Err(CliError::Input(format!("{what} must not contain '{c}'")));
    }
    Ok(value.to_string())
}

pub(crate) fn delete(ledger: &mut Ledger, index: usize, yes: bool) -> Result<(), CliError> {
    let record = ledger.chain().get(index).ok_or(LedgerError::IndexOutOfRange {
        index,
        len: ledger.len(),
    })?;

    if !yes && !confirm(&format!("Delete record {index} ({})?", record.person().full_name()))? {
        println!("Deletion cancelled.");
        return Ok(());
    }

    let removal = ledger.delete(index)?;
    println!(
        "Deleted record {}: {}",
        removal.index,
        removal.record.person().full_name()
    );
    println!("Chain hash before: {}", removal.before);
    println!("Chain hash after:  {}", removal.after);
    Ok(())
}

fn confirm(question: &str) -> Result<bool, CliError> {
    print!("{question} [y/N] ");
    io::stdout().flush().map_err(|e| CliError::Output(e.to_string()))?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .map_err(|e| CliError::Input(e.to_string()))?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "YES"))
}

pub(crate) fn verify(ledger: &Ledger) -> Result<(), CliError> {
    let report = ledger.load_report();
    println!("Ledger verified.");
    println!("  records: {}", report.records);
    if report.dropped > 0 {
        println!("  dropped malformed entries: {}", report.dropped);
    }
    println!("  sealed: {}", if report.sealed { "yes" } else { "no (legacy or empty file)" });
    println!("  chain hash: {}", ledger.aggregate_hash());
    Ok(())
}

pub(crate) fn restore(config: &LedgerConfig, store: FileLedgerStore) -> Result<(), CliError> {
    if !store.restore_backup()? {
        return Err(CliError::Input(format!(
            "no backup file at '{}'",
            store.backup_path().display()
        )));
    }
    println!("Restored '{}' from '{}'.", store.path().display(), store.backup_path().display());
    verify(&open_ledger(config)?)
}
