//! # hashchain-store
//!
//! Document stores for the hashchain ledger.
//!
//! ## Overview
//!
//! A `LedgerStore` holds one sealed ledger document. Two implementations
//! live here:
//!
//! - `FileLedgerStore` rewrites a file on every save and then copies it
//!   over a backup file.
//! - `InMemoryLedgerStore` keeps the same two slots in memory, for tests and
//!   embedding.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hashchain_core::{Ledger, VerifyOptions};
//! use hashchain_store::FileLedgerStore;
//!
//! let store = FileLedgerStore::new("hashchain.json", "hashchain_backup.json");
//! let mut ledger = Ledger::open(Box::new(store), secret, VerifyOptions::default())?;
//! ledger.append(person)?;
//! ```

pub mod file;
pub mod memory;

pub use file::{FileLedgerStore, DEFAULT_BACKUP_FILE, DEFAULT_LEDGER_FILE};
pub use memory::InMemoryLedgerStore;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::NaiveDate;
    use tempfile::TempDir;

    use hashchain_contracts::{
        FingerprintMark, LedgerError, LedgerResult, MacSecret, MarkKind, PersonRecord,
    };
    use hashchain_core::{traits::LedgerStore, Ledger, VerifyOptions};

    use super::{FileLedgerStore, InMemoryLedgerStore};

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn secret() -> MacSecret {
        MacSecret::from("store-test-secret")
    }

    fn person(first: &str, kind: MarkKind) -> PersonRecord {
        PersonRecord::new(
            first,
            "Kuznetsov",
            "Andreevich",
            NaiveDate::from_ymd_opt(1979, 8, 14).unwrap(),
            FingerprintMark::new(3, 7, kind, 90),
        )
    }

    fn file_store(dir: &TempDir) -> FileLedgerStore {
        FileLedgerStore::new(
            dir.path().join("hashchain.json"),
            dir.path().join("hashchain_backup.json"),
        )
    }

    fn open(store: impl LedgerStore + 'static) -> LedgerResult<Ledger> {
        Ledger::open(Box::new(store), secret(), VerifyOptions::default())
    }

    /// A ledger holding A, B, C persisted to a fresh file store.
    fn seeded(dir: &TempDir) -> Ledger {
        let mut ledger = open(file_store(dir)).unwrap();
        ledger.append(person("Alexei", MarkKind::Point)).unwrap();
        ledger.append(person("Boris", MarkKind::Core)).unwrap();
        ledger.append(person("Clara", MarkKind::Delta)).unwrap();
        ledger
    }

    fn first_names(ledger: &Ledger) -> Vec<String> {
        ledger
            .records()
            .iter()
            .map(|r| r.person().first_name.clone())
            .collect()
    }

    /// Change the last hex digit in the value of the line starting with `label`.
    fn flip_field(document: &str, label: &str) -> String {
        document
            .lines()
            .map(|line| {
                if !line.trim_start().starts_with(label) {
                    return format!("{line}\n");
                }
                let close = line.rfind('"').unwrap();
                let mut bytes = line.as_bytes().to_vec();
                bytes[close - 1] = if bytes[close - 1] == b'a' { b'b' } else { b'a' };
                format!("{}\n", String::from_utf8(bytes).unwrap())
            })
            .collect()
    }

    // ── File store ────────────────────────────────────────────────────────────

    /// No file means no document, not an error.
    #[test]
    fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        let store = file_store(&dir);
        assert_eq!(store.read().unwrap(), None);
        assert_eq!(store.read_backup().unwrap(), None);
        assert!(!store.restore_backup().unwrap());
    }

    /// Every write leaves a byte-identical backup.
    #[test]
    fn test_write_creates_identical_backup() {
        let dir = TempDir::new().unwrap();
        let store = file_store(&dir);

        store.write("first document\n").unwrap();
        store.write("second document\n").unwrap();

        let primary = fs::read(store.path()).unwrap();
        let backup = fs::read(store.backup_path()).unwrap();
        assert_eq!(primary, b"second document\n");
        assert_eq!(primary, backup);
    }

    /// Writing into a missing directory surfaces an I/O error with the path.
    #[test]
    fn test_write_failure_is_io_error() {
        let dir = TempDir::new().unwrap();
        let store = FileLedgerStore::new(
            dir.path().join("missing").join("hashchain.json"),
            dir.path().join("backup.json"),
        );
        match store.write("doc") {
            Err(LedgerError::Io { path, .. }) => assert!(path.contains("missing")),
            other => panic!("expected Io error, got {:?}", other),
        }
    }

    /// A damaged primary can be replaced by the backup.
    #[test]
    fn test_restore_backup_recovers_ledger() {
        let dir = TempDir::new().unwrap();
        let original = seeded(&dir);
        let store = file_store(&dir);

        fs::write(store.path(), "garbage").unwrap();
        assert!(store.restore_backup().unwrap());

        let restored = open(store).unwrap();
        assert_eq!(restored.records(), original.records());
    }

    // ── Ledger over a file store ──────────────────────────────────────────────

    /// Scenario: append A, B, C; delete C; reload yields [A, B].
    #[test]
    fn test_delete_tail_persists_across_reload() {
        let dir = TempDir::new().unwrap();
        let mut ledger = seeded(&dir);
        let h1 = ledger.aggregate_hash();

        let removal = ledger.delete(2).unwrap();
        assert_ne!(removal.after, h1);

        let reloaded = open(file_store(&dir)).unwrap();
        assert_eq!(first_names(&reloaded), ["Alexei", "Boris"]);
        assert_eq!(reloaded.aggregate_hash(), removal.after);
        assert!(reloaded.load_report().sealed);
    }

    /// A refused append leaves the file as it was and every earlier record
    /// readable.
    #[test]
    fn test_unreadable_record_never_reaches_disk() {
        let dir = TempDir::new().unwrap();
        let mut ledger = seeded(&dir);
        let store = file_store(&dir);
        let before = fs::read(store.path()).unwrap();

        let record = PersonRecord::new(
            "Boris",
            "Fingerprint[",
            "Olegovich",
            NaiveDate::from_ymd_opt(1990, 1, 2).unwrap(),
            FingerprintMark::new(1, 2, MarkKind::Core, 50),
        );
        let err = ledger.append(record).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidRecord { .. }));
        assert_eq!(fs::read(store.path()).unwrap(), before);

        let reloaded = open(file_store(&dir)).unwrap();
        assert_eq!(first_names(&reloaded), ["Alexei", "Boris", "Clara"]);
    }

    /// Scenario: deleting A from [A, B, C] fails and the file is untouched.
    #[test]
    fn test_delete_head_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let mut ledger = seeded(&dir);
        let store = file_store(&dir);
        let before = fs::read(store.path()).unwrap();

        let err = ledger.delete(0).unwrap_err();
        assert!(matches!(err, LedgerError::DeletionRejected { .. }));
        assert_eq!(first_names(&ledger), ["Alexei", "Boris", "Clara"]);
        assert_eq!(fs::read(store.path()).unwrap(), before);
    }

    /// The persisted file decodes back to the same chain it was written from.
    #[test]
    fn test_reload_restores_every_field() {
        let dir = TempDir::new().unwrap();
        let ledger = seeded(&dir);
        let reloaded = open(file_store(&dir)).unwrap();
        assert_eq!(reloaded.records(), ledger.records());
    }

    /// Flipping one character of `chainHash` on disk is corruption.
    #[test]
    fn test_tampered_chain_hash_on_disk() {
        let dir = TempDir::new().unwrap();
        seeded(&dir);
        let store = file_store(&dir);
        let document = fs::read_to_string(store.path()).unwrap();
        fs::write(store.path(), flip_field(&document, "\"chainHash\"")).unwrap();

        let err = open(store).err().unwrap();
        assert!(matches!(err, LedgerError::Corruption { .. }), "got {err:?}");
    }

    /// Flipping one character of `hmac` on disk is forgery.
    #[test]
    fn test_tampered_hmac_on_disk() {
        let dir = TempDir::new().unwrap();
        seeded(&dir);
        let store = file_store(&dir);
        let document = fs::read_to_string(store.path()).unwrap();
        fs::write(store.path(), flip_field(&document, "\"hmac\"")).unwrap();

        let err = open(store).err().unwrap();
        assert_eq!(err, LedgerError::Forgery);
    }

    /// A ledger written under one secret does not open under another.
    #[test]
    fn test_other_secret_rejected() {
        let dir = TempDir::new().unwrap();
        seeded(&dir);
        let err = Ledger::open(
            Box::new(file_store(&dir)),
            MacSecret::from("someone-else"),
            VerifyOptions::default(),
        )
        .err()
        .unwrap();
        assert_eq!(err, LedgerError::Forgery);
    }

    /// A document that is not UTF-8 cannot be read at all.
    #[test]
    fn test_unreadable_document_is_io_error() {
        let dir = TempDir::new().unwrap();
        let store = file_store(&dir);
        fs::write(store.path(), [0xff, 0xfe, 0x00]).unwrap();
        assert!(matches!(open(store).err().unwrap(), LedgerError::Io { .. }));
    }

    // ── In-memory store ───────────────────────────────────────────────────────

    #[test]
    fn test_memory_store_tracks_writes_and_backup() {
        let store = InMemoryLedgerStore::new();
        let mut ledger = open(store.clone()).unwrap();
        ledger.append(person("Alexei", MarkKind::Point)).unwrap();
        ledger.append(person("Boris", MarkKind::Core)).unwrap();

        assert_eq!(store.write_count(), 2);
        assert_eq!(store.document(), store.backup());
    }

    /// An out-of-process edit is detected on the next open.
    #[test]
    fn test_memory_store_external_edit_detected() {
        let store = InMemoryLedgerStore::new();
        let mut ledger = open(store.clone()).unwrap();
        ledger.append(person("Alexei", MarkKind::Point)).unwrap();

        let edited = store.document().unwrap().replace("Alexei", "Aleksei");
        let tampered = InMemoryLedgerStore::with_document(edited);

        assert!(open(tampered).err().unwrap().is_integrity_fault());
        assert_eq!(store.write_count(), 1);
    }

    /// An empty sealed ledger round-trips through the memory store.
    #[test]
    fn test_memory_store_empty_after_deleting_everything() {
        let store = InMemoryLedgerStore::new();
        let mut ledger = open(store.clone()).unwrap();
        ledger.append(person("Alexei", MarkKind::Point)).unwrap();
        ledger.delete(0).unwrap();

        let reopened = open(store).unwrap();
        assert!(reopened.is_empty());
        assert!(reopened.load_report().sealed);
    }
}
