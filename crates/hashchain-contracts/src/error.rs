//! Error types for the hashchain ledger.
//!
//! Every fallible ledger operation returns `LedgerResult<T>`. Variants are
//! grouped by how the caller must react: environment faults (`Io`, `Crypto`,
//! `ConfigError`), integrity faults raised while loading (`Forgery`,
//! `Corruption`, `RecordCorruption`, `Unsealed`), and rejections of a
//! mutation (`DeletionRejected`, `IndexOutOfRange`, `InvalidRecord`).
//!
//! A malformed stored person entry is not a `LedgerError`: the codec drops
//! it locally and reports it as a `MalformedRecord`.

use thiserror::Error;

/// The unified error type for the hashchain ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Reading or writing the persisted ledger failed.
    ///
    /// Fatal: no partial in-memory state is retained.
    #[error("ledger I/O failed for '{path}': {reason}")]
    Io { path: String, reason: String },

    /// The MAC primitive could not be initialized.
    #[error("cryptographic primitive unavailable: {reason}")]
    Crypto { reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// The stored MAC does not authenticate the stored chain hash.
    ///
    /// The file was written without the shared secret, or the MAC itself was
    /// altered.
    #[error("HMAC signature mismatch: the ledger file is forged or its signature is damaged")]
    Forgery,

    /// The chain hash recomputed from the stored records differs from the
    /// stored chain hash.
    #[error("chain hash mismatch: stored {stored}, computed {computed}; the ledger file is corrupted")]
    Corruption { stored: String, computed: String },

    /// A stored per-record `hash` or `previousHash` disagrees with the value
    /// re-derived from the record's person text.
    #[error("record {index} does not match its stored hash link; the ledger file is corrupted")]
    RecordCorruption { index: usize },

    /// The ledger holds records but carries no chain hash or no HMAC.
    #[error("ledger file is not sealed: chainHash or hmac is missing")]
    Unsealed,

    /// A deletion would leave the chain with broken links and was rolled back.
    #[error(
        "deletion of record {index} breaks chain integrity \
         (chain hash before: {before}, after: {after}, expected: {expected}); no changes applied"
    )]
    DeletionRejected {
        index: usize,
        before: String,
        after: String,
        expected: String,
    },

    /// The requested record index does not exist.
    #[error("record index {index} is out of range for a chain of {len} records")]
    IndexOutOfRange { index: usize, len: usize },

    /// A record was refused before saving because its canonical text would
    /// not read back as the same record.
    #[error("record refused: {reason}")]
    InvalidRecord { reason: String },
}

impl LedgerError {
    /// True for faults that mean the persisted ledger must not be trusted.
    pub fn is_integrity_fault(&self) -> bool {
        matches!(
            self,
            LedgerError::Forgery
                | LedgerError::Corruption { .. }
                | LedgerError::RecordCorruption { .. }
                | LedgerError::Unsealed
        )
    }
}

/// Convenience alias used throughout the hashchain crates.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Why a stored person entry could not be parsed back into a `PersonRecord`.
///
/// Only ever produced by canonical-text parsing; the codec drops the entry
/// and keeps loading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed person record: {reason}")]
pub struct MalformedRecord {
    pub reason: String,
}

impl MalformedRecord {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}
