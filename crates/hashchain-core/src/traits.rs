//! Trait seams between the ledger and its collaborators.
//!
//! - `LedgerStore`: where the sealed document lives (file, memory)
//! - `ChainObserver`: who wants to hear about committed chain changes
//!
//! The `Ledger` owns one store and any number of observers.

use hashchain_contracts::LedgerResult;

/// Persistent home of the ledger document.
///
/// Implementations are whole-document: every `write` replaces the previous
/// document entirely.
pub trait LedgerStore: Send + Sync {
    /// Read the current document, or `None` if none has been written yet.
    fn read(&self) -> LedgerResult<Option<String>>;

    /// Replace the stored document with `document`.
    ///
    /// Must either complete fully or return `LedgerError::Io`.
    fn write(&self, document: &str) -> LedgerResult<()>;

    /// Human-readable location for diagnostics (e.g. a file path).
    fn location(&self) -> String;
}

/// A committed change to the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainEvent {
    /// A verified document replaced the in-memory chain.
    Loaded { records: usize },
    /// A record was appended at `index` and persisted.
    Appended { index: usize, hash: String },
    /// The record at `index` was removed and the change persisted.
    Removed { index: usize, hash: String },
}

/// Receives a notification after each committed chain change.
///
/// Observers re-read whatever snapshot they need from the `Ledger`; nothing
/// is bound two-way.
pub trait ChainObserver: Send + Sync {
    fn chain_changed(&self, event: &ChainEvent);
}
