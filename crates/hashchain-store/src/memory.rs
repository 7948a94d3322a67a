//! In-memory implementation of `LedgerStore`.
//!
//! `InMemoryLedgerStore` keeps the current document and its backup copy in a
//! `Mutex`-guarded state shared through an `Arc`. Clones share state, so a
//! test can hand one clone to a `Ledger` and keep another to inspect or
//! tamper with what was written.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use hashchain_contracts::{LedgerError, LedgerResult};
use hashchain_core::traits::LedgerStore;

// ── Internal mutable state ────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub(crate) struct InMemoryState {
    /// The current document, `None` until the first write.
    pub(crate) document: Option<String>,

    /// Copy of the last successfully written document.
    pub(crate) backup: Option<String>,

    /// Number of successful writes.
    pub(crate) writes: u64,
}

// ── Public store ──────────────────────────────────────────────────────────────

/// An in-memory ledger store with the same backup semantics as the file store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedgerStore {
    pub(crate) state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `document` already stored, as if written by another process.
    pub fn with_document(document: impl Into<String>) -> Self {
        let store = Self::new();
        store.replace_document(document);
        store
    }

    /// The current document.
    pub fn document(&self) -> Option<String> {
        self.lock().ok().and_then(|s| s.document.clone())
    }

    /// The backup copy of the last successful write.
    pub fn backup(&self) -> Option<String> {
        self.lock().ok().and_then(|s| s.backup.clone())
    }

    pub fn write_count(&self) -> u64 {
        self.lock().map(|s| s.writes).unwrap_or_default()
    }

    /// Overwrite the document without touching the backup or write count.
    ///
    /// Simulates an out-of-process edit.
    pub fn replace_document(&self, document: impl Into<String>) {
        if let Ok(mut state) = self.lock() {
            state.document = Some(document.into());
        }
    }

    fn lock(&self) -> LedgerResult<MutexGuard<'_, InMemoryState>> {
        self.state.lock().map_err(|e| LedgerError::Io {
            path: self.location(),
            reason: format!("store state lock poisoned: {}", e),
        })
    }
}

// ── LedgerStore impl ──────────────────────────────────────────────────────────

impl LedgerStore for InMemoryLedgerStore {
    fn read(&self) -> LedgerResult<Option<String>> {
        Ok(self.lock()?.document.clone())
    }

    /// Replace the document, then copy it to the backup slot.
    fn write(&self, document: &str) -> LedgerResult<()> {
        let mut state = self.lock()?;
        state.document = Some(document.to_string());
        state.backup = state.document.clone();
        state.writes += 1;

        debug!(writes = state.writes, bytes = document.len(), "in-memory ledger written");
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
