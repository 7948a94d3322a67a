//! The ledger session: one chain, one store, one secret.
//!
//! `Ledger` is the only entry point that mutates persisted state. Every
//! mutation follows the same order:
//!
//!   mutate in memory → encode + seal → store.write → notify observers
//!
//! If the write fails the in-memory mutation is undone before the error is
//! returned, so memory never runs ahead of the stored document.

use tracing::{debug, info, warn};

use hashchain_contracts::{LedgerError, LedgerResult, MacSecret, PersonRecord};

use crate::{
    chain::Chain,
    codec::{decode, encode},
    record::ChainRecord,
    traits::{ChainEvent, ChainObserver, LedgerStore},
    verifier::{remove_checked, verify_loaded, LoadReport, Removal, VerifyOptions},
};

/// A verified, persisted hash-chain ledger.
pub struct Ledger {
    chain: Chain,
    store: Box<dyn LedgerStore>,
    secret: MacSecret,
    options: VerifyOptions,
    observers: Vec<Box<dyn ChainObserver>>,
    load_report: LoadReport,
}

impl Ledger {
    /// Load and verify the document in `store`.
    ///
    /// A missing document yields an empty ledger. Any integrity or I/O fault
    /// is returned and no `Ledger` is built.
    pub fn open(
        store: Box<dyn LedgerStore>,
        secret: MacSecret,
        options: VerifyOptions,
    ) -> LedgerResult<Self> {
        let (chain, load_report) = load(store.as_ref(), &secret, options)?;
        Ok(Self {
            chain,
            store,
            secret,
            options,
            observers: Vec::new(),
            load_report,
        })
    }

    /// Re-run the load protocol against the store.
    ///
    /// On failure the in-memory chain is cleared and the error returned.
    pub fn reload(&mut self) -> LedgerResult<LoadReport> {
        match load(self.store.as_ref(), &self.secret, self.options) {
            Ok((chain, report)) => {
                self.chain = chain;
                self.load_report = report.clone();
                self.notify(&ChainEvent::Loaded {
                    records: report.records,
                });
                Ok(report)
            }
            Err(e) => {
                self.chain = Chain::new();
                self.load_report = LoadReport::default();
                Err(e)
            }
        }
    }

    /// Append `person` to the chain and persist the ledger.
    ///
    /// A record whose canonical text would not read back unchanged is refused
    /// with `LedgerError::InvalidRecord`, leaving memory and storage untouched.
    pub fn append(&mut self, person: PersonRecord) -> LedgerResult<&ChainRecord> {
        if let Err(e) = person.ensure_readable() {
            warn!(reason = %e.reason, "record refused before append");
            return Err(LedgerError::InvalidRecord { reason: e.reason });
        }

        self.chain.append(person);

        if let Err(e) = self.persist() {
            self.chain.pop();
            warn!(error = %e, "persist failed, append undone");
            return Err(e);
        }

        let index = self.chain.len() - 1;
        let record = &self.chain.records()[index];
        info!(index, hash = %record.hash(), "record appended");
        let event = ChainEvent::Appended {
            index,
            hash: record.hash().to_string(),
        };
        self.notify(&event);

        Ok(&self.chain.records()[index])
    }

    /// Delete the record at `index` if the chain stays intact, then persist.
    ///
    /// A rejected deletion leaves memory and storage untouched.
    pub fn delete(&mut self, index: usize) -> LedgerResult<Removal> {
        let removal = remove_checked(&mut self.chain, index)?;

        if let Err(e) = self.persist() {
            warn!(index, error = %e, "persist failed, deletion undone");
            self.chain.insert_at(removal.index, removal.record);
            return Err(e);
        }

        self.notify(&ChainEvent::Removed {
            index,
            hash: removal.record.hash().to_string(),
        });
        Ok(removal)
    }

    /// Register an observer for subsequent committed changes.
    pub fn subscribe(&mut self, observer: Box<dyn ChainObserver>) {
        self.observers.push(observer);
    }

    pub fn records(&self) -> &[ChainRecord] {
        self.chain.records()
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    pub fn aggregate_hash(&self) -> String {
        self.chain.aggregate_hash()
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Outcome of the most recent successful load.
    pub fn load_report(&self) -> &LoadReport {
        &self.load_report
    }

    fn persist(&self) -> LedgerResult<()> {
        let document = encode(&self.chain, &self.secret)?;
        self.store.write(&document)?;
        debug!(location = %self.store.location(), records = self.chain.len(), "ledger persisted");
        Ok(())
    }

    fn notify(&self, event: &ChainEvent) {
        for observer in &self.observers {
            observer.chain_changed(event);
        }
    }
}

fn load(
    store: &dyn LedgerStore,
    secret: &MacSecret,
    options: VerifyOptions,
) -> LedgerResult<(Chain, LoadReport)> {
    match store.read()? {
        None => {
            info!(location = %store.location(), "no ledger document, starting empty");
            Ok((Chain::new(), LoadReport::default()))
        }
        Some(text) => verify_loaded(decode(&text), secret, options),
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
