//! The ordered, append-only chain of records.
//!
//! Two invariants hold for a chain built through `append`:
//!
//! 1. **Linkage**: `chain[0].previous_hash()` is `None` and for every
//!    `i > 0`, `chain[i].previous_hash() == Some(chain[i - 1].hash())`.
//! 2. **Aggregate**: `aggregate_hash() == sha256(chain[0].hash ++ chain[1].hash ++ ...)`,
//!    recomputed on every call and never cached.
//!
//! `remove_at` is the one mutation that can break linkage. It does not
//! repair or check anything; the deletion protocol in `verifier` decides
//! whether the removal stands.

use tracing::debug;

use hashchain_contracts::{LedgerError, LedgerResult, PersonRecord};

use crate::{
    digest::digest,
    record::{link_hash, ChainRecord},
};

/// An ordered sequence of `ChainRecord`s. Insertion order is link order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chain {
    records: Vec<ChainRecord>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Link `person` to the current tail and append it.
    ///
    /// No validation of `person` happens here.
    pub fn append(&mut self, person: PersonRecord) -> &ChainRecord {
        let previous_hash = self.tail_hash().map(str::to_owned);
        let record = ChainRecord::new(person, previous_hash);

        debug!(
            index = self.records.len(),
            hash = %record.hash(),
            "appending chain record"
        );

        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    /// SHA-256 over the concatenation of every record hash, in order.
    ///
    /// An empty chain hashes the empty string.
    pub fn aggregate_hash(&self) -> String {
        let concatenated: String = self.records.iter().map(ChainRecord::hash).collect();
        digest(concatenated)
    }

    /// The aggregate hash this chain would have if every record were re-linked
    /// to its current predecessor.
    ///
    /// Equal to `aggregate_hash()` exactly when every stored link is
    /// self-consistent.
    pub fn relinked_aggregate_hash(&self) -> String {
        let mut concatenated = String::new();
        let mut previous: Option<String> = None;
        for record in &self.records {
            let hash = link_hash(record.person(), previous.as_deref());
            concatenated.push_str(&hash);
            previous = Some(hash);
        }
        digest(concatenated)
    }

    /// Index of the first record whose stored `hash` or `previous_hash`
    /// disagrees with the link rule, or `None` when the chain is consistent.
    pub fn verify_links(&self) -> Option<usize> {
        let mut expected_prev: Option<&str> = None;

        for (index, record) in self.records.iter().enumerate() {
            if record.previous_hash() != expected_prev {
                return Some(index);
            }
            if record.hash() != link_hash(record.person(), record.previous_hash()) {
                return Some(index);
            }
            expected_prev = Some(record.hash());
        }

        None
    }

    /// Remove and return the record at `index`.
    ///
    /// Later records keep their stored `previous_hash` values unchanged.
    pub fn remove_at(&mut self, index: usize) -> LedgerResult<ChainRecord> {
        if index >= self.records.len() {
            return Err(LedgerError::IndexOutOfRange {
                index,
                len: self.records.len(),
            });
        }
        Ok(self.records.remove(index))
    }

    /// Put a previously removed record back at `index`.
    pub(crate) fn insert_at(&mut self, index: usize, record: ChainRecord) {
        self.records.insert(index, record);
    }

    pub(crate) fn pop(&mut self) -> Option<ChainRecord> {
        self.records.pop()
    }

    pub fn records(&self) -> &[ChainRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&ChainRecord> {
        self.records.get(index)
    }

    /// Hash of the last record, or `None` for an empty chain.
    pub fn tail_hash(&self) -> Option<&str> {
        self.records.last().map(ChainRecord::hash)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
impl Chain {
    pub(crate) fn from_records(records: Vec<ChainRecord>) -> Self {
        Self { records }
    }
}
