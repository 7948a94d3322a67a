//! Chain records.
//!
//! A `ChainRecord` wraps a `PersonRecord` with the SHA-256 hash that commits
//! to it and to its predecessor:
//!
//! ```text
//! hash = sha256(canonical_text(person) ++ previous_hash_or_empty)
//! ```
//!
//! Both hashes are fixed at construction. There are no setters.

use hashchain_contracts::PersonRecord;

use crate::digest::digest;

/// Compute the hash a record with `person` and `previous_hash` must carry.
pub fn link_hash(person: &PersonRecord, previous_hash: Option<&str>) -> String {
    let mut input = person.canonical_text();
    input.push_str(previous_hash.unwrap_or_default());
    digest(input)
}

/// One entry in the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainRecord {
    person: PersonRecord,
    hash: String,
    previous_hash: Option<String>,
}

impl ChainRecord {
    /// Build a record linked to `previous_hash` (`None` for the first record).
    pub fn new(person: PersonRecord, previous_hash: Option<String>) -> Self {
        let hash = link_hash(&person, previous_hash.as_deref());
        Self {
            person,
            hash,
            previous_hash,
        }
    }

    pub fn person(&self) -> &PersonRecord {
        &self.person
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// The predecessor's hash, or `None` for the first record in a chain.
    pub fn previous_hash(&self) -> Option<&str> {
        self.previous_hash.as_deref()
    }
}

#[cfg(test)]
impl ChainRecord {
    /// Assemble a record from arbitrary stored values, bypassing the link rule.
    pub(crate) fn from_stored(person: PersonRecord, hash: String, previous_hash: Option<String>) -> Self {
        Self {
            person,
            hash,
            previous_hash,
        }
    }
}
