//! Integrity verification: the load protocol and the deletion gate.
//!
//! ## Load
//!
//! `verify_loaded` turns a decoded document into a `Chain` or rejects it
//! wholesale. Records are re-linked from their person text in file order,
//! then, when the document is sealed:
//!
//! 1. the re-linked chain's aggregate hash must equal the stored
//!    `chainHash`, otherwise `Corruption`;
//! 2. the stored `hmac` must authenticate the stored `chainHash` under the
//!    secret, otherwise `Forgery`;
//! 3. with `verify_record_hashes`, every stored `hash`/`previousHash` must
//!    equal its re-derived value, otherwise `RecordCorruption`.
//!
//! An unsealed document is accepted as legacy unless `require_seal` is set.
//!
//! ## Deletion
//!
//! `remove_checked` removes a record, then compares the chain's aggregate
//! hash over stored hashes against the aggregate it would have if every
//! remaining record were re-linked to its current predecessor. They agree
//! only when no surviving record pointed at the removed one, which in
//! practice means the tail. Any other removal is rolled back and rejected
//! with the hash values for diagnosis.

use tracing::{debug, info, warn};

use hashchain_contracts::{LedgerError, LedgerResult, MacSecret};

use crate::{
    chain::Chain,
    codec::ParsedLedger,
    digest::{mac, mac_matches},
    record::ChainRecord,
};

/// Knobs for the load protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyOptions {
    /// Compare each stored per-record hash link with its re-derived value.
    pub verify_record_hashes: bool,
    /// Reject a non-empty document that lacks `chainHash` or `hmac`.
    pub require_seal: bool,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            verify_record_hashes: true,
            require_seal: false,
        }
    }
}

/// Summary of a successful load.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoadReport {
    /// Records in the accepted chain.
    pub records: usize,
    /// Malformed entries dropped by the codec.
    pub dropped: usize,
    /// Whether the document carried a chain hash and HMAC.
    pub sealed: bool,
}

/// Verify a decoded document and build the chain it describes.
///
/// On any error the partially built chain is discarded.
pub fn verify_loaded(
    parsed: ParsedLedger,
    secret: &MacSecret,
    options: VerifyOptions,
) -> LedgerResult<(Chain, LoadReport)> {
    let mut chain = Chain::new();
    for stored in &parsed.records {
        chain.append(stored.person.clone());
    }

    let sealed = parsed.is_sealed();
    match (&parsed.chain_hash, &parsed.hmac) {
        (Some(stored_hash), Some(stored_hmac)) => {
            let computed = chain.aggregate_hash();
            if &computed != stored_hash {
                warn!(stored = %stored_hash, computed = %computed, "chain hash mismatch on load");
                return Err(LedgerError::Corruption {
                    stored: stored_hash.clone(),
                    computed,
                });
            }

            let expected = mac(secret, stored_hash)?;
            if !mac_matches(stored_hmac, &expected) {
                warn!(chain_hash = %stored_hash, "HMAC mismatch on load");
                return Err(LedgerError::Forgery);
            }

            if options.verify_record_hashes {
                check_stored_links(&parsed, &chain)?;
            }
        }
        _ => {
            let has_content = !parsed.records.is_empty()
                || parsed.dropped > 0
                || parsed.chain_hash.is_some()
                || parsed.hmac.is_some();
            if options.require_seal && has_content {
                warn!(records = parsed.records.len(), "refusing unsealed ledger");
                return Err(LedgerError::Unsealed);
            }
            debug!(records = parsed.records.len(), "accepting unsealed ledger");
        }
    }

    let report = LoadReport {
        records: chain.len(),
        dropped: parsed.dropped,
        sealed,
    };
    info!(
        records = report.records,
        dropped = report.dropped,
        sealed = report.sealed,
        "ledger verified"
    );
    Ok((chain, report))
}

fn check_stored_links(parsed: &ParsedLedger, chain: &Chain) -> LedgerResult<()> {
    for (index, (stored, rebuilt)) in parsed.records.iter().zip(chain.records()).enumerate() {
        let hash_ok = stored.hash.as_deref() == Some(rebuilt.hash());
        let prev_ok = stored.previous_hash.as_deref() == rebuilt.previous_hash();
        if !(hash_ok && prev_ok) {
            warn!(index, "stored record link does not match re-derived link");
            return Err(LedgerError::RecordCorruption { index });
        }
    }
    Ok(())
}

/// An accepted deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    pub index: usize,
    pub record: ChainRecord,
    /// Aggregate hash before the removal.
    pub before: String,
    /// Aggregate hash after the removal.
    pub after: String,
}

/// Remove the record at `index` if the remaining chain stays self-consistent.
///
/// On rejection the record is reinserted at `index` and the chain is left
/// exactly as it was.
pub fn remove_checked(chain: &mut Chain, index: usize) -> LedgerResult<Removal> {
    let before = chain.aggregate_hash();
    let record = chain.remove_at(index)?;
    let after = chain.aggregate_hash();
    let expected = chain.relinked_aggregate_hash();

    if after != expected {
        chain.insert_at(index, record);
        warn!(
            index,
            before = %before,
            after = %after,
            expected = %expected,
            "deletion breaks chain integrity, rolled back"
        );
        return Err(LedgerError::DeletionRejected {
            index,
            before,
            after,
            expected,
        });
    }

    info!(index, before = %before, after = %after, "deletion passed integrity check");
    Ok(Removal {
        index,
        record,
        before,
        after,
    })
}
