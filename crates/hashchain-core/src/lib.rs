//! # hashchain-core
//!
//! The tamper-evident ledger runtime.
//!
//! This crate provides:
//! - The digest engine (`digest`, `mac`, `mac_matches`)
//! - `ChainRecord` and `Chain`, with the SHA-256 link rule and aggregate hash
//! - The persistence codec (`encode`, `decode`)
//! - The load protocol and the deletion gate (`verify_loaded`, `remove_checked`)
//! - The `Ledger` session that wires them to a `LedgerStore`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hashchain_core::{Ledger, VerifyOptions};
//!
//! let mut ledger = Ledger::open(Box::new(store), secret, VerifyOptions::default())?;
//! ledger.append(person)?;
//! ledger.delete(ledger.len() - 1)?;
//! ```

pub mod chain;
pub mod codec;
pub mod digest;
pub mod ledger;
pub mod record;
pub mod traits;
pub mod verifier;

pub use chain::Chain;
pub use codec::{decode, encode, ParsedLedger, StoredRecord};
pub use digest::{digest, mac, mac_matches};
pub use ledger::Ledger;
pub use record::{link_hash, ChainRecord};
pub use traits::{ChainEvent, ChainObserver, LedgerStore};
pub use verifier::{remove_checked, verify_loaded, LoadReport, Removal, VerifyOptions};

// ── Tests ─────────────────────────────────────────────────────────────────────
