//! Digest engine: SHA-256 content hashes and HMAC-SHA-256 seals.
//!
//! Both functions return lowercase 64-character hex strings, which is the
//! form every hash takes in memory and on disk. Neither function logs,
//! caches, or retains its inputs.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use hashchain_contracts::{LedgerError, LedgerResult, MacSecret};

type HmacSha256 = Hmac<Sha256>;

/// SHA-256 of `bytes` as lowercase hex.
pub fn digest(bytes: impl AsRef<[u8]>) -> String {
    hex::encode(Sha256::digest(bytes.as_ref()))
}

/// HMAC-SHA-256 of `message` under `secret` as lowercase hex.
///
/// Returns `LedgerError::Crypto` only if the MAC cannot be keyed, which is an
/// environment fault rather than a data error.
pub fn mac(secret: &MacSecret, message: impl AsRef<[u8]>) -> LedgerResult<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|e| LedgerError::Crypto {
        reason: format!("failed to key HMAC-SHA-256: {e}"),
    })?;
    mac.update(message.as_ref());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Compare a stored MAC against a freshly computed one.
///
/// Hex decoding accepts either case, so the comparison is case-insensitive.
/// The byte comparison runs in constant time. Values that fail to decode
/// or differ in length never match.
pub fn mac_matches(stored: &str, computed: &str) -> bool {
    let (Ok(expected), Ok(actual)) = (hex::decode(stored.trim()), hex::decode(computed)) else {
        return false;
    };
    if expected.len() != actual.len() {
        return false;
    }
    expected.ct_eq(actual.as_slice()).into()
}
