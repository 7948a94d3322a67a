//! The shared MAC secret.

use std::fmt;

/// Secret key bytes for the ledger HMAC.
///
/// Threaded explicitly into the ledger at construction time. `Debug` never
/// prints the key.
#[derive(Clone, PartialEq, Eq)]
pub struct MacSecret(Vec<u8>);

impl MacSecret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for MacSecret {
    fn from(s: &str) -> Self {
        Self::new(s.as_bytes())
    }
}

impl From<String> for MacSecret {
    fn from(s: String) -> Self {
        Self::new(s.into_bytes())
    }
}

impl fmt::Debug for MacSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MacSecret(<{} bytes redacted>)", self.0.len())
    }
}
