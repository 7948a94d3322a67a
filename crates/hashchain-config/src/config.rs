//! Configuration schema.
//!
//! A `LedgerConfig` is deserialized from TOML. Every key is optional and
//! falls back to the defaults shown below.
//!
//! ```toml
//! [storage]
//! path = "hashchain.json"
//! backup_path = "hashchain_backup.json"
//!
//! [security]
//! secret_env = "HASHCHAIN_HMAC_SECRET"
//! secret_file = "/etc/hashchain/secret"
//! secret = "inline secret, for development only"
//! verify_record_hashes = true
//! require_seal = false
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use hashchain_contracts::{LedgerError, LedgerResult};
use hashchain_core::VerifyOptions;

/// Environment variable consulted for the secret when `secret_env` is unset.
pub const DEFAULT_SECRET_ENV: &str = "HASHCHAIN_HMAC_SECRET";

/// Where the ledger document and its backup live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    pub path: PathBuf,
    pub backup_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("hashchain.json"),
            backup_path: PathBuf::from("hashchain_backup.json"),
        }
    }
}

/// Secret sources and verification switches.
///
/// The secret is looked up in order: the environment variable named by
/// `secret_env`, then the contents of `secret_file`, then `secret`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SecurityConfig {
    pub secret_env: String,
    pub secret_file: Option<PathBuf>,
    pub secret: Option<String>,
    pub verify_record_hashes: bool,
    pub require_seal: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        let options = VerifyOptions::default();
        Self {
            secret_env: DEFAULT_SECRET_ENV.to_string(),
            secret_file: None,
            secret: None,
            verify_record_hashes: options.verify_record_hashes,
            require_seal: options.require_seal,
        }
    }
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("secret_env", &self.secret_env)
            .field("secret_file", &self.secret_file)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("verify_record_hashes", &self.verify_record_hashes)
            .field("require_seal", &self.require_seal)
            .finish()
    }
}

/// The top-level structure deserialized from a TOML config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LedgerConfig {
    pub storage: StorageConfig,
    pub security: SecurityConfig,
}

impl LedgerConfig {
    /// Parse `s` as TOML.
    ///
    /// Returns `LedgerError::ConfigError` if the TOML is malformed or has
    /// keys this schema does not know.
    pub fn from_toml_str(s: &str) -> LedgerResult<Self> {
        toml::from_str(s).map_err(|e| LedgerError::ConfigError {
            reason: format!("failed to parse config TOML: {}", e),
        })
    }

    /// Read the file at `path` and parse it as TOML.
    pub fn from_file(path: &Path) -> LedgerResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| LedgerError::ConfigError {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// The load-protocol switches carried by `[security]`.
    pub fn verify_options(&self) -> VerifyOptions {
        VerifyOptions {
            verify_record_hashes: self.security.verify_record_hashes,
            require_seal: self.security.require_seal,
        }
    }
}
