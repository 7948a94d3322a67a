//! # hashchain-config
//!
//! TOML configuration for the hashchain ledger.
//!
//! ## Overview
//!
//! [`LedgerConfig`] names the ledger and backup files, where the HMAC secret
//! comes from, and which optional load checks are enforced. The secret is
//! resolved once at startup and handed to the ledger explicitly.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use hashchain_config::LedgerConfig;
//!
//! let config = LedgerConfig::from_file(Path::new("hashchain.toml"))?;
//! let secret = config.security.resolve_secret()?;
//! // Pass `secret` and `config.verify_options()` to `hashchain_core::Ledger::open(...)`.
//! ```

pub mod config;
pub mod secret;

pub use config::{LedgerConfig, SecurityConfig, StorageConfig, DEFAULT_SECRET_ENV};

// ── Tests ─────────────────────────────────────────────────────────────────────
