//! HMAC secret resolution.

use tracing::debug;

use hashchain_contracts::{LedgerError, LedgerResult, MacSecret};

use crate::config::SecurityConfig;

impl SecurityConfig {
    /// Resolve the secret using the process environment.
    pub fn resolve_secret(&self) -> LedgerResult<MacSecret> {
        self.resolve_secret_with(|name| std::env::var(name).ok())
    }

    /// Resolve the secret, looking environment variables up through `env`.
    ///
    /// Empty values are skipped at every step. A secret file's trailing
    /// newline is not part of the key.
    pub fn resolve_secret_with<F>(&self, env: F) -> LedgerResult<MacSecret>
    where
        F: Fn(&str) -> Option<String>,
    {
        if !self.secret_env.is_empty() {
            if let Some(value) = env(&self.secret_env).filter(|v| !v.is_empty()) {
                debug!(source = "env", variable = %self.secret_env, "HMAC secret resolved");
                return Ok(MacSecret::from(value));
            }
        }

        if let Some(path) = &self.secret_file {
            let contents = std::fs::read_to_string(path).map_err(|e| LedgerError::ConfigError {
                reason: format!("failed to read secret file '{}': {}", path.display(), e),
            })?;
            let trimmed = contents.trim_end_matches(&['\r', '\n'][..]);
            if !trimmed.is_empty() {
                debug!(source = "file", path = %path.display(), "HMAC secret resolved");
                return Ok(MacSecret::from(trimmed));
            }
        }

        if let Some(inline) = self.secret.as_deref().filter(|s| !s.is_empty()) {
            debug!(source = "inline", "HMAC secret resolved");
            return Ok(MacSecret::from(inline));
        }

        Err(LedgerError::ConfigError {
            reason: format!(
                "no HMAC secret configured: set ${}, security.secret_file, or security.secret",
                self.secret_env
            ),
        })
    }
}
