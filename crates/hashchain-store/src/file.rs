//! File-backed implementation of `LedgerStore`.
//!
//! Each write fully rewrites the primary file. The handle is opened,
//! written, flushed, synced, and dropped inside one scope, so it is released
//! on every exit path. Only after that succeeds is the primary copied over
//! the backup file.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use hashchain_contracts::{LedgerError, LedgerResult};
use hashchain_core::traits::LedgerStore;

/// Default primary document name, relative to the working directory.
pub const DEFAULT_LEDGER_FILE: &str = "hashchain.json";

/// Default backup document name, relative to the working directory.
pub const DEFAULT_BACKUP_FILE: &str = "hashchain_backup.json";

/// A ledger document on disk plus its backup copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLedgerStore {
    path: PathBuf,
    backup_path: PathBuf,
}

impl FileLedgerStore {
    pub fn new(path: impl Into<PathBuf>, backup_path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            backup_path: backup_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }

    /// Read the backup copy, or `None` if there is none.
    pub fn read_backup(&self) -> LedgerResult<Option<String>> {
        read_optional(&self.backup_path)
    }

    /// Copy the backup over the primary document.
    ///
    /// Returns `Ok(false)` when there is no backup to restore.
    pub fn restore_backup(&self) -> LedgerResult<bool> {
        if !self.backup_path.exists() {
            return Ok(false);
        }
        fs::copy(&self.backup_path, &self.path).map_err(|e| io_error(&self.path, &e))?;
        info!(
            path = %self.path.display(),
            backup = %self.backup_path.display(),
            "ledger restored from backup"
        );
        Ok(true)
    }
}

impl LedgerStore for FileLedgerStore {
    fn read(&self) -> LedgerResult<Option<String>> {
        read_optional(&self.path)
    }

    fn write(&self, document: &str) -> LedgerResult<()> {
        {
            let file = File::create(&self.path).map_err(|e| io_error(&self.path, &e))?;
            let mut writer = BufWriter::new(file);
            writer
                .write_all(document.as_bytes())
                .and_then(|()| writer.flush())
                .map_err(|e| io_error(&self.path, &e))?;
            writer
                .get_ref()
                .sync_all()
                .map_err(|e| io_error(&self.path, &e))?;
        }

        fs::copy(&self.path, &self.backup_path).map_err(|e| io_error(&self.backup_path, &e))?;

        debug!(
            path = %self.path.display(),
            backup = %self.backup_path.display(),
            bytes = document.len(),
            "ledger file written"
        );
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

fn read_optional(path: &Path) -> LedgerResult<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_error(path, &e)),
    }
}

fn io_error(path: &Path, e: &io::Error) -> LedgerError {
    LedgerError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}
