//! File plumbing shared by the record store and the notification ledger.
//!
//! Writes refresh the `.bak` sibling from the current primary first, then stage the new
//! content in a temporary file in the same directory and persist it over the primary.
//! The backup is refreshed the same way, so neither file is ever left half-written and
//! the backup is never newer than the primary.

use crate::config::paths::backup_path;
use crate::errors::{Error, Result};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Serializes `value` as pretty JSON and writes it to `path`, refreshing the backup first.
///
/// # Errors
/// Returns [`Error::Serialization`] if encoding fails and [`Error::Storage`] for any
/// filesystem failure. The primary is left untouched in both cases.
pub fn write_json_with_backup<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let body = serde_json::to_string_pretty(value)?;

    if path.exists() {
        refresh_backup(path)?;
    }

    replace_with(path, body.as_bytes())
}

/// Serializes `value` as pretty JSON and swaps it in for `path` without touching the
/// backup. Used when the current primary is known to be corrupt and must not be copied
/// over a good backup.
///
/// # Errors
/// Same as [`write_json_with_backup`].
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let body = serde_json::to_string_pretty(value)?;
    replace_with(path, body.as_bytes())
}

/// Overwrites the backup with the current contents of the primary.
///
/// # Errors
/// Returns [`Error::Storage`] if the primary cannot be read or the backup written. A
/// previous backup stays intact on failure.
pub fn refresh_backup(path: &Path) -> Result<()> {
    let backup = backup_path(path);
    let contents = fs::read(path).map_err(|e| Error::storage(path, e))?;
    replace_with(&backup, &contents)?;
    debug!("Refreshed backup {}", backup.display());
    Ok(())
}

fn replace_with(path: &Path, body: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staged = NamedTempFile::new_in(dir).map_err(|e| Error::storage(path, e))?;
    staged
        .write_all(body)
        .and_then(|()| staged.as_file().sync_all())
        .map_err(|e| Error::storage(staged.path(), e))?;
    staged
        .persist(path)
        .map_err(|e| Error::storage(path, e.error))?;
    Ok(())
}

/// Moves a corrupt primary aside to its `.bak` sibling and returns the new location.
///
/// # Errors
/// Returns [`Error::Storage`] if the rename fails.
pub fn quarantine(path: &Path) -> Result<PathBuf> {
    let backup = backup_path(path);
    if backup.exists() {
        warn!(
            "Previous backup {} is replaced by the corrupt file",
            backup.display()
        );
    }
    fs::rename(path, &backup).map_err(|e| Error::storage(path, e))?;
    warn!(
        "Moved corrupt file {} to {}",
        path.display(),
        backup.display()
    );
    Ok(backup)
}

/// Copies the primary to its backup only if no backup exists yet.
///
/// # Errors
/// Returns [`Error::Storage`] if the copy fails.
pub fn seed_backup(path: &Path) -> Result<bool> {
    if !path.exists() || backup_path(path).exists() {
        return Ok(false);
    }
    refresh_backup(path)?;
    Ok(true)
}
