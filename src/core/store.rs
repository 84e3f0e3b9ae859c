//! Application record store - Loads and saves the application list.
//!
//! The store is stateless between calls; callers own the list they loaded and must save
//! it again after changing it. Loading never fails: a missing file is created empty, a
//! corrupt file is moved aside to its `.bak` sibling, and malformed entries are dropped.

use crate::core::storage::{quarantine, write_json_with_backup};
use crate::entities::ApplicationRecord;
use crate::errors::{Error, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{error, info, instrument, warn};

/// Durable storage for the application list.
pub trait RecordStore {
    /// Reads every valid record. Never fails; problems are logged and yield an empty or
    /// filtered list.
    fn load(&self) -> Vec<ApplicationRecord>;

    /// Replaces the stored list with `records`.
    ///
    /// # Errors
    /// Returns an error if the list could not be written; the previous content stays
    /// in place.
    fn save(&self, records: &[ApplicationRecord]) -> Result<()>;
}

/// [`RecordStore`] backed by a pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store reading and writing `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File this store persists to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_list(&self) -> Result<Vec<Value>> {
        let contents =
            std::fs::read_to_string(&self.path).map_err(|e| Error::storage(&self.path, e))?;

        let corrupt = |reason: String| Error::StorageCorrupt {
            path: self.path.clone(),
            reason,
        };
        match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Array(items)) => Ok(items),
            Ok(_) => Err(corrupt("top-level value is not a list".to_string())),
            Err(e) => Err(corrupt(e.to_string())),
        }
    }
}

impl RecordStore for JsonFileStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Vec<ApplicationRecord> {
        info!("Loading applications");

        if !self.path.exists() {
            info!("Data file not found. Creating new file.");
            if let Err(e) = self.save(&[]) {
                error!("Failed to create empty data file: {}", e);
            }
            return Vec::new();
        }

        let items = match self.read_list() {
            Ok(items) => items,
            Err(e @ Error::StorageCorrupt { .. }) => {
                error!("{}", e);
                if let Err(e) = quarantine(&self.path) {
                    error!("Failed to move corrupt data file aside: {}", e);
                }
                return Vec::new();
            }
            Err(e) => {
                error!("Error loading data: {}", e);
                return Vec::new();
            }
        };

        let total = items.len();
        let records: Vec<ApplicationRecord> = items
            .into_iter()
            .filter_map(ApplicationRecord::from_value)
            .collect();

        if records.len() != total {
            warn!(
                dropped = total - records.len(),
                "Found {} invalid entries",
                total - records.len()
            );
        }
        info!(count = records.len(), "Successfully loaded applications");
        records
    }

    #[instrument(skip(self, records), fields(path = %self.path.display(), count = records.len()))]
    fn save(&self, records: &[ApplicationRecord]) -> Result<()> {
        write_json_with_backup(&self.path, records)
            .inspect(|_| info!("Successfully saved {} applications", records.len()))
            .inspect_err(|e| error!("Error saving data: {}", e))
    }
}
