//! Notification state - Which follow-up reminders the user has dismissed.
//!
//! Two independent clocks expire dismissals:
//!
//! - the reset window: once `now - last_reset` exceeds it (24h by default) the whole
//!   ledger is cleared and the window restarts at `now`;
//! - the dismissal TTL: any single entry older than it (48h by default) is removed.
//!
//! The ledger is written after every change. Loading falls back from the primary file
//! to its `.bak` sibling and finally to an empty ledger, so opening never fails.

use crate::config::AppConfig;
use crate::config::paths::backup_path;
use crate::core::storage::{refresh_backup, seed_backup, write_json, write_json_with_backup};
use crate::entities::{ApplicationRecord, NotificationState};
use crate::errors::{Error, Result};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta, Timelike};
use mockable::Clock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Where the ledger lives and how long dismissals last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationSettings {
    /// Primary state file
    pub path: PathBuf,
    /// Period after which every dismissal is cleared at once
    pub reset_window: TimeDelta,
    /// Age after which a single dismissal is dropped
    pub dismissal_ttl: TimeDelta,
}

impl NotificationSettings {
    /// Settings with the standard 24h window and 48h TTL.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            reset_window: TimeDelta::hours(24),
            dismissal_ttl: TimeDelta::hours(48),
        }
    }
}

impl From<&AppConfig> for NotificationSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            path: config.notifications_file.clone(),
            reset_window: config.reset_window(),
            dismissal_ttl: config.dismissal_ttl(),
        }
    }
}

/// Persistent dismissal ledger.
pub struct NotificationTracker {
    settings: NotificationSettings,
    clock: Arc<dyn Clock>,
    state: NotificationState,
}

impl NotificationTracker {
    /// Opens the ledger, recovering from a missing or corrupt file.
    ///
    /// Order of preference: primary file, backup file, fresh empty ledger. A recovered
    /// or fresh ledger is written back immediately; write failures are logged and the
    /// in-memory ledger is used regardless.
    #[instrument(skip(clock), fields(path = %settings.path.display()))]
    pub fn open(settings: NotificationSettings, clock: Arc<dyn Clock>) -> Self {
        let path = settings.path.clone();
        let primary_exists = path.exists();

        let primary = if primary_exists {
            read_state(&path)
                .inspect_err(|e| error!("Error loading notification state: {}", e))
                .ok()
        } else {
            None
        };

        let mut tracker = Self {
            state: NotificationState::fresh(local_now(clock.as_ref())),
            settings,
            clock,
        };

        let mut backup_unusable = false;
        if let Some(state) = primary {
            debug!(dismissals = state.dismissals.len(), "Loaded notification state");
            tracker.state = state;
        } else {
            let backup = backup_path(&path);
            let recovered = if backup.exists() {
                read_state(&backup)
                    .inspect_err(|e| error!("Backup notification state unusable: {}", e))
                    .ok()
            } else {
                None
            };
            backup_unusable = backup.exists() && recovered.is_none();

            match recovered {
                Some(state) => {
                    warn!(
                        dismissals = state.dismissals.len(),
                        "Recovered notification state from {}",
                        backup.display()
                    );
                    tracker.state = state;
                }
                None => info!("Starting with an empty notification state"),
            }

            // A corrupt primary must not be copied over the backup.
            let written = if primary_exists {
                write_json(&path, &tracker.state)
            } else {
                write_json_with_backup(&path, &tracker.state)
            };
            if let Err(e) = written {
                error!("Error saving notification state: {}", e);
            }
        }

        let backup_written = if backup_unusable {
            refresh_backup(&path).map(|()| true)
        } else {
            seed_backup(&path)
        };
        if let Err(e) = backup_written {
            error!("Error creating backup: {}", e);
        }
        tracker
    }

    fn now(&self) -> NaiveDateTime {
        local_now(self.clock.as_ref())
    }

    /// Current ledger contents.
    #[must_use]
    pub const fn state(&self) -> &NotificationState {
        &self.state
    }

    /// File the ledger persists to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.settings.path
    }

    /// Writes the ledger, refreshing the backup first.
    ///
    /// # Errors
    /// Returns the storage error if the write fails; the in-memory ledger is kept so a
    /// later call can retry.
    pub fn save_state(&self) -> Result<()> {
        write_json_with_backup(&self.settings.path, &self.state)
            .inspect_err(|e| error!("Error saving notification state: {}", e))
    }

    /// Clears every dismissal if the reset window has elapsed. Returns whether a reset
    /// happened.
    ///
    /// # Errors
    /// Returns the storage error if the reset ledger could not be written.
    pub fn reset_if_needed(&mut self) -> Result<bool> {
        let now = self.now();
        if now - self.state.last_reset <= self.settings.reset_window {
            return Ok(false);
        }

        info!(
            cleared = self.state.dismissals.len(),
            "Reset window elapsed, clearing dismissals"
        );
        self.state.dismissals.clear();
        self.state.last_reset = now;
        self.save_state()?;
        Ok(true)
    }

    /// Drops dismissals older than the TTL, saving only when something was removed.
    /// Returns how many entries were dropped.
    ///
    /// # Errors
    /// Returns the storage error if the trimmed ledger could not be written.
    pub fn cleanup_old_dismissals(&mut self) -> Result<usize> {
        let now = self.now();
        let ttl = self.settings.dismissal_ttl;
        let before = self.state.dismissals.len();
        self.state
            .dismissals
            .retain(|_, dismissed_at| now - *dismissed_at <= ttl);

        let removed = before - self.state.dismissals.len();
        if removed > 0 {
            debug!(removed, "Removed stale dismissals");
            self.save_state()?;
        }
        Ok(removed)
    }

    /// Whether the reminder for `id` is currently dismissed.
    #[must_use]
    pub fn is_dismissed(&self, id: &str) -> bool {
        self.state.dismissals.contains_key(id)
    }

    /// Records a dismissal for `id` at the current time and saves.
    ///
    /// # Errors
    /// Returns the storage error if the ledger could not be written. The dismissal stays
    /// recorded in memory.
    pub fn dismiss(&mut self, id: &str) -> Result<()> {
        let now = self.now();
        self.state.dismissals.insert(id.to_string(), now);
        debug!(id, "Dismissed notification");
        self.save_state()
    }

    /// Time elapsed since `id` was dismissed, if it is.
    #[must_use]
    pub fn dismissal_age(&self, id: &str) -> Option<TimeDelta> {
        self.state
            .dismissals
            .get(id)
            .map(|dismissed_at| self.now() - *dismissed_at)
    }

    /// Applications that need a follow-up, oldest submission first.
    ///
    /// Runs the reset check, then the TTL cleanup, then keeps applications that are
    /// `not_applied` or `applied` and not dismissed. Ties keep their input order.
    /// Failures to save during reset or cleanup are logged only.
    ///
    /// # Errors
    /// Returns [`Error::UnparsableDate`] if a pending application's date is malformed.
    pub fn get_pending(&mut self, applications: &[ApplicationRecord]) -> Result<Vec<ApplicationRecord>> {
        if let Err(e) = self.reset_if_needed() {
            warn!("Reset could not be saved, continuing in memory: {}", e);
        }
        if let Err(e) = self.cleanup_old_dismissals() {
            warn!("Cleanup could not be saved, continuing in memory: {}", e);
        }

        let mut pending: Vec<(NaiveDate, &ApplicationRecord)> = applications
            .iter()
            .filter(|app| app.status.awaits_follow_up() && !self.is_dismissed(&app.id))
            .map(|app| app.applied_on().map(|date| (date, app)))
            .collect::<Result<_>>()
            .inspect_err(|e| error!("Error getting pending notifications: {}", e))?;

        pending.sort_by_key(|(date, _)| *date);
        Ok(pending.into_iter().map(|(_, app)| app.clone()).collect())
    }
}

/// Local wall-clock time at the precision the state file stores.
fn local_now(clock: &dyn Clock) -> NaiveDateTime {
    let now = clock.local().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

fn read_state(path: &Path) -> Result<NotificationState> {
    let contents = std::fs::read_to_string(path).map_err(|e| Error::storage(path, e))?;
    let corrupt = |reason: String| Error::StorageCorrupt {
        path: path.to_path_buf(),
        reason,
    };

    let value: serde_json::Value =
        serde_json::from_str(&contents).map_err(|e| corrupt(e.to_string()))?;
    if !value.is_object() {
        return Err(corrupt("state is not a mapping".to_string()));
    }
    serde_json::from_value(value).map_err(|e| corrupt(e.to_string()))
}
