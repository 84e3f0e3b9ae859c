//! Reminder workflow - Presents pending follow-ups and applies the user's decisions.
//!
//! The controller sits between the record store, the transition rules and the dismissal
//! ledger. An update is validated before anything changes, saved before the reminder is
//! dismissed, and rolled back in memory if the save fails so it can be retried.

use crate::core::notifications::NotificationTracker;
use crate::core::store::RecordStore;
use crate::core::transition::validate_change;
use crate::entities::ApplicationRecord;
use crate::errors::{Error, Result};
use tracing::{error, info, instrument, warn};

/// A user decision on a presented reminder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderAction {
    /// Save the edited record; also dismisses its reminder
    Update(ApplicationRecord),
    /// Hide the reminder for this application id
    Dismiss(String),
    /// Hide every reminder from the last presentation
    DismissAll,
}

/// Orchestrates reminders over a record store and a dismissal ledger.
pub struct ReminderController<S> {
    store: S,
    notifications: NotificationTracker,
    presented: Vec<ApplicationRecord>,
}

impl<S: RecordStore> ReminderController<S> {
    /// Wraps a store and ledger with nothing presented yet.
    pub const fn new(store: S, notifications: NotificationTracker) -> Self {
        Self {
            store,
            notifications,
            presented: Vec::new(),
        }
    }

    /// The record store used for updates.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The dismissal ledger.
    pub const fn notifications(&self) -> &NotificationTracker {
        &self.notifications
    }

    /// Reminders from the most recent check that are still awaiting a decision.
    #[must_use]
    pub fn presented(&self) -> &[ApplicationRecord] {
        &self.presented
    }

    /// Computes the pending reminders and remembers them as the presented set.
    ///
    /// # Errors
    /// Propagates [`Error::UnparsableDate`](crate::errors::Error::UnparsableDate) from
    /// the pending computation; the presented set is left unchanged in that case.
    #[instrument(skip(self, applications), fields(total = applications.len()))]
    pub fn check_for_updates(
        &mut self,
        applications: &[ApplicationRecord],
    ) -> Result<Vec<ApplicationRecord>> {
        let pending = self.notifications.get_pending(applications)?;
        info!(pending = pending.len(), "Checked applications for updates");
        self.presented.clone_from(&pending);
        Ok(pending)
    }

    /// Applies a decision to `records` and the dismissal ledger.
    ///
    /// # Errors
    /// - [`Error::Validation`] if an updated record misses a required field or has a
    ///   padded id; nothing is changed.
    /// - [`Error::RejectedTransition`] if an update breaks the transition rules; nothing
    ///   is changed.
    /// - The store's error if an update could not be saved; `records` is restored and
    ///   the reminder stays active.
    /// - The ledger's storage error if a dismissal could not be saved. For
    ///   [`ReminderAction::DismissAll`], ids dismissed before the failure stay dismissed.
    ///   The failed id counts as dismissed in memory and leaves the presented set.
    #[instrument(skip(self, records, action))]
    pub fn handle_action(
        &mut self,
        records: &mut Vec<ApplicationRecord>,
        action: ReminderAction,
    ) -> Result<()> {
        match action {
            ReminderAction::Update(proposed) => self.apply_update(records, proposed),
            ReminderAction::Dismiss(id) => {
                let dismissed = self.notifications.dismiss(&id);
                self.presented.retain(|app| app.id != id);
                dismissed?;
                info!(id = %id, "Reminder dismissed");
                Ok(())
            }
            ReminderAction::DismissAll => self.dismiss_all(),
        }
    }

    fn apply_update(
        &mut self,
        records: &mut Vec<ApplicationRecord>,
        proposed: ApplicationRecord,
    ) -> Result<()> {
        if !proposed.is_valid() {
            warn!(id = %proposed.id, "Update rejected: record is incomplete");
            return Err(Error::Validation {
                message: format!(
                    "application {:?} needs a trimmed id, company, position and date",
                    proposed.id
                ),
            });
        }
        validate_change(records, &proposed)
            .inspect_err(|rejection| warn!("Update rejected: {}", rejection))?;

        let id = proposed.id.clone();
        let previous = match records.iter_mut().find(|r| r.id == id) {
            Some(slot) => Some(std::mem::replace(slot, proposed)),
            None => {
                records.push(proposed);
                None
            }
        };

        if let Err(e) = self.store.save(records) {
            error!(id = %id, "Update not saved, restoring previous record: {}", e);
            match previous {
                Some(previous) => {
                    if let Some(slot) = records.iter_mut().find(|r| r.id == id) {
                        *slot = previous;
                    }
                }
                None => records.retain(|r| r.id != id),
            }
            return Err(e);
        }

        let dismissed = self.notifications.dismiss(&id);
        self.presented.retain(|app| app.id != id);
        dismissed?;
        info!(id = %id, "Application updated from reminder");
        Ok(())
    }

    fn dismiss_all(&mut self) -> Result<()> {
        let ids: Vec<String> = self.presented.iter().map(|app| app.id.clone()).collect();
        for id in &ids {
            let dismissed = self.notifications.dismiss(id);
            self.presented.retain(|app| &app.id != id);
            dismissed?;
        }
        info!(count = ids.len(), "All presented reminders dismissed");
        Ok(())
    }
}
