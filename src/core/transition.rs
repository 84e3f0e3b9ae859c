//! Status transition rules.
//!
//! ```text
//! not_applied -> applied | rejected
//! applied     -> approved | rejected
//! approved    -> rejected
//! rejected    -> applied
//! ```
//!
//! Nothing ever moves back to `not_applied`, and a status never transitions to itself.

use crate::entities::{ApplicationRecord, ApplicationStatus};
use crate::errors::RejectedTransition;

/// Statuses reachable from `from` in one step.
#[must_use]
pub const fn allowed_transitions(from: ApplicationStatus) -> &'static [ApplicationStatus] {
    use crate::entities::ApplicationStatus::{Applied, Approved, NotApplied, Rejected};
    match from {
        NotApplied => &[Applied, Rejected],
        Applied => &[Approved, Rejected],
        Approved => &[Rejected],
        Rejected => &[Applied],
    }
}

/// Whether `to` is a direct successor of `from`.
#[must_use]
pub fn is_valid_transition(from: ApplicationStatus, to: ApplicationStatus) -> bool {
    allowed_transitions(from).contains(&to)
}

/// Checks a proposed record against the version currently held in `records`.
///
/// Records whose id is not in the list pass unconditionally, since there is no stored
/// status to move away from.
///
/// # Errors
/// Returns [`RejectedTransition`] naming the attempted pair and the legal successors
/// when the status change is not allowed.
pub fn validate_change(
    records: &[ApplicationRecord],
    proposed: &ApplicationRecord,
) -> Result<(), RejectedTransition> {
    let Some(current) = records.iter().find(|r| r.id == proposed.id) else {
        return Ok(());
    };

    if is_valid_transition(current.status, proposed.status) {
        Ok(())
    } else {
        Err(RejectedTransition {
            id: proposed.id.clone(),
            from: current.status,
            to: proposed.status,
            allowed: allowed_transitions(current.status).to_vec(),
        })
    }
}
