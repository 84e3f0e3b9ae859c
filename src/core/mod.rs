//! Core business logic - framework-agnostic record, transition and reminder operations.

/// Direct edits, filtering and sorting of the application list
pub mod applications;
/// Pending reminder selection and the dismissal ledger
pub mod notifications;
/// Reminder workflow tying store, rules and ledger together
pub mod reminder;
/// Backup-before-write file helpers
pub mod storage;
/// Application list persistence
pub mod store;
/// Status transition rules
pub mod transition;
