//! Entity module - Strongly-typed shapes of everything persisted to disk.
//! The application list and the notification ledger each live in their own JSON file.

pub mod application;
pub mod notification_state;

pub use application::{ApplicationRecord, ApplicationStatus, DATE_FORMAT};
pub use notification_state::{NotificationState, TIMESTAMP_FORMAT};
