//! Unified error types and result handling.
//!
//! Storage corruption is recovered inside the store and notification modules and
//! only ever shows up in logs. Everything else is returned to the caller.

use crate::entities::ApplicationStatus;
use std::path::PathBuf;
use thiserror::Error;

/// A proposed status change that the transition graph does not allow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot move application {id} from {from} to {to}; allowed: {}", format_allowed(.allowed))]
pub struct RejectedTransition {
    /// Application the change was proposed for
    pub id: String,
    /// Status currently stored
    pub from: ApplicationStatus,
    /// Status that was proposed
    pub to: ApplicationStatus,
    /// Legal successors of `from`
    pub allowed: Vec<ApplicationStatus>,
}

fn format_allowed(allowed: &[ApplicationStatus]) -> String {
    if allowed.is_empty() {
        return "none".to_string();
    }
    allowed
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Application not found: {id}")]
    ApplicationNotFound { id: String },

    #[error(transparent)]
    RejectedTransition(#[from] RejectedTransition),

    #[error("Application {id} has an unparsable date: {value:?}")]
    UnparsableDate { id: String, value: String },

    #[error("Storage at {} is corrupt: {reason}", path.display())]
    StorageCorrupt { path: PathBuf, reason: String },

    #[error("I/O error on {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Wraps an I/O failure together with the file it happened on.
    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
