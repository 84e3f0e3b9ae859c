//! Application entity - A single tracked job application.
//!
//! Records are persisted as a JSON list. Loading goes through [`ApplicationRecord::from_value`]
//! so that malformed entries can be dropped one by one instead of failing the whole file.

use crate::errors::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Calendar format used for the `date` field.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Where an application currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    /// Saved for later, nothing submitted yet
    NotApplied,
    /// Submitted and waiting for an answer
    Applied,
    /// Offer or positive answer received
    Approved,
    /// Turned down, by either side
    Rejected,
}

impl ApplicationStatus {
    /// Every status, in workflow order.
    pub const ALL: [Self; 4] = [
        Self::NotApplied,
        Self::Applied,
        Self::Approved,
        Self::Rejected,
    ];

    /// Wire name as stored in the application file.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotApplied => "not_applied",
            Self::Applied => "applied",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Human-readable label ("Not Applied", "Applied", ...).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NotApplied => "Not Applied",
            Self::Applied => "Applied",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }

    /// Whether applications in this status are candidates for a follow-up reminder.
    #[must_use]
    pub const fn awaits_follow_up(self) -> bool {
        matches!(self, Self::NotApplied | Self::Applied)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| Error::Validation {
                message: format!("unknown application status: {s:?}"),
            })
    }
}

/// A tracked job application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationRecord {
    /// Opaque identifier, trimmed, never changes after creation
    pub id: String,
    /// Company applied to
    pub company: String,
    /// Position applied for
    pub position: String,
    /// Current status
    pub status: ApplicationStatus,
    /// Submission date, `YYYY-MM-DD`
    pub date: String,
    /// Country of the position
    pub country: String,
    /// State or region of the position
    pub state: String,
    /// Link to the posting
    pub link: String,
    /// Job description
    pub description: String,
    /// Free-form notes
    pub comments: String,
}

/// Loose shape used while loading; every field is optional so that validation can
/// decide what to drop.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawApplication {
    id: Option<serde_json::Value>,
    company: Option<String>,
    position: Option<String>,
    status: Option<String>,
    date: Option<String>,
    country: Option<String>,
    state: Option<String>,
    link: Option<String>,
    description: Option<String>,
    comments: Option<String>,
}

fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl ApplicationRecord {
    /// Builds a record from one element of the persisted list.
    ///
    /// Returns `None` when any of `id`, `company`, `position`, `status` or `date` is
    /// missing or empty, when the status is not a known wire name, or when a field has
    /// the wrong JSON type. Numeric ids are accepted and turned into strings.
    #[must_use]
    pub fn from_value(value: serde_json::Value) -> Option<Self> {
        let raw: RawApplication = serde_json::from_value(value).ok()?;

        let id = match raw.id? {
            serde_json::Value::String(s) => s.trim().to_string(),
            serde_json::Value::Number(n) => n.to_string(),
            _ => return None,
        };
        if id.is_empty() {
            return None;
        }

        let status: ApplicationStatus = required(raw.status)?.parse().ok()?;

        Some(Self {
            id,
            company: required(raw.company)?,
            position: required(raw.position)?,
            status,
            date: required(raw.date)?,
            country: raw.country.unwrap_or_default(),
            state: raw.state.unwrap_or_default(),
            link: raw.link.unwrap_or_default(),
            description: raw.description.unwrap_or_default(),
            comments: raw.comments.unwrap_or_default(),
        })
    }

    /// Whether the record satisfies the required-field invariant.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        [&self.id, &self.company, &self.position, &self.date]
            .iter()
            .all(|field| !field.is_empty())
            && self.id.trim() == self.id
    }

    /// Parses the submission date.
    ///
    /// # Errors
    /// Returns [`Error::UnparsableDate`] if `date` is not `YYYY-MM-DD`.
    pub fn applied_on(&self) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, DATE_FORMAT).map_err(|_| Error::UnparsableDate {
            id: self.id.clone(),
            value: self.date.clone(),
        })
    }

    /// `"country"` or `"country, state"` for list display.
    #[must_use]
    pub fn location(&self) -> String {
        if self.state.is_empty() {
            self.country.clone()
        } else {
            format!("{}, {}", self.country, self.state)
        }
    }
}
