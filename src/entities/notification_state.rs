//! Notification state entity - The persisted dismissal ledger.
//!
//! Stored as `{"last_reset": "...", "dismissals": {"<id>": "..."}}` with timestamps in
//! `YYYY-MM-DD HH:MM:SS` local time.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Format of every timestamp in the state file.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Dismissal ledger with the start of the current reset window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationState {
    /// Start of the current reset window
    #[serde(with = "timestamp")]
    pub last_reset: NaiveDateTime,
    /// Application id to the moment it was dismissed
    #[serde(with = "timestamp::map")]
    pub dismissals: BTreeMap<String, NaiveDateTime>,
}

impl NotificationState {
    /// Empty ledger whose window starts at `now`.
    #[must_use]
    pub const fn fresh(now: NaiveDateTime) -> Self {
        Self {
            last_reset: now,
            dismissals: BTreeMap::new(),
        }
    }
}

/// Serde helpers for `YYYY-MM-DD HH:MM:SS` timestamps.
pub mod timestamp {
    use super::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    /// Serializes a timestamp as a formatted string.
    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(TIMESTAMP_FORMAT))
    }

    /// Parses a formatted timestamp string.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(D::Error::custom)
    }

    pub(crate) fn parse(raw: &str) -> Result<NaiveDateTime, String> {
        NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
            .map_err(|e| format!("invalid timestamp {raw:?}: {e}"))
    }

    /// Same format applied to every value of a string-keyed map.
    pub mod map {
        use chrono::NaiveDateTime;
        use serde::{Deserialize, Deserializer, Serializer, de::Error as _, ser::SerializeMap};
        use std::collections::BTreeMap;

        use super::super::TIMESTAMP_FORMAT;

        /// Serializes each value as a formatted string.
        pub fn serialize<S: Serializer>(
            value: &BTreeMap<String, NaiveDateTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(value.len()))?;
            for (key, at) in value {
                map.serialize_entry(key, &at.format(TIMESTAMP_FORMAT).to_string())?;
            }
            map.end()
        }

        /// Parses each value as a formatted timestamp.
        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<BTreeMap<String, NaiveDateTime>, D::Error> {
            BTreeMap::<String, String>::deserialize(deserializer)?
                .into_iter()
                .map(|(key, raw)| super::parse(&raw).map(|at| (key, at)))
                .collect::<Result<_, _>>()
                .map_err(D::Error::custom)
        }
    }
}
