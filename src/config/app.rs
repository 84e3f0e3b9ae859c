//! Application settings loaded from `config.toml`.
//!
//! Every setting has a default, so a missing file is not an error. A present but
//! unreadable or malformed file is. Environment variables (optionally from `.env`)
//! override the file paths after the TOML is parsed.

use crate::errors::{Error, Result};
use chrono::TimeDelta;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable pointing at an alternative config file.
pub const CONFIG_PATH_ENV: &str = "JOB_TRACKER_CONFIG";
/// Environment override for [`AppConfig::data_file`].
pub const DATA_FILE_ENV: &str = "JOB_TRACKER_DATA_FILE";
/// Environment override for [`AppConfig::notifications_file`].
pub const NOTIFICATIONS_FILE_ENV: &str = "JOB_TRACKER_NOTIFICATIONS_FILE";

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Top-level settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// JSON file holding the application list
    pub data_file: PathBuf,
    /// JSON file holding the dismissal ledger
    pub notifications_file: PathBuf,
    /// Whether the reminder check runs at all
    pub reminders_enabled: bool,
    /// Hours after which every dismissal is cleared at once
    pub reset_window_hours: u32,
    /// Hours after which a single dismissal expires
    pub dismissal_ttl_hours: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("job_applications.json"),
            notifications_file: PathBuf::from("notifications_state.json"),
            reminders_enabled: true,
            reset_window_hours: 24,
            dismissal_ttl_hours: 48,
        }
    }
}

impl AppConfig {
    /// Length of the bulk reset window.
    #[must_use]
    pub fn reset_window(&self) -> TimeDelta {
        TimeDelta::hours(i64::from(self.reset_window_hours))
    }

    /// Age at which a dismissal is dropped.
    #[must_use]
    pub fn dismissal_ttl(&self) -> TimeDelta {
        TimeDelta::hours(i64::from(self.dismissal_ttl_hours))
    }

    /// Applies path overrides from a variable lookup.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(DATA_FILE_ENV).filter(|p| !p.is_empty()) {
            tracing::debug!("Overriding data file from {}: {}", DATA_FILE_ENV, path);
            self.data_file = PathBuf::from(path);
        }
        if let Some(path) = lookup(NOTIFICATIONS_FILE_ENV).filter(|p| !p.is_empty()) {
            tracing::debug!(
                "Overriding notifications file from {}: {}",
                NOTIFICATIONS_FILE_ENV,
                path
            );
            self.notifications_file = PathBuf::from(path);
        }
    }
}

/// Loads settings from a TOML file.
///
/// # Errors
/// Returns [`Error::Config`] if the file cannot be read or the TOML is invalid.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    parse_config(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config file {}: {e}", path_ref.display()),
    })
}

fn parse_config(contents: &str) -> std::result::Result<AppConfig, toml::de::Error> {
    toml::from_str(contents)
}

/// Loads the configuration the binary runs with.
///
/// Reads `config.toml` (or the file named by `JOB_TRACKER_CONFIG`), falling back to
/// defaults when it does not exist, then applies environment overrides.
///
/// # Errors
/// Returns [`Error::Config`] if an existing config file cannot be parsed.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = std::env::var(CONFIG_PATH_ENV)
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);

    let mut config = if path.exists() {
        load_config(&path)?
    } else {
        tracing::info!(
            "No configuration file at {}, using defaults.",
            path.display()
        );
        AppConfig::default()
    };

    config.apply_overrides(|key| std::env::var(key).ok());
    tracing::info!(
        data_file = %config.data_file.display(),
        notifications_file = %config.notifications_file.display(),
        reminders_enabled = config.reminders_enabled,
        "Configuration loaded"
    );
    Ok(config)
}
