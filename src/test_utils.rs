//! Shared test utilities.
//!
//! Record builders with sensible defaults, a clock the tests can move forward, and the
//! tracing setup used across test modules.

use crate::entities::{ApplicationRecord, ApplicationStatus};
use chrono::{DateTime, Local, NaiveDate, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing_subscriber::EnvFilter;

/// Installs a test-writer tracing subscriber once per process.
///
/// Honors `RUST_LOG` and defaults to `trace`. Later calls are no-ops.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an application record with sensible defaults.
///
/// # Defaults
/// * `company`: "Acme Corp"
/// * `position`: "Software Engineer"
/// * every optional field empty
pub fn application(id: &str, status: ApplicationStatus, date: &str) -> ApplicationRecord {
    ApplicationRecord {
        id: id.to_string(),
        company: "Acme Corp".to_string(),
        position: "Software Engineer".to_string(),
        status,
        date: date.to_string(),
        country: String::new(),
        state: String::new(),
        link: String::new(),
        description: String::new(),
        comments: String::new(),
    }
}

/// Local wall-clock instant on the given day, as a UTC timestamp.
///
/// Fixtures stay in January so that no daylight-saving switch falls inside the
/// 24h/48h windows under test.
pub fn local_instant(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    let naive = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, 0, 0))
        .unwrap_or_else(|| panic!("invalid fixture date {year}-{month}-{day} {hour}:00"));
    match Local.from_local_datetime(&naive).earliest() {
        Some(local) => local.with_timezone(&Utc),
        None => panic!("fixture time {naive} does not exist locally"),
    }
}

/// Clock pinned to a moment that tests advance explicitly.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    /// Clock frozen at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Shared handle for injection, starting at 2024-01-10 09:00 local time.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new(local_instant(2024, 1, 10, 9)))
    }

    /// Moves the clock forward by whole hours.
    pub fn advance_hours(&self, hours: i64) {
        *self.lock_clock() += TimeDelta::hours(hours);
    }

    /// Moves the clock forward by whole minutes.
    pub fn advance_minutes(&self, minutes: i64) {
        *self.lock_clock() += TimeDelta::minutes(minutes);
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}
