use job_tracker::config;
use job_tracker::core::notifications::{NotificationSettings, NotificationTracker};
use job_tracker::core::reminder::ReminderController;
use job_tracker::core::store::{JsonFileStore, RecordStore};
use job_tracker::errors::Result;
use mockable::DefaultClock;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal since variables can be set externally
    dotenvy::dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the application configuration
    let app_config = config::load_app_configuration()
        .inspect_err(|e| error!("Critical error loading application configuration: {}", e))?;

    // 4. Load the application list
    let store = JsonFileStore::new(&app_config.data_file);
    let applications = store.load();

    if !app_config.reminders_enabled {
        info!("Reminders are disabled; nothing to check.");
        return Ok(());
    }

    // 5. Check which applications need a follow-up
    let notifications = NotificationTracker::open(
        NotificationSettings::from(&app_config),
        Arc::new(DefaultClock),
    );
    info!(
        "Notification state at {}",
        notifications.path().display()
    );
    let mut controller = ReminderController::new(store, notifications);
    let pending = controller
        .check_for_updates(&applications)
        .inspect_err(|e| error!("Failed to compute pending reminders: {}", e))?;

    info!(
        "You have {} applications to check for updates",
        pending.len()
    );
    for app in &pending {
        info!(
            id = %app.id,
            status = app.status.label(),
            date = %app.date,
            "{} - {}",
            app.company,
            app.position
        );
    }

    Ok(())
}
