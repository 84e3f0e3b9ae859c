/// Application settings from `config.toml` and the environment
pub mod app;

/// Backup and staging file names
pub mod paths;

pub use app::{AppConfig, load_app_configuration, load_config};
