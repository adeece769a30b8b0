//! Configuration module for the builder core.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::path::PathBuf;

/// Default undo/redo stack depth.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the SQLite database holding pages and background backups
    pub db_path: PathBuf,
    /// Maximum number of undo entries kept per history stack
    pub history_capacity: usize,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let db_path = env::var("BIOLINK_DB_PATH")
            .unwrap_or_else(|_| "./data/builder.sqlite".to_string())
            .into();

        let history_capacity = env::var("BIOLINK_HISTORY_CAPACITY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_HISTORY_CAPACITY);

        let log_level = env::var("BIOLINK_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Self {
            db_path,
            history_capacity,
            log_level,
        }
    }
}
