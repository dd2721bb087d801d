mod config;
pub mod database;
pub mod gateway;
pub(crate) mod keypath;
pub mod migrations;

pub use config::{Config, LoggingConfig, StorageConfig, TimerConfig};
pub use database::{Database, KeyInfo};
pub use gateway::{keys, load_json, remove_key, save_json, KeyValueStore, MemoryStore};

use std::path::PathBuf;

use crate::error::CoreError;

/// Returns the directory holding the database and config file.
///
/// `FOCUSTRACK_DATA_DIR` wins when set. Otherwise `~/.config/focustrack/`,
/// or `~/.config/focustrack-dev/` with `FOCUSTRACK_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, CoreError> {
    let dir = match std::env::var_os("FOCUSTRACK_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("FOCUSTRACK_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("focustrack-dev")
            } else {
                base_dir.join("focustrack")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
