pub mod achievements;
pub mod config;
pub mod data;
pub mod settings;
pub mod stats;
pub mod timer;

use focustrack_core::{Config, Database, FocusEngine};

/// Upper bound for `--duration` arguments: one week.
pub const MAX_DURATION_SECS: u64 = 7 * 24 * 60 * 60;

/// Open the configured database and load the engine from it.
pub fn open_engine() -> Result<FocusEngine<Database>, Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let path = config.database_path()?;
    tracing::debug!(path = %path.display(), "opening database");
    let db = Database::open(&path)?;
    Ok(FocusEngine::new(db))
}
