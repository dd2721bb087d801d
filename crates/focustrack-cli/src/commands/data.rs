use clap::Subcommand;
use focustrack_core::storage::{data_dir, migrations, KeyInfo};
use focustrack_core::{Config, Database};
use serde::Serialize;

#[derive(Subcommand)]
pub enum DataAction {
    /// Storage location, schema version and stored keys
    Info,
    /// Delete settings, statistics and the active session
    Clear {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Serialize)]
struct Info {
    data_dir: String,
    database: String,
    schema_version: i32,
    keys: Vec<KeyInfo>,
}

pub fn run(action: DataAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let path = config.database_path()?;
    let db = Database::open(&path)?;

    match action {
        DataAction::Info => {
            let info = Info {
                data_dir: data_dir()?.display().to_string(),
                database: path.display().to_string(),
                schema_version: migrations::get_schema_version(db.conn()),
                keys: db.kv_keys()?,
            };
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        DataAction::Clear { yes } => {
            if !yes {
                return Err("refusing to clear data without --yes".into());
            }
            db.clear_all()?;
            println!("all data cleared");
        }
    }
    Ok(())
}
