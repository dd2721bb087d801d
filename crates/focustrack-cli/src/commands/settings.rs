use clap::{Subcommand, ValueEnum};
use focustrack_core::{SessionKind, SettingsPatch};

use super::open_engine;

#[derive(Clone, Copy, ValueEnum)]
pub enum Toggle {
    Theme,
    Sound,
    Notifications,
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Get a setting (e.g. "theme", "presets.focus")
    Get {
        key: String,
    },
    /// Set a setting
    Set {
        key: String,
        value: String,
    },
    /// List all settings
    List,
    /// Apply a partial JSON update, e.g. '{"sound_enabled": false}'
    Update {
        patch: String,
    },
    /// Flip a setting; the theme cycles light, dark, system
    Toggle {
        #[arg(value_enum)]
        what: Toggle,
    },
    /// Change a preset length
    Preset {
        kind: SessionKind,
        minutes: u32,
    },
    /// Choose the kind `timer start` uses by default
    Active {
        kind: SessionKind,
    },
}

pub fn run(action: SettingsAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = open_engine()?;

    match action {
        SettingsAction::Get { key } => match engine.settings().get(&key) {
            Some(value) => println!("{value}"),
            None => return Err(format!("unknown key: {key}").into()),
        },
        SettingsAction::Set { key, value } => {
            engine.set_setting(&key, &value)?;
            println!("ok");
        }
        SettingsAction::List => {
            println!("{}", serde_json::to_string_pretty(engine.settings())?);
        }
        SettingsAction::Update { patch } => {
            let patch: SettingsPatch = serde_json::from_str(&patch)?;
            let settings = engine.update_settings(patch);
            println!("{}", serde_json::to_string_pretty(settings)?);
        }
        SettingsAction::Toggle { what } => {
            let value = match what {
                Toggle::Theme => serde_json::to_value(engine.toggle_theme())?,
                Toggle::Sound => engine.toggle_sound().into(),
                Toggle::Notifications => engine.toggle_notifications().into(),
            };
            println!("{value}");
        }
        SettingsAction::Preset { kind, minutes } => {
            if minutes == 0 {
                return Err("preset length must be at least one minute".into());
            }
            engine.set_preset(kind, minutes);
            println!("ok");
        }
        SettingsAction::Active { kind } => {
            engine.set_active_preset(kind);
            println!("ok");
        }
    }
    Ok(())
}
