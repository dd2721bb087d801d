//! User preferences persisted alongside the engine state.
//!
//! Stored as JSON under the `settings` key of the key-value store.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::session::SessionKind;
use crate::storage::keypath;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    System,
}

impl Theme {
    /// light -> dark -> system -> light
    pub fn next(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::System,
            Theme::System => Theme::Light,
        }
    }
}

/// Preset lengths in minutes, one per session kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presets {
    #[serde(default = "default_focus")]
    pub focus: u32,
    #[serde(default = "default_short_break")]
    pub short_break: u32,
    #[serde(default = "default_long_break")]
    pub long_break: u32,
    #[serde(default = "default_custom")]
    pub custom: u32,
}

fn default_focus() -> u32 {
    25
}
fn default_short_break() -> u32 {
    5
}
fn default_long_break() -> u32 {
    15
}
fn default_custom() -> u32 {
    30
}
fn default_true() -> bool {
    true
}

impl Default for Presets {
    fn default() -> Self {
        Self {
            focus: default_focus(),
            short_break: default_short_break(),
            long_break: default_long_break(),
            custom: default_custom(),
        }
    }
}

impl Presets {
    pub fn minutes(&self, kind: SessionKind) -> u32 {
        match kind {
            SessionKind::Focus => self.focus,
            SessionKind::ShortBreak => self.short_break,
            SessionKind::LongBreak => self.long_break,
            SessionKind::Custom => self.custom,
        }
    }

    fn slot(&mut self, kind: SessionKind) -> &mut u32 {
        match kind {
            SessionKind::Focus => &mut self.focus,
            SessionKind::ShortBreak => &mut self.short_break,
            SessionKind::LongBreak => &mut self.long_break,
            SessionKind::Custom => &mut self.custom,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
    #[serde(default = "default_true")]
    pub notifications_enabled: bool,
    #[serde(default)]
    pub presets: Presets,
    #[serde(default = "default_active_preset")]
    pub active_preset: SessionKind,
}

fn default_active_preset() -> SessionKind {
    SessionKind::Focus
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            sound_enabled: true,
            notifications_enabled: true,
            presets: Presets::default(),
            active_preset: default_active_preset(),
        }
    }
}

/// A partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsPatch {
    pub theme: Option<Theme>,
    pub sound_enabled: Option<bool>,
    pub notifications_enabled: Option<bool>,
    pub presets: Option<Presets>,
    pub active_preset: Option<SessionKind>,
}

impl Settings {
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(theme) = patch.theme {
            self.theme = theme;
        }
        if let Some(sound) = patch.sound_enabled {
            self.sound_enabled = sound;
        }
        if let Some(notifications) = patch.notifications_enabled {
            self.notifications_enabled = notifications;
        }
        if let Some(presets) = patch.presets {
            self.presets = presets;
        }
        if let Some(active) = patch.active_preset {
            self.active_preset = active;
        }
    }

    pub fn set_preset(&mut self, kind: SessionKind, minutes: u32) {
        *self.presets.slot(kind) = minutes;
    }

    pub fn set_active_preset(&mut self, kind: SessionKind) {
        self.active_preset = kind;
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.next();
        self.theme
    }

    pub fn toggle_sound(&mut self) -> bool {
        self.sound_enabled = !self.sound_enabled;
        self.sound_enabled
    }

    pub fn toggle_notifications(&mut self) -> bool {
        self.notifications_enabled = !self.notifications_enabled;
        self.notifications_enabled
    }

    /// Preset length of `kind` in seconds.
    pub fn preset_secs(&self, kind: SessionKind) -> u64 {
        self.presets.minutes(kind) as u64 * 60
    }

    pub fn get(&self, key: &str) -> Option<String> {
        keypath::get(self, key)
    }

    /// Replace one field by dot-separated key, e.g. `presets.focus`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not parse.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        *self = keypath::set(self, key, value)?;
        Ok(())
    }
}
