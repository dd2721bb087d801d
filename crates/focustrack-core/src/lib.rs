//! # focustrack Core Library
//!
//! This library provides the core logic for the focustrack focus timer:
//! timed sessions, statistics, streaks and tiered achievements. The CLI
//! binary is a thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Session Tracker**: A wall-clock-based state machine for the single
//!   active session; the caller invokes `tick()` for progress updates
//! - **Aggregation**: Daily rollups and day streaks over completed sessions
//! - **Achievements**: Five tiered achievements evaluated against live metrics
//! - **Storage**: A key-value gateway backed by SQLite or memory, plus
//!   TOML-based process configuration
//!
//! ## Key Components
//!
//! - [`FocusEngine`]: Facade that composes everything and persists state
//! - [`SessionTracker`]: Session lifecycle and rehydration
//! - [`Database`]: SQLite key-value persistence
//! - [`Config`]: Application configuration management

pub mod achievements;
pub mod clock;
pub mod engine;
pub mod error;
pub mod events;
pub mod session;
pub mod settings;
pub mod stats;
pub mod storage;

pub use achievements::{Achievement, Metric, MetricValues, Tier};
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::FocusEngine;
pub use error::{ConfigError, CoreError, StorageError};
pub use events::Event;
pub use session::{calculate_remaining_time, Rehydrated, Session, SessionKind, SessionTracker};
pub use settings::{Presets, Settings, SettingsPatch, Theme};
pub use stats::{DailyStat, StatsSummary, UserStats};
pub use storage::{Config, Database, KeyValueStore, MemoryStore};
