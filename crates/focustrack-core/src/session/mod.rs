//! Timed sessions and the tracker that owns the active one.
//!
//! A [`Session`] is a plain value. Its remaining time is always derived from
//! `target_end_time`, never counted down, so a missed tick or a suspended
//! process cannot make the timer drift.

mod tracker;

pub use tracker::{Rehydrated, SessionTracker};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::elapsed_ms;

/// What a session is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionKind {
    Focus,
    ShortBreak,
    LongBreak,
    Custom,
}

impl SessionKind {
    pub const ALL: [SessionKind; 4] = [
        SessionKind::Focus,
        SessionKind::ShortBreak,
        SessionKind::LongBreak,
        SessionKind::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::Focus => "focus",
            SessionKind::ShortBreak => "short-break",
            SessionKind::LongBreak => "long-break",
            SessionKind::Custom => "custom",
        }
    }
}

impl std::fmt::Display for SessionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SessionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "focus" | "pomodoro" => Ok(SessionKind::Focus),
            "short-break" | "short" => Ok(SessionKind::ShortBreak),
            "long-break" | "long" => Ok(SessionKind::LongBreak),
            "custom" => Ok(SessionKind::Custom),
            other => Err(format!("unknown session kind: {other}")),
        }
    }
}

/// One timed interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub kind: SessionKind,
    pub start_time: DateTime<Utc>,
    /// When the session completes if it is not paused again. Every resume
    /// pushes this forward by the length of the pause.
    pub target_end_time: DateTime<Utc>,
    #[serde(default)]
    pub paused_at: Option<DateTime<Utc>>,
    /// Milliseconds spent paused, not counting a pause that is still open.
    #[serde(default)]
    pub total_paused_ms: u64,
    /// Nominal length in seconds.
    pub duration_secs: u64,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
}

impl Session {
    /// A fresh running session, or `None` when `duration_secs` puts the
    /// target end outside the representable range.
    pub fn new(kind: SessionKind, duration_secs: u64, now: DateTime<Utc>) -> Option<Self> {
        Some(Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            start_time: now,
            target_end_time: secs_after(now, duration_secs)?,
            paused_at: None,
            total_paused_ms: 0,
            duration_secs,
            completed: false,
            end_time: None,
        })
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    /// Still in the active slot: not yet completed or cancelled.
    pub fn is_active(&self) -> bool {
        self.end_time.is_none()
    }

    /// Active and unpaused: the state in which the periodic tick is armed.
    pub fn is_running(&self) -> bool {
        self.is_active() && !self.is_paused()
    }

    /// Whole seconds left. Frozen at the pause instant while paused.
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> u64 {
        remaining_secs(self, now)
    }

    pub(crate) fn fold_open_pause(&mut self, now: DateTime<Utc>) -> u64 {
        let Some(paused_at) = self.paused_at.take() else {
            return 0;
        };
        let pause_ms = elapsed_ms(paused_at, now);
        self.total_paused_ms += pause_ms;
        pause_ms
    }

    pub(crate) fn finalize(&mut self, completed: bool, at: DateTime<Utc>) {
        self.fold_open_pause(at);
        self.completed = completed;
        self.end_time = Some(at);
    }
}

/// `at` plus `secs` seconds; `None` on overflow.
pub(crate) fn secs_after(at: DateTime<Utc>, secs: u64) -> Option<DateTime<Utc>> {
    let secs = i64::try_from(secs).ok()?;
    at.checked_add_signed(Duration::try_seconds(secs)?)
}

fn remaining_secs(session: &Session, now: DateTime<Utc>) -> u64 {
    let reference = session.paused_at.unwrap_or(now);
    let ms = (session.target_end_time - reference).num_milliseconds();
    if ms <= 0 {
        0
    } else {
        (ms / 1000) as u64
    }
}

/// Remaining whole seconds of `session` at `now`; zero when there is none.
pub fn calculate_remaining_time(session: Option<&Session>, now: DateTime<Utc>) -> u64 {
    session.map(|s| remaining_secs(s, now)).unwrap_or(0)
}
