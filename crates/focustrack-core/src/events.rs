use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::achievements::Achievement;
use crate::session::{Session, SessionKind};

/// Every state change in the engine produces an Event.
/// Front ends render them; subscribers react to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        session_id: String,
        kind: SessionKind,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    SessionPaused {
        session_id: String,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    SessionResumed {
        session_id: String,
        pause_ms: u64,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    SessionCompleted {
        session: Session,
        /// Achievements that gained a tier because of this session.
        unlocked: Vec<Achievement>,
        at: DateTime<Utc>,
    },
    SessionCancelled {
        session: Session,
        at: DateTime<Utc>,
    },
    /// A persisted session ran out while the process was not running and
    /// was completed at its target end on startup.
    SessionRecovered {
        session: Session,
        unlocked: Vec<Achievement>,
        at: DateTime<Utc>,
    },
    AchievementUnlocked {
        achievement_id: String,
        title: String,
        level: u32,
        reward: String,
        at: DateTime<Utc>,
    },
    StatsReset {
        at: DateTime<Utc>,
    },
    Tick {
        session_id: String,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// One `AchievementUnlocked` per achievement, for its highest new tier.
    pub fn unlocks(unlocked: &[Achievement], at: DateTime<Utc>) -> Vec<Event> {
        unlocked
            .iter()
            .filter_map(|a| {
                let tier = a.last_unlocked()?;
                Some(Event::AchievementUnlocked {
                    achievement_id: a.id.clone(),
                    title: a.title.clone(),
                    level: tier.level,
                    reward: tier.reward.clone(),
                    at,
                })
            })
            .collect()
    }

    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::SessionStarted { at, .. }
            | Event::SessionPaused { at, .. }
            | Event::SessionResumed { at, .. }
            | Event::SessionCompleted { at, .. }
            | Event::SessionCancelled { at, .. }
            | Event::SessionRecovered { at, .. }
            | Event::AchievementUnlocked { at, .. }
            | Event::StatsReset { at }
            | Event::Tick { at, .. } => *at,
        }
    }
}
