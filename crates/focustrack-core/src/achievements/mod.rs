//! Tiered achievements.
//!
//! Each [`Achievement`] watches one [`Metric`] and unlocks its tiers in
//! order as the metric crosses their requirements. Unlocks are a ratchet:
//! a tier stays unlocked even if the metric later drops (for example
//! sessions-today resetting at midnight).

mod catalog;
mod engine;

pub use catalog::default_catalog;
pub use engine::{check_achievements, next_tier, progress_pct, unlocked, MetricValues};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Quantity an achievement is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Metric {
    /// Seconds, summed over all daily rollups.
    TotalFocusTime,
    /// Days.
    CurrentStreak,
    CompletedSessions,
    SessionsToday,
    /// Completed sessions started since Sunday 00:00 local time.
    SessionsThisWeek,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    /// 1-based.
    pub level: u32,
    pub requirement: u64,
    pub reward: String,
    /// Metric value at the last check, clamped to `requirement`.
    #[serde(default)]
    pub progress: u64,
    #[serde(default)]
    pub unlocked: bool,
    #[serde(default)]
    pub unlocked_at: Option<DateTime<Utc>>,
}

impl Tier {
    pub fn new(level: u32, requirement: u64, reward: &str) -> Self {
        Self {
            level,
            requirement,
            reward: reward.to_string(),
            progress: 0,
            unlocked: false,
            unlocked_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub description: String,
    pub metric: Metric,
    pub icon: String,
    /// Level of the highest unlocked tier; 0 when none is unlocked.
    #[serde(default)]
    pub current_tier: u32,
    /// Ordered by strictly increasing requirement.
    pub tiers: Vec<Tier>,
}

impl Achievement {
    pub fn is_unlocked(&self) -> bool {
        self.tiers.iter().any(|t| t.unlocked)
    }

    pub fn is_complete(&self) -> bool {
        self.tiers.iter().all(|t| t.unlocked)
    }

    /// Highest unlocked tier.
    pub fn last_unlocked(&self) -> Option<&Tier> {
        self.tiers.iter().rev().find(|t| t.unlocked)
    }

    /// First tier still locked.
    pub fn next_locked(&self) -> Option<&Tier> {
        self.tiers.iter().find(|t| !t.unlocked)
    }
}
