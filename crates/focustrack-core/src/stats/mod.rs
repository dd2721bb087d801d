//! Statistics module for focustrack
//!
//! [`UserStats`] is the aggregate root for everything historical: counters,
//! streaks, per-day rollups, the session history and the achievement
//! catalog. The functions in [`aggregation`] are the only code that folds
//! sessions into it.

pub mod aggregation;

pub use aggregation::{
    recompute_streak, streak_as_of, summarize, update_daily_stats, StatsSummary,
    MAX_STREAK_LOOKBACK_DAYS,
};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::achievements::{default_catalog, Achievement};
use crate::session::Session;

/// One calendar day's rollup of completed sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStat {
    pub date: NaiveDate,
    pub completed_sessions: u64,
    pub total_focus_secs: u64,
    pub total_pause_secs: u64,
}

impl DailyStat {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            completed_sessions: 0,
            total_focus_secs: 0,
            total_pause_secs: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    /// Sessions started, whatever their outcome.
    #[serde(default)]
    pub total_sessions: u64,
    #[serde(default)]
    pub completed_sessions: u64,
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub longest_streak: u32,
    /// Newest date first.
    #[serde(default)]
    pub daily_stats: Vec<DailyStat>,
    /// Finalized sessions in the order they left the active slot.
    #[serde(default)]
    pub session_history: Vec<Session>,
    #[serde(default = "default_catalog")]
    pub achievements: Vec<Achievement>,
    #[serde(default)]
    pub last_achievement_check: Option<DateTime<Utc>>,
}

impl Default for UserStats {
    fn default() -> Self {
        Self {
            total_sessions: 0,
            completed_sessions: 0,
            current_streak: 0,
            longest_streak: 0,
            daily_stats: Vec::new(),
            session_history: Vec::new(),
            achievements: default_catalog(),
            last_achievement_check: None,
        }
    }
}

impl UserStats {
    pub fn daily_stat(&self, date: NaiveDate) -> Option<&DailyStat> {
        self.daily_stats.iter().find(|d| d.date == date)
    }

    /// Focus seconds summed over every day.
    pub fn total_focus_secs(&self) -> u64 {
        self.daily_stats.iter().map(|d| d.total_focus_secs).sum()
    }

    pub fn completed_history(&self) -> impl Iterator<Item = &Session> {
        self.session_history.iter().filter(|s| s.completed)
    }

    pub fn achievement(&self, id: &str) -> Option<&Achievement> {
        self.achievements.iter().find(|a| a.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_stats_carry_full_catalog() {
        let stats = UserStats::default();
        assert_eq!(stats.achievements.len(), 5);
        assert_eq!(stats.total_sessions, 0);
        assert!(stats.last_achievement_check.is_none());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let stats: UserStats = serde_json::from_str(r#"{"total_sessions": 4}"#).unwrap();
        assert_eq!(stats.total_sessions, 4);
        assert_eq!(stats.achievements.len(), 5);
        assert!(stats.session_history.is_empty());
    }

    #[test]
    fn daily_stat_date_serializes_as_iso() {
        let day = DailyStat::empty(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        let json = serde_json::to_value(&day).unwrap();
        assert_eq!(json["date"], "2024-02-29");
    }
}
