//! Evaluating the catalog against live metrics.

use std::collections::HashSet;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{Achievement, Metric, Tier};
use crate::clock::{local_date, start_of_week};
use crate::stats::UserStats;

/// Every metric value at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MetricValues {
    pub total_focus_secs: u64,
    pub current_streak: u64,
    pub completed_sessions: u64,
    pub sessions_today: u64,
    pub sessions_this_week: u64,
}

impl MetricValues {
    pub fn collect(stats: &UserStats, now: DateTime<Utc>, offset: FixedOffset) -> Self {
        let today = local_date(now, offset);
        let week_start = start_of_week(today, offset);

        Self {
            total_focus_secs: stats.total_focus_secs(),
            current_streak: stats.current_streak as u64,
            completed_sessions: stats.completed_sessions,
            sessions_today: stats
                .daily_stat(today)
                .map(|d| d.completed_sessions)
                .unwrap_or(0),
            sessions_this_week: stats
                .completed_history()
                .filter(|s| s.start_time >= week_start)
                .count() as u64,
        }
    }

    pub fn get(&self, metric: Metric) -> u64 {
        match metric {
            Metric::TotalFocusTime => self.total_focus_secs,
            Metric::CurrentStreak => self.current_streak,
            Metric::CompletedSessions => self.completed_sessions,
            Metric::SessionsToday => self.sessions_today,
            Metric::SessionsThisWeek => self.sessions_this_week,
        }
    }
}

/// Refresh tier progress and unlock every tier whose requirement is met.
///
/// Returns each achievement that gained at least one tier in this pass,
/// once, in catalog order. Tiers that are already unlocked are left alone,
/// so repeated calls with unchanged metrics return nothing.
pub fn check_achievements(
    stats: &mut UserStats,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Vec<Achievement> {
    let values = MetricValues::collect(stats, now, offset);
    let mut newly_unlocked: HashSet<String> = HashSet::new();

    for achievement in stats.achievements.iter_mut() {
        let value = values.get(achievement.metric);
        for (index, tier) in achievement.tiers.iter_mut().enumerate() {
            tier.progress = value.min(tier.requirement);
            if !tier.unlocked && value >= tier.requirement {
                tier.unlocked = true;
                tier.unlocked_at = Some(now);
                achievement.current_tier = achievement.current_tier.max(index as u32 + 1);
                newly_unlocked.insert(achievement.id.clone());
            }
        }
        if newly_unlocked.contains(&achievement.id) {
            info!(
                achievement = %achievement.id,
                tier = achievement.current_tier,
                "achievement unlocked"
            );
        }
    }

    stats.last_achievement_check = Some(now);

    stats
        .achievements
        .iter()
        .filter(|a| newly_unlocked.contains(&a.id))
        .cloned()
        .collect()
}

/// Percentage (0..=100, floored) of the way from the last unlocked tier's
/// requirement (0 when none) to the next locked tier's requirement.
/// 100 once every tier is unlocked.
pub fn progress_pct(achievement: &Achievement, value: u64) -> u32 {
    let Some(next) = achievement.next_locked() else {
        return 100;
    };
    let base = achievement.last_unlocked().map(|t| t.requirement).unwrap_or(0);
    let span = next.requirement.saturating_sub(base);
    if span == 0 {
        return 100;
    }
    let pct = value.saturating_sub(base).saturating_mul(100) / span;
    pct.min(100) as u32
}

/// First tier that is still locked.
pub fn next_tier(achievement: &Achievement) -> Option<&Tier> {
    achievement.next_locked()
}

/// Achievements with at least one unlocked tier.
pub fn unlocked(stats: &UserStats) -> Vec<&Achievement> {
    stats.achievements.iter().filter(|a| a.is_unlocked()).collect()
}
