//! Folding completed sessions into daily rollups and streaks.

use std::collections::HashSet;

use chrono::{Duration, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{DailyStat, UserStats};
use crate::clock::local_date;
use crate::session::Session;

/// The backward streak walk stops after this many days.
pub const MAX_STREAK_LOOKBACK_DAYS: u32 = 365;

/// Sessions per day that score 100 in [`StatsSummary::productivity_score`].
const TARGET_DAILY_SESSIONS: f64 = 3.0;
/// Average session length (seconds) that scores 100.
const TARGET_SESSION_SECS: f64 = 25.0 * 60.0;

/// Add a completed session to the rollup for the local day it started on.
///
/// The list stays sorted newest date first.
pub fn update_daily_stats(stats: &mut UserStats, session: &Session, offset: FixedOffset) {
    let date = local_date(session.start_time, offset);
    let pause_secs = session.total_paused_ms / 1000;

    match stats.daily_stats.iter_mut().find(|d| d.date == date) {
        Some(day) => {
            day.completed_sessions += 1;
            day.total_focus_secs += session.duration_secs;
            day.total_pause_secs += pause_secs;
        }
        None => stats.daily_stats.push(DailyStat {
            date,
            completed_sessions: 1,
            total_focus_secs: session.duration_secs,
            total_pause_secs: pause_secs,
        }),
    }

    stats.daily_stats.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Current streak as of `today`, without touching `stats`.
///
/// A day counts when at least one completed session started on it. The walk
/// starts at today, or at yesterday when today has nothing yet, so an
/// unfinished day does not break a streak until the following one begins.
pub fn streak_as_of(stats: &UserStats, today: NaiveDate, offset: FixedOffset) -> u32 {
    let active_days: HashSet<NaiveDate> = stats
        .completed_history()
        .map(|s| local_date(s.start_time, offset))
        .collect();

    let yesterday = today - Duration::days(1);
    let start = if active_days.contains(&today) {
        Some(today)
    } else if active_days.contains(&yesterday) {
        Some(yesterday)
    } else {
        None
    };

    let mut streak = 0u32;
    if let Some(mut day) = start {
        while streak < MAX_STREAK_LOOKBACK_DAYS && active_days.contains(&day) {
            streak += 1;
            day -= Duration::days(1);
        }
    }
    streak
}

/// Recount the current streak as of `today` and raise the longest streak
/// if it was beaten. Returns the new current streak.
pub fn recompute_streak(stats: &mut UserStats, today: NaiveDate, offset: FixedOffset) -> u32 {
    let streak = streak_as_of(stats, today, offset);
    stats.current_streak = streak;
    stats.longest_streak = stats.longest_streak.max(streak);
    streak
}

/// Totals and averages over an inclusive date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSummary {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub total_sessions: u64,
    pub total_focus_secs: u64,
    /// Averaged over days that have any data (at least one).
    pub avg_daily_sessions: f64,
    pub avg_session_secs: f64,
    /// 0..=100: mean of the session-count score and the session-length score.
    pub productivity_score: u32,
}

pub fn summarize(stats: &UserStats, from: NaiveDate, to: NaiveDate) -> StatsSummary {
    let days: Vec<&DailyStat> = stats
        .daily_stats
        .iter()
        .filter(|d| d.date >= from && d.date <= to)
        .collect();

    let total_sessions: u64 = days.iter().map(|d| d.completed_sessions).sum();
    let total_focus_secs: u64 = days.iter().map(|d| d.total_focus_secs).sum();

    let day_count = days.len().max(1) as f64;
    let avg_daily_sessions = total_sessions as f64 / day_count;
    let avg_session_secs = if total_sessions > 0 {
        total_focus_secs as f64 / total_sessions as f64
    } else {
        0.0
    };

    let sessions_score = (avg_daily_sessions / TARGET_DAILY_SESSIONS * 100.0).min(100.0);
    let length_score = (avg_session_secs / TARGET_SESSION_SECS * 100.0).min(100.0);
    let productivity_score = ((sessions_score + length_score) / 2.0).round() as u32;

    StatsSummary {
        from,
        to,
        total_sessions,
        total_focus_secs,
        avg_daily_sessions,
        avg_session_secs,
        productivity_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionKind;
    use chrono::{DateTime, TimeZone, Utc};

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, d, h, 0, 0).unwrap()
    }

    fn completed(start: DateTime<Utc>, duration_secs: u64, paused_ms: u64) -> Session {
        let mut s = Session::new(SessionKind::Focus, duration_secs, start).unwrap();
        s.total_paused_ms = paused_ms;
        s.finalize(true, start + Duration::seconds(duration_secs as i64));
        s
    }

    fn record(stats: &mut UserStats, session: Session) {
        update_daily_stats(stats, &session, utc());
        stats.completed_sessions += 1;
        stats.session_history.push(session);
    }

    #[test]
    fn first_session_of_a_day_creates_the_rollup() {
        let mut stats = UserStats::default();
        update_daily_stats(&mut stats, &completed(at(3, 10), 1500, 2_999), utc());
        let today = stats.daily_stat(day(3)).unwrap();
        assert_eq!(today.completed_sessions, 1);
        assert_eq!(today.total_focus_secs, 1500);
        assert_eq!(today.total_pause_secs, 2);
    }

    #[test]
    fn later_sessions_add_to_the_rollup() {
        let mut stats = UserStats::default();
        update_daily_stats(&mut stats, &completed(at(3, 10), 1500, 1_000), utc());
        update_daily_stats(&mut stats, &completed(at(3, 14), 300, 4_500), utc());
        assert_eq!(stats.daily_stats.len(), 1);
        let today = &stats.daily_stats[0];
        assert_eq!(today.completed_sessions, 2);
        assert_eq!(today.total_focus_secs, 1800);
        assert_eq!(today.total_pause_secs, 5);
    }

    #[test]
    fn rollups_stay_newest_first() {
        let mut stats = UserStats::default();
        for d in [4, 1, 9, 2] {
            update_daily_stats(&mut stats, &completed(at(d, 8), 60, 0), utc());
        }
        let dates: Vec<_> = stats.daily_stats.iter().map(|d| d.date).collect();
        assert_eq!(dates, vec![day(9), day(4), day(2), day(1)]);
    }

    #[test]
    fn day_is_taken_from_local_start_time() {
        let mut stats = UserStats::default();
        let minus_five = FixedOffset::west_opt(5 * 3600).unwrap();
        // 02:00 UTC on the 10th is still the 9th at UTC-5.
        update_daily_stats(&mut stats, &completed(at(10, 2), 60, 0), minus_five);
        assert!(stats.daily_stat(day(9)).is_some());
    }

    #[test]
    fn no_sessions_means_no_streak() {
        let mut stats = UserStats::default();
        assert_eq!(recompute_streak(&mut stats, day(10), utc()), 0);
        assert_eq!(stats.longest_streak, 0);
    }

    #[test]
    fn streak_counts_consecutive_days_through_today() {
        let mut stats = UserStats::default();
        for d in [7, 8, 9, 10] {
            record(&mut stats, completed(at(d, 9), 60, 0));
        }
        assert_eq!(recompute_streak(&mut stats, day(10), utc()), 4);
        assert_eq!(stats.longest_streak, 4);
    }

    #[test]
    fn empty_today_starts_walk_at_yesterday() {
        let mut stats = UserStats::default();
        for d in [7, 8, 9] {
            record(&mut stats, completed(at(d, 9), 60, 0));
        }
        assert_eq!(recompute_streak(&mut stats, day(10), utc()), 3);
    }

    #[test]
    fn two_empty_days_reset_the_streak() {
        let mut stats = UserStats::default();
        for d in [6, 7, 8] {
            record(&mut stats, completed(at(d, 9), 60, 0));
        }
        assert_eq!(recompute_streak(&mut stats, day(9), utc()), 3);
        assert_eq!(recompute_streak(&mut stats, day(10), utc()), 0);
        assert_eq!(stats.longest_streak, 3);
    }

    #[test]
    fn gap_of_several_days_stops_the_walk() {
        let mut stats = UserStats::default();
        for d in [1, 2, 3, 4, 5] {
            record(&mut stats, completed(at(d, 9), 60, 0));
        }
        // Nothing on the 6th through the 8th.
        for d in [9, 10] {
            record(&mut stats, completed(at(d, 9), 60, 0));
        }
        assert_eq!(recompute_streak(&mut stats, day(10), utc()), 2);
        // The longest streak only ever reflects streaks seen at recompute time.
        assert_eq!(stats.longest_streak, 2);
    }

    #[test]
    fn single_missing_day_inside_history_breaks_streak() {
        let mut stats = UserStats::default();
        for d in [5, 6, 8, 9] {
            record(&mut stats, completed(at(d, 9), 60, 0));
        }
        assert_eq!(recompute_streak(&mut stats, day(9), utc()), 2);
    }

    #[test]
    fn cancelled_sessions_do_not_count_toward_streak() {
        let mut stats = UserStats::default();
        let mut cancelled = Session::new(SessionKind::Focus, 60, at(10, 9)).unwrap();
        cancelled.finalize(false, at(10, 9) + Duration::seconds(10));
        stats.session_history.push(cancelled);
        assert_eq!(recompute_streak(&mut stats, day(10), utc()), 0);
    }

    #[test]
    fn longest_streak_never_decreases() {
        let mut stats = UserStats::default();
        stats.longest_streak = 12;
        record(&mut stats, completed(at(10, 9), 60, 0));
        assert_eq!(recompute_streak(&mut stats, day(10), utc()), 1);
        assert_eq!(stats.longest_streak, 12);
    }

    #[test]
    fn walk_is_capped() {
        let mut stats = UserStats::default();
        let first = Utc.with_ymd_and_hms(2023, 1, 1, 12, 0, 0).unwrap();
        for i in 0..400 {
            let start = first + Duration::days(i);
            stats.session_history.push(completed(start, 60, 0));
        }
        let today = local_date(first + Duration::days(399), utc());
        assert_eq!(
            recompute_streak(&mut stats, today, utc()),
            MAX_STREAK_LOOKBACK_DAYS
        );
    }

    #[test]
    fn summary_over_range() {
        let mut stats = UserStats::default();
        record(&mut stats, completed(at(1, 9), 1500, 0));
        record(&mut stats, completed(at(1, 11), 1500, 0));
        record(&mut stats, completed(at(2, 9), 1500, 0));
        record(&mut stats, completed(at(20, 9), 600, 0));

        let summary = summarize(&stats, day(1), day(7));
        assert_eq!(summary.total_sessions, 3);
        assert_eq!(summary.total_focus_secs, 4500);
        assert!((summary.avg_daily_sessions - 1.5).abs() < f64::EPSILON);
        assert!((summary.avg_session_secs - 1500.0).abs() < f64::EPSILON);
        // sessions score 50, length score 100.
        assert_eq!(summary.productivity_score, 75);
    }

    #[test]
    fn empty_summary_is_zeroed() {
        let summary = summarize(&UserStats::default(), day(1), day(30));
        assert_eq!(summary.total_sessions, 0);
        assert_eq!(summary.avg_session_secs, 0.0);
        assert_eq!(summary.productivity_score, 0);
    }
}
