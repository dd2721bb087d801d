use chrono::{Duration, NaiveDate};
use clap::Subcommand;
use focustrack_core::DailyStat;
use serde::Serialize;

use super::{open_engine, MAX_DURATION_SECS};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Counters, streaks and daily rollups
    Show,
    /// Today's rollup
    Today,
    /// Totals and productivity score over a date range
    Summary {
        /// First day, YYYY-MM-DD (default: six days before --to)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last day, YYYY-MM-DD (default: today)
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Archived sessions, newest first
    History {
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Record completed sessions ending in the past
    FastForward {
        /// Number of sessions
        count: u32,
        /// Seconds per session, at most one week
        #[arg(
            long,
            default_value = "1500",
            value_parser = clap::value_parser!(u64).range(1..=MAX_DURATION_SECS)
        )]
        duration: u64,
    },
    /// Erase all statistics, history and achievements
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Serialize)]
struct Overview<'a> {
    total_sessions: u64,
    completed_sessions: u64,
    current_streak: u32,
    longest_streak: u32,
    total_focus_secs: u64,
    daily_stats: &'a [DailyStat],
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = open_engine()?;

    match action {
        StatsAction::Show => {
            let stats = engine.stats();
            let overview = Overview {
                total_sessions: stats.total_sessions,
                completed_sessions: stats.completed_sessions,
                current_streak: stats.current_streak,
                longest_streak: stats.longest_streak,
                total_focus_secs: stats.total_focus_secs(),
                daily_stats: &stats.daily_stats,
            };
            println!("{}", serde_json::to_string_pretty(&overview)?);
        }
        StatsAction::Today => {
            let today = engine.today();
            let day = engine
                .stats()
                .daily_stat(today)
                .cloned()
                .unwrap_or_else(|| DailyStat::empty(today));
            println!("{}", serde_json::to_string_pretty(&day)?);
        }
        StatsAction::Summary { from, to } => {
            let to = to.unwrap_or_else(|| engine.today());
            let from = from.unwrap_or(to - Duration::days(6));
            if from > to {
                return Err(format!("--from {from} is after --to {to}").into());
            }
            println!("{}", serde_json::to_string_pretty(&engine.summary(from, to))?);
        }
        StatsAction::History { limit } => {
            let recent: Vec<_> = engine
                .stats()
                .session_history
                .iter()
                .rev()
                .take(limit)
                .collect();
            println!("{}", serde_json::to_string_pretty(&recent)?);
        }
        StatsAction::FastForward { count, duration } => {
            let before = engine.stats().completed_sessions;
            let unlocked = engine.fast_forward_sessions(count, duration);
            let recorded = engine.stats().completed_sessions - before;
            let ids: Vec<&str> = unlocked.iter().map(|a| a.id.as_str()).collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "recorded": recorded,
                    "unlocked": ids,
                }))?
            );
        }
        StatsAction::Reset { yes } => {
            if !yes {
                return Err("refusing to reset without --yes".into());
            }
            if let Some(event) = engine.reset_stats() {
                println!("{}", serde_json::to_string_pretty(&event)?);
            }
        }
    }
    Ok(())
}
