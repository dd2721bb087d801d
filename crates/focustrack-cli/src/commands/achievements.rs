use clap::Subcommand;
use focustrack_core::Metric;
use serde::Serialize;

use super::open_engine;

#[derive(Subcommand)]
pub enum AchievementsAction {
    /// All achievements with their progress
    List,
    /// Achievements with at least one unlocked tier
    Unlocked,
    /// Percent progress towards the next tier
    Progress {
        /// Achievement id, e.g. focusMaster
        id: String,
    },
    /// The next locked tier
    Next {
        /// Achievement id
        id: String,
    },
    /// Evaluate achievements now
    Check,
}

#[derive(Serialize)]
struct Row<'a> {
    id: &'a str,
    title: &'a str,
    metric: Metric,
    current_tier: u32,
    progress_pct: u32,
    next_requirement: Option<u64>,
}

pub fn run(action: AchievementsAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = open_engine()?;

    match action {
        AchievementsAction::List => {
            let rows: Vec<Row> = engine
                .achievements()
                .iter()
                .map(|a| Row {
                    id: &a.id,
                    title: &a.title,
                    metric: a.metric,
                    current_tier: a.current_tier,
                    progress_pct: engine.achievement_progress(&a.id).unwrap_or(0),
                    next_requirement: a.next_locked().map(|t| t.requirement),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        AchievementsAction::Unlocked => {
            let unlocked = engine.unlocked_achievements();
            println!("{}", serde_json::to_string_pretty(&unlocked)?);
        }
        AchievementsAction::Progress { id } => {
            let pct = engine
                .achievement_progress(&id)
                .ok_or_else(|| format!("unknown achievement: {id}"))?;
            println!("{pct}");
        }
        AchievementsAction::Next { id } => {
            if engine.stats().achievement(&id).is_none() {
                return Err(format!("unknown achievement: {id}").into());
            }
            match engine.next_achievement(&id) {
                Some(tier) => println!("{}", serde_json::to_string_pretty(tier)?),
                None => println!("null"),
            }
        }
        AchievementsAction::Check => {
            let unlocked = engine.check_achievements();
            println!("{}", serde_json::to_string_pretty(&unlocked)?);
        }
    }
    Ok(())
}
