use super::{Achievement, Metric, Tier};

struct Seed {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    metric: Metric,
    icon: &'static str,
    tiers: [(u64, &'static str); 3],
}

const CATALOG: [Seed; 5] = [
    Seed {
        id: "focusMaster",
        title: "Focus Master",
        description: "Accumulate total focus time",
        metric: Metric::TotalFocusTime,
        icon: "⏱️",
        tiers: [
            (5 * 60, "Bronze Badge"),
            (15 * 60, "Silver Badge"),
            (30 * 60, "Gold Badge"),
        ],
    },
    Seed {
        id: "streakChampion",
        title: "Streak Champion",
        description: "Maintain a daily streak",
        metric: Metric::CurrentStreak,
        icon: "🔥",
        tiers: [(3, "Bronze Trophy"), (7, "Silver Trophy"), (14, "Gold Trophy")],
    },
    Seed {
        id: "consistencyKing",
        title: "Consistency King",
        description: "Complete multiple sessions",
        metric: Metric::CompletedSessions,
        icon: "👑",
        tiers: [
            (10, "Daily Tracker"),
            (20, "Weekly Insights"),
            (30, "Monthly Report"),
        ],
    },
    Seed {
        id: "dailyDedication",
        title: "Daily Dedication",
        description: "Complete sessions in a single day",
        metric: Metric::SessionsToday,
        icon: "📅",
        tiers: [
            (3, "Focus Booster"),
            (5, "Productivity Pack"),
            (7, "Time Master Badge"),
        ],
    },
    Seed {
        id: "weeklyWarrior",
        title: "Weekly Warrior",
        description: "Complete sessions in a single week",
        metric: Metric::SessionsThisWeek,
        icon: "🗓️",
        tiers: [
            (10, "Weekly Planner"),
            (20, "Efficiency Expert"),
            (30, "Productivity Champion"),
        ],
    },
];

/// Fresh, fully locked copy of the achievement catalog.
pub fn default_catalog() -> Vec<Achievement> {
    CATALOG
        .iter()
        .map(|seed| Achievement {
            id: seed.id.to_string(),
            title: seed.title.to_string(),
            description: seed.description.to_string(),
            metric: seed.metric,
            icon: seed.icon.to_string(),
            current_tier: 0,
            tiers: seed
                .tiers
                .iter()
                .enumerate()
                .map(|(i, (requirement, reward))| Tier::new(i as u32 + 1, *requirement, reward))
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_five_achievements_with_three_tiers() {
        let catalog = default_catalog();
        assert_eq!(catalog.len(), 5);
        for achievement in &catalog {
            assert_eq!(achievement.tiers.len(), 3, "{}", achievement.id);
            assert_eq!(achievement.current_tier, 0);
        }
    }

    #[test]
    fn tier_requirements_strictly_increase() {
        for achievement in default_catalog() {
            let levels: Vec<u32> = achievement.tiers.iter().map(|t| t.level).collect();
            assert_eq!(levels, vec![1, 2, 3]);
            for pair in achievement.tiers.windows(2) {
                assert!(pair[0].requirement < pair[1].requirement, "{}", achievement.id);
            }
        }
    }

    #[test]
    fn ids_are_unique() {
        let catalog = default_catalog();
        let mut ids: Vec<&str> = catalog.iter().map(|a| a.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), catalog.len());
    }
}
