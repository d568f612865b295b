use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const FIRST_CATCH: &str = "first_catch";
pub const QUICK_HANDS: &str = "quick_hands";
pub const STREAK_MASTER: &str = "streak_master";
pub const DEDICATED: &str = "dedicated";
pub const CENTURY: &str = "century";
pub const LIGHTNING_GOD: &str = "lightning_god";
pub const PERFECTIONIST: &str = "perfectionist";
pub const MARATHON: &str = "marathon";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon_name: String,
    pub is_unlocked: bool,
    pub unlocked_date: Option<DateTime<Utc>>,
    pub progress: u32,
    pub target: u32,
}

impl Achievement {
    fn seed(id: &str, title: &str, description: &str, icon_name: &str, target: u32) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            icon_name: icon_name.into(),
            is_unlocked: false,
            unlocked_date: None,
            progress: 0,
            target,
        }
    }

    /// Progress towards the target, capped at 100.
    pub fn progress_percentage(&self) -> f64 {
        if self.target == 0 {
            return 0.0;
        }
        (self.progress as f64 / self.target as f64 * 100.0).min(100.0)
    }
}

/// The catalog seeded on first run.
pub fn default_catalog() -> Vec<Achievement> {
    vec![
        Achievement::seed(
            FIRST_CATCH,
            "First Catch",
            "Successfully catch your first fish",
            "achievement_fish",
            1,
        ),
        Achievement::seed(
            QUICK_HANDS,
            "Quick Hands",
            "Catch 10 fish faster than 0.25 seconds",
            "achievement_lightning",
            10,
        ),
        Achievement::seed(
            STREAK_MASTER,
            "Streak Master",
            "Catch 50 fish in a row without missing",
            "achievement_fire",
            50,
        ),
        Achievement::seed(
            DEDICATED,
            "Dedicated",
            "Train for 7 days in a row",
            "achievement_calendar",
            7,
        ),
        Achievement::seed(
            CENTURY,
            "Century",
            "Complete 100 rounds total",
            "achievement_hundred",
            100,
        ),
        Achievement::seed(
            LIGHTNING_GOD,
            "Lightning Reflexes",
            "Catch a fish in under 0.15 seconds",
            "achievement_bolt",
            1,
        ),
        Achievement::seed(
            PERFECTIONIST,
            "Perfectionist",
            "Complete a session with 100% success rate",
            "achievement_star",
            1,
        ),
        Achievement::seed(
            MARATHON,
            "Marathon Fisher",
            "Complete 500 rounds total",
            "achievement_medal",
            500,
        ),
    ]
}
