//! Achievement evaluation over sealed sessions.
//!
//! The engine owns the catalog. Each sealed session is evaluated once; unlock
//! flags only go from locked to unlocked, the unlock date is written on that
//! transition only, and progress never moves backwards.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::db::{keys, load_json, save_json, BlobStore};
use crate::models::achievement::{
    CENTURY, DEDICATED, FIRST_CATCH, LIGHTNING_GOD, MARATHON, PERFECTIONIST, QUICK_HANDS,
};
use crate::models::{default_catalog, Achievement, SessionRecord};

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info};

const QUICK_CATCH_SECS: f64 = 0.25;
const LIGHTNING_CATCH_SECS: f64 = 0.15;
const PERFECT_MIN_ROUNDS: usize = 5;

/// History-wide figures an evaluation needs, already including the session
/// being evaluated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunningTotals {
    pub total_rounds: u32,
    pub current_streak: u32,
}

enum Rule {
    /// Unlocks when the condition holds; progress becomes 1.
    Flag(bool),
    /// Adds to progress, unlocks once progress reaches the target.
    Accumulate(u32),
    /// Raises progress to at least this value, unlocks once it reaches the target.
    AtLeast(u32),
    Inactive,
}

pub struct AchievementEngine {
    store: Arc<dyn BlobStore>,
    catalog: Vec<Achievement>,
}

impl AchievementEngine {
    /// Loads the persisted catalog, falling back to the seeded one. Entries
    /// missing from an older catalog are appended in seed order.
    pub fn load(store: Arc<dyn BlobStore>) -> Self {
        let mut catalog: Vec<Achievement> =
            load_json(store.as_ref(), keys::ACHIEVEMENTS).unwrap_or_default();

        for seed in default_catalog() {
            if !catalog.iter().any(|existing| existing.id == seed.id) {
                catalog.push(seed);
            }
        }

        Self { store, catalog }
    }

    pub fn catalog(&self) -> &[Achievement] {
        &self.catalog
    }

    pub fn get(&self, id: &str) -> Option<&Achievement> {
        self.catalog.iter().find(|achievement| achievement.id == id)
    }

    pub fn unlocked_count(&self) -> usize {
        self.catalog.iter().filter(|a| a.is_unlocked).count()
    }

    /// Applies one sealed session. Returns the ids unlocked by this call.
    pub fn evaluate(
        &mut self,
        session: &SessionRecord,
        totals: RunningTotals,
        now: DateTime<Utc>,
    ) -> Vec<String> {
        let caught_times: Vec<f64> = session
            .rounds
            .iter()
            .filter_map(|round| round.caught_time())
            .collect();
        let quick_catches = caught_times
            .iter()
            .filter(|time| **time < QUICK_CATCH_SECS)
            .count() as u32;
        let lightning = caught_times.iter().any(|time| *time < LIGHTNING_CATCH_SECS);
        let perfect =
            session.total_rounds() >= PERFECT_MIN_ROUNDS && session.success_rate() >= 100.0;

        let mut unlocked = Vec::new();
        for achievement in &mut self.catalog {
            let rule = match achievement.id.as_str() {
                FIRST_CATCH => Rule::Flag(!caught_times.is_empty()),
                QUICK_HANDS => Rule::Accumulate(quick_catches),
                CENTURY | MARATHON => Rule::AtLeast(totals.total_rounds),
                LIGHTNING_GOD => Rule::Flag(lightning),
                PERFECTIONIST => Rule::Flag(perfect),
                DEDICATED => Rule::AtLeast(totals.current_streak),
                // streak_master and unknown ids are never evaluated.
                _ => Rule::Inactive,
            };

            let reached = match rule {
                Rule::Flag(met) => {
                    if met && !achievement.is_unlocked {
                        achievement.progress = achievement.progress.max(1);
                    }
                    met
                }
                Rule::Accumulate(amount) => {
                    achievement.progress = achievement.progress.saturating_add(amount);
                    achievement.progress >= achievement.target
                }
                Rule::AtLeast(value) => {
                    achievement.progress = achievement.progress.max(value);
                    achievement.progress >= achievement.target
                }
                Rule::Inactive => false,
            };

            if reached && !achievement.is_unlocked {
                achievement.is_unlocked = true;
                achievement.unlocked_date = Some(now);
                log_info!("achievement unlocked: {}", achievement.id);
                unlocked.push(achievement.id.clone());
            }
        }

        if let Err(err) = save_json(self.store.as_ref(), keys::ACHIEVEMENTS, &self.catalog) {
            log_error!("failed to persist achievements: {err:#}");
        }

        unlocked
    }
}
