pub mod achievements;
pub mod db;
pub mod game;
pub mod history;
pub mod models;
pub mod settings;
pub mod stats;
mod utils;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Result;

pub use achievements::{AchievementEngine, RunningTotals};
pub use db::{BlobStore, Database, MemoryStore};
pub use game::{
    Clock, Feedback, GameController, GameEvent, GameSnapshot, GameState, LogFeedback,
    ManualClock, PlayerInput, RoundScheduler, SystemClock,
};
pub use history::SessionHistory;
pub use models::{Achievement, Difficulty, ReactionRating, RoundOutcome, SessionRecord};
pub use settings::{AppSettings, SettingsStore, VibrationIntensity};

pub const DATA_DIR_ENV: &str = "FISHBITE_DATA_DIR";
pub const DEFAULT_DATA_DIR: &str = "fishbite-data";
pub const DATABASE_FILE: &str = "fishbite.sqlite3";

/// Initializes `env_logger` (reads RUST_LOG). Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .try_init();
}

/// Data directory from `FISHBITE_DATA_DIR`, or `./fishbite-data`.
pub fn data_dir() -> PathBuf {
    std::env::var_os(DATA_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

/// Everything a host needs: the store plus the settings and history built on it.
pub struct AppContext {
    pub database: Database,
    pub settings: SettingsStore,
    pub history: SessionHistory,
}

impl AppContext {
    pub fn open(data_dir: &Path) -> Result<Self> {
        let database = Database::new(data_dir.join(DATABASE_FILE))?;
        let store: Arc<dyn BlobStore> = Arc::new(database.clone());

        Ok(Self {
            database,
            settings: SettingsStore::new(store.clone()),
            history: SessionHistory::load(store),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Local, Utc};

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn history_writes_from_the_async_host_reach_the_database() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = AppContext::open(dir.path()).unwrap();

        let started = Utc::now();
        let mut session = SessionRecord::new(Difficulty::Beginner, started);
        session
            .rounds
            .push(RoundOutcome::caught(1, 7.0, 0.42, started));
        session.end_time = Some(started + Duration::seconds(12));

        let unlocked = tokio::task::block_in_place(|| {
            app.history.add_session(session, &Local::now())
        });
        assert_eq!(unlocked, vec!["first_catch"]);
        drop(app);

        let reopened = AppContext::open(dir.path()).unwrap();
        assert_eq!(reopened.history.sessions().len(), 1);
        assert!(reopened
            .history
            .achievement_engine()
            .get("first_catch")
            .unwrap()
            .is_unlocked);
    }
}
