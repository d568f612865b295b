use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::achievements::{AchievementEngine, RunningTotals};
use crate::db::{keys, load_json, save_json, BlobStore};
use crate::models::{Achievement, SessionRecord};
use crate::stats::{self, PersonalRecord, Totals};

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

/// Persisted list of sealed sessions, most recent first, together with the
/// achievement catalog they feed.
pub struct SessionHistory {
    store: Arc<dyn BlobStore>,
    sessions: Vec<SessionRecord>,
    achievements: AchievementEngine,
}

impl SessionHistory {
    pub fn load(store: Arc<dyn BlobStore>) -> Self {
        let sessions: Vec<SessionRecord> =
            load_json(store.as_ref(), keys::SESSIONS).unwrap_or_default();
        let achievements = AchievementEngine::load(store.clone());

        log_info!("loaded {} sessions from history", sessions.len());

        Self {
            store,
            sessions,
            achievements,
        }
    }

    pub fn sessions(&self) -> &[SessionRecord] {
        &self.sessions
    }

    pub fn achievements(&self) -> &[Achievement] {
        self.achievements.catalog()
    }

    pub fn achievement_engine(&self) -> &AchievementEngine {
        &self.achievements
    }

    /// Stores a sealed session and evaluates achievements with totals that
    /// already include it. Returns the ids it unlocked.
    ///
    /// Unsealed sessions and sessions already stored are rejected, so each
    /// session is scored once. A failed save is logged; the in-memory
    /// history still keeps the session.
    pub fn add_session<Tz: TimeZone>(
        &mut self,
        session: SessionRecord,
        now: &DateTime<Tz>,
    ) -> Vec<String> {
        if !session.is_sealed() {
            log_warn!("refusing to store unsealed session {}", session.id);
            return Vec::new();
        }
        if self.sessions.iter().any(|stored| stored.id == session.id) {
            log_warn!("session {} is already in history", session.id);
            return Vec::new();
        }

        self.sessions.insert(0, session);
        if let Err(err) = save_json(self.store.as_ref(), keys::SESSIONS, &self.sessions) {
            log_error!("failed to persist session history: {err:#}");
        }

        let totals = RunningTotals {
            total_rounds: self.totals().rounds as u32,
            current_streak: self.current_streak(now),
        };
        self.achievements
            .evaluate(&self.sessions[0], totals, now.with_timezone(&Utc))
    }

    pub fn totals(&self) -> Totals {
        stats::totals(&self.sessions)
    }

    pub fn overall_success_rate(&self) -> f64 {
        self.totals().success_rate()
    }

    pub fn best_reaction_time(&self) -> Option<f64> {
        stats::overall_best_reaction_time(&self.sessions)
    }

    pub fn average_reaction_time(&self) -> Option<f64> {
        stats::overall_average_reaction_time(&self.sessions)
    }

    pub fn today_totals<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Totals {
        stats::today_totals(&self.sessions, now)
    }

    pub fn current_streak<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> u32 {
        stats::current_streak(&self.sessions, now)
    }

    pub fn top_records(&self, limit: usize) -> Vec<PersonalRecord> {
        stats::top_records(&self.sessions, limit)
    }

    pub fn sessions_for_date<Tz: TimeZone>(&self, day: NaiveDate, tz: &Tz) -> Vec<&SessionRecord> {
        stats::sessions_for_date(&self.sessions, day, tz)
    }

    pub fn performance_for_date<Tz: TimeZone>(&self, day: NaiveDate, tz: &Tz) -> Option<f64> {
        stats::performance_for_date(&self.sessions, day, tz)
    }

    pub fn is_new_record(&self, session: &SessionRecord) -> bool {
        stats::is_new_record(session, &self.sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::achievement::{CENTURY, DEDICATED, FIRST_CATCH, QUICK_HANDS};
    use crate::models::{Difficulty, RoundOutcome};
    use chrono::Duration;

    fn sealed(date: DateTime<Utc>, times: &[Option<f64>]) -> SessionRecord {
        let mut session = SessionRecord::new(Difficulty::Beginner, date);
        for (index, time) in times.iter().enumerate() {
            let number = index as u32 + 1;
            session.rounds.push(match time {
                Some(time) => RoundOutcome::caught(number, 6.0, *time, date),
                None => RoundOutcome::missed(number, 6.0, date),
            });
        }
        session.end_time = Some(date + Duration::seconds(45));
        session
    }

    #[test]
    fn starts_empty_with_seeded_catalog() {
        let history = SessionHistory::load(Arc::new(MemoryStore::new()));
        assert!(history.sessions().is_empty());
        assert_eq!(history.achievements().len(), 8);
        assert_eq!(history.best_reaction_time(), None);
        assert_eq!(history.overall_success_rate(), 0.0);
    }

    #[test]
    fn newest_session_comes_first_and_survives_reload() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let mut history = SessionHistory::load(Arc::new(store.clone()));

        let older = sealed(now - Duration::hours(2), &[Some(0.4)]);
        let newer = sealed(now, &[None]);
        let newer_id = newer.id;
        history.add_session(older, &now);
        history.add_session(newer, &now);

        let reloaded = SessionHistory::load(Arc::new(store));
        assert_eq!(reloaded.sessions().len(), 2);
        assert_eq!(reloaded.sessions()[0].id, newer_id);
        assert!(reloaded
            .achievement_engine()
            .get(FIRST_CATCH)
            .unwrap()
            .is_unlocked);
    }

    #[test]
    fn rejects_unsealed_sessions() {
        let mut history = SessionHistory::load(Arc::new(MemoryStore::new()));
        let mut open = sealed(Utc::now(), &[Some(0.3)]);
        open.end_time = None;

        assert!(history.add_session(open, &Utc::now()).is_empty());
        assert!(history.sessions().is_empty());
        assert!(!history
            .achievement_engine()
            .get(FIRST_CATCH)
            .unwrap()
            .is_unlocked);
    }

    #[test]
    fn same_session_is_scored_once() {
        let store = MemoryStore::new();
        let mut history = SessionHistory::load(Arc::new(store.clone()));
        let now = Utc::now();
        let session = sealed(now, &[Some(0.1); 5]);

        history.add_session(session.clone(), &now);
        let unlocked = history.add_session(session, &now);

        assert!(unlocked.is_empty());
        assert_eq!(history.sessions().len(), 1);
        assert_eq!(history.totals().rounds, 5);
        let quick_hands = history.achievement_engine().get(QUICK_HANDS).unwrap();
        assert_eq!(quick_hands.progress, 5);
        assert!(!quick_hands.is_unlocked);

        let reloaded = SessionHistory::load(Arc::new(store));
        assert_eq!(reloaded.sessions().len(), 1);
    }

    #[test]
    fn totals_include_the_new_session() {
        let mut history = SessionHistory::load(Arc::new(MemoryStore::new()));
        let now = Utc::now();
        for _ in 0..9 {
            history.add_session(sealed(now, &[None; 10]), &now);
        }
        let unlocked = history.add_session(sealed(now, &[None; 10]), &now);

        assert_eq!(unlocked, vec![CENTURY]);
        assert_eq!(history.totals().rounds, 100);
    }

    #[test]
    fn streak_counts_the_session_being_added() {
        let mut history = SessionHistory::load(Arc::new(MemoryStore::new()));
        let now = Utc::now();
        for days_ago in (1..=6).rev() {
            let date = now - Duration::days(days_ago);
            history.add_session(sealed(date, &[None]), &date);
        }
        assert_eq!(history.current_streak(&now), 6);

        let unlocked = history.add_session(sealed(now, &[None]), &now);
        assert_eq!(unlocked, vec![DEDICATED]);
    }

    #[test]
    fn aggregate_queries_delegate_to_stats() {
        let mut history = SessionHistory::load(Arc::new(MemoryStore::new()));
        let now = Utc::now();
        let yesterday = now - Duration::days(1);
        history.add_session(sealed(yesterday, &[Some(0.31), Some(0.18)]), &yesterday);
        history.add_session(sealed(now, &[Some(0.52), None, Some(0.18)]), &now);

        let totals = history.totals();
        assert_eq!((totals.sessions, totals.rounds, totals.caught, totals.missed), (2, 5, 4, 1));
        assert_eq!(history.today_totals(&now).rounds, 3);
        assert_eq!(history.best_reaction_time(), Some(0.18));

        let times: Vec<f64> = history
            .top_records(10)
            .iter()
            .map(|record| record.reaction_time)
            .collect();
        assert_eq!(times, vec![0.18, 0.18, 0.31, 0.52]);

        let rate = history.performance_for_date(yesterday.date_naive(), &Utc).unwrap();
        assert_eq!(rate, 100.0);
        assert_eq!(history.sessions_for_date(now.date_naive(), &Utc).len(), 1);
        assert!(history.is_new_record(&history.sessions()[0]));
    }
}
