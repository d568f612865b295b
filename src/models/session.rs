//! Session record and its per-session aggregates.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Difficulty, RoundOutcome};
use crate::stats;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub difficulty: Difficulty,
    pub rounds: Vec<RoundOutcome>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

impl SessionRecord {
    pub fn new(difficulty: Difficulty, started_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            date: started_at,
            difficulty,
            rounds: Vec::new(),
            start_time: started_at,
            end_time: None,
        }
    }

    pub fn is_sealed(&self) -> bool {
        self.end_time.is_some()
    }

    /// Elapsed time of the session; an open session is measured up to `now`.
    pub fn duration(&self, now: DateTime<Utc>) -> Duration {
        self.end_time.unwrap_or(now) - self.start_time
    }

    pub fn total_rounds(&self) -> usize {
        self.rounds.len()
    }

    pub fn caught_count(&self) -> usize {
        stats::caught_count(&self.rounds)
    }

    pub fn missed_count(&self) -> usize {
        self.total_rounds() - self.caught_count()
    }

    pub fn success_rate(&self) -> f64 {
        stats::success_rate(&self.rounds)
    }

    pub fn average_reaction_time(&self) -> Option<f64> {
        stats::average_reaction_time(&self.rounds)
    }

    pub fn best_reaction_time(&self) -> Option<f64> {
        stats::best_reaction_time(&self.rounds)
    }

    pub fn worst_reaction_time(&self) -> Option<f64> {
        stats::worst_reaction_time(&self.rounds)
    }

    /// Index of the first round that achieved the session's best time.
    pub fn best_round_index(&self) -> Option<usize> {
        let best = self.best_reaction_time()?;
        self.rounds
            .iter()
            .position(|round| round.caught_time() == Some(best))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with(times: &[Option<f64>]) -> SessionRecord {
        let now = Utc::now();
        let mut session = SessionRecord::new(Difficulty::Medium, now);
        for (index, time) in times.iter().enumerate() {
            let number = index as u32 + 1;
            session.rounds.push(match time {
                Some(t) => RoundOutcome::caught(number, 4.0, *t, now),
                None => RoundOutcome::missed(number, 4.0, now),
            });
        }
        session
    }

    #[test]
    fn aggregates_cover_only_caught_rounds() {
        let session = session_with(&[Some(0.4), None, Some(0.2), Some(0.6)]);

        assert_eq!(session.total_rounds(), 4);
        assert_eq!(session.caught_count(), 3);
        assert_eq!(session.missed_count(), 1);
        assert_eq!(session.success_rate(), 75.0);
        assert_eq!(session.best_reaction_time(), Some(0.2));
        assert_eq!(session.worst_reaction_time(), Some(0.6));
        assert_eq!(session.best_round_index(), Some(2));

        let average = session.average_reaction_time().unwrap();
        assert!((average - 0.4).abs() < 1e-9);
    }

    #[test]
    fn empty_session_has_no_reaction_aggregates() {
        let session = session_with(&[]);
        assert_eq!(session.success_rate(), 0.0);
        assert!(session.average_reaction_time().is_none());
        assert!(session.best_round_index().is_none());
    }

    #[test]
    fn open_session_duration_runs_to_now() {
        let session = session_with(&[]);
        let later = session.start_time + Duration::seconds(75);
        assert!(!session.is_sealed());
        assert_eq!(session.duration(later), Duration::seconds(75));
    }
}
