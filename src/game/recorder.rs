use anyhow::{bail, Result};
use chrono::{DateTime, Utc};

use crate::models::{Difficulty, RoundOutcome, SessionRecord};

#[derive(Debug, Default)]
enum RecorderState {
    #[default]
    Empty,
    Open(SessionRecord),
    Sealed,
}

/// Owns the in-progress session. Round numbers stay contiguous from 1 and a
/// session is sealed at most once.
#[derive(Debug, Default)]
pub struct SessionRecorder {
    state: RecorderState,
}

impl SessionRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a new session, dropping any session still open.
    pub fn begin(&mut self, difficulty: Difficulty, started_at: DateTime<Utc>) {
        self.state = RecorderState::Open(SessionRecord::new(difficulty, started_at));
    }

    pub fn current(&self) -> Option<&SessionRecord> {
        match &self.state {
            RecorderState::Open(record) => Some(record),
            _ => None,
        }
    }

    pub fn is_sealed(&self) -> bool {
        matches!(self.state, RecorderState::Sealed)
    }

    pub fn append_outcome(&mut self, outcome: RoundOutcome) -> Result<()> {
        let record = match &mut self.state {
            RecorderState::Open(record) => record,
            RecorderState::Sealed => bail!("session already sealed"),
            RecorderState::Empty => bail!("no session in progress"),
        };

        let expected = record.rounds.len() as u32 + 1;
        if outcome.round_number != expected {
            bail!(
                "round {} out of order, expected round {expected}",
                outcome.round_number
            );
        }
        if expected > record.difficulty.round_count() {
            bail!(
                "session already has all {} rounds",
                record.difficulty.round_count()
            );
        }

        record.rounds.push(outcome);
        Ok(())
    }

    /// Seals the open session and hands it over. Later calls return `None`.
    pub fn seal(&mut self, ended_at: DateTime<Utc>) -> Option<SessionRecord> {
        match std::mem::take(&mut self.state) {
            RecorderState::Open(mut record) => {
                record.end_time = Some(ended_at);
                self.state = RecorderState::Sealed;
                Some(record)
            }
            other => {
                self.state = other;
                None
            }
        }
    }

    pub fn discard(&mut self) {
        self.state = RecorderState::Empty;
    }
}
