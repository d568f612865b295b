use serde::{Deserialize, Serialize};

use crate::models::{Difficulty, RoundOutcome, SessionRecord};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum GameState {
    #[default]
    Idle,
    Countdown(u32),
    Waiting,
    Bite,
    Caught(f64),
    Missed,
    Finished,
}

impl GameState {
    pub fn is_idle(&self) -> bool {
        matches!(self, GameState::Idle)
    }

    /// `Caught` or `Missed`: a round result is on screen.
    pub fn is_result(&self) -> bool {
        matches!(self, GameState::Caught(_) | GameState::Missed)
    }

    /// Whether a new game may start from here.
    pub fn can_start(&self) -> bool {
        matches!(self, GameState::Idle | GameState::Finished)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub state: GameState,
    pub difficulty: Difficulty,
    pub current_round: u32,
    pub total_rounds: u32,
    pub caught_count: usize,
}

impl GameSnapshot {
    /// Fraction of the session's rounds started so far, in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        if self.total_rounds == 0 {
            return 0.0;
        }
        f64::from(self.current_round) / f64::from(self.total_rounds)
    }
}

#[derive(Debug, Clone)]
pub enum GameEvent {
    StateChanged(GameSnapshot),
    RoundRecorded(RoundOutcome),
    SessionCompleted(SessionRecord),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_states() {
        assert!(GameState::Caught(0.3).is_result());
        assert!(GameState::Missed.is_result());
        assert!(!GameState::Bite.is_result());
        assert!(GameState::Finished.can_start());
        assert!(!GameState::Waiting.can_start());
        assert_eq!(GameState::default(), GameState::Idle);
    }

    #[test]
    fn serializes_with_payload() {
        let json = serde_json::to_value(GameState::Countdown(2)).unwrap();
        assert_eq!(json["kind"], "countdown");
        assert_eq!(json["value"], 2);

        let idle = serde_json::to_value(GameState::Idle).unwrap();
        assert_eq!(idle["kind"], "idle");
    }

    #[test]
    fn snapshot_progress() {
        let snapshot = GameSnapshot {
            state: GameState::Waiting,
            difficulty: Difficulty::Medium,
            current_round: 4,
            total_rounds: 10,
            caught_count: 2,
        };
        assert_eq!(snapshot.progress(), 0.4);
    }
}
