use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Display bucket for a reaction. Has no effect on scoring.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ReactionRating {
    Lightning,
    Excellent,
    Good,
    Normal,
    Slow,
    Missed,
}

impl ReactionRating {
    pub fn from_reaction_time(reaction_time: Option<f64>) -> Self {
        let Some(time) = reaction_time else {
            return ReactionRating::Missed;
        };

        if time < 0.2 {
            ReactionRating::Lightning
        } else if time < 0.3 {
            ReactionRating::Excellent
        } else if time < 0.5 {
            ReactionRating::Good
        } else if time < 0.8 {
            ReactionRating::Normal
        } else {
            ReactionRating::Slow
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReactionRating::Lightning => "Lightning!",
            ReactionRating::Excellent => "Excellent!",
            ReactionRating::Good => "Good!",
            ReactionRating::Normal => "Normal",
            ReactionRating::Slow => "Too Slow",
            ReactionRating::Missed => "Missed!",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoundOutcome {
    pub id: Uuid,
    pub round_number: u32,
    pub wait_duration: f64,
    pub reaction_time: Option<f64>,
    pub caught: bool,
    pub timestamp: DateTime<Utc>,
}

impl RoundOutcome {
    pub fn caught(
        round_number: u32,
        wait_duration: f64,
        reaction_time: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            round_number,
            wait_duration,
            reaction_time: Some(reaction_time),
            caught: true,
            timestamp,
        }
    }

    pub fn missed(round_number: u32, wait_duration: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            round_number,
            wait_duration,
            reaction_time: None,
            caught: false,
            timestamp,
        }
    }

    /// Reaction time of a caught round, `None` for a miss.
    pub fn caught_time(&self) -> Option<f64> {
        if self.caught {
            self.reaction_time
        } else {
            None
        }
    }

    pub fn rating(&self) -> ReactionRating {
        ReactionRating::from_reaction_time(self.caught_time())
    }
}
