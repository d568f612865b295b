use anyhow::{anyhow, Error};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Beginner,
    #[default]
    Medium,
    Expert,
    Pro,
}

/// Timing rules for one tier. The table is closed, so every tier always has a profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyProfile {
    pub difficulty: Difficulty,
    pub wait_min_secs: f64,
    pub wait_max_secs: f64,
    pub reaction_limit_secs: f64,
    pub round_count: u32,
}

const PROFILES: [DifficultyProfile; 4] = [
    DifficultyProfile {
        difficulty: Difficulty::Beginner,
        wait_min_secs: 5.0,
        wait_max_secs: 15.0,
        reaction_limit_secs: 3.0,
        round_count: 5,
    },
    DifficultyProfile {
        difficulty: Difficulty::Medium,
        wait_min_secs: 3.0,
        wait_max_secs: 10.0,
        reaction_limit_secs: 2.0,
        round_count: 10,
    },
    DifficultyProfile {
        difficulty: Difficulty::Expert,
        wait_min_secs: 1.0,
        wait_max_secs: 5.0,
        reaction_limit_secs: 1.5,
        round_count: 15,
    },
    DifficultyProfile {
        difficulty: Difficulty::Pro,
        wait_min_secs: 0.5,
        wait_max_secs: 3.0,
        reaction_limit_secs: 1.0,
        round_count: 20,
    },
];

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Beginner,
        Difficulty::Medium,
        Difficulty::Expert,
        Difficulty::Pro,
    ];

    pub fn profile(&self) -> &'static DifficultyProfile {
        match self {
            Difficulty::Beginner => &PROFILES[0],
            Difficulty::Medium => &PROFILES[1],
            Difficulty::Expert => &PROFILES[2],
            Difficulty::Pro => &PROFILES[3],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Medium => "Medium",
            Difficulty::Expert => "Expert",
            Difficulty::Pro => "Pro",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "5-15s wait, 3s reaction, 5 rounds",
            Difficulty::Medium => "3-10s wait, 2s reaction, 10 rounds",
            Difficulty::Expert => "1-5s wait, 1.5s reaction, 15 rounds",
            Difficulty::Pro => "0.5-3s wait, 1s reaction, 20 rounds",
        }
    }

    pub fn round_count(&self) -> u32 {
        self.profile().round_count
    }

    pub fn reaction_limit_secs(&self) -> f64 {
        self.profile().reaction_limit_secs
    }

    pub fn reaction_limit(&self) -> Duration {
        Duration::from_secs_f64(self.profile().reaction_limit_secs)
    }

    pub fn wait_range_secs(&self) -> RangeInclusive<f64> {
        let profile = self.profile();
        profile.wait_min_secs..=profile.wait_max_secs
    }
}

impl FromStr for Difficulty {
    type Err = Error;

    /// Case-insensitive tier name.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "beginner" => Ok(Difficulty::Beginner),
            "medium" => Ok(Difficulty::Medium),
            "expert" => Ok(Difficulty::Expert),
            "pro" => Ok(Difficulty::Pro),
            _ => Err(anyhow!("unknown difficulty '{value}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tier_maps_to_its_own_profile() {
        for difficulty in Difficulty::ALL {
            assert_eq!(difficulty.profile().difficulty, difficulty);
        }
    }

    #[test]
    fn profiles_get_harder_with_each_tier() {
        let limits: Vec<f64> = Difficulty::ALL
            .iter()
            .map(|d| d.reaction_limit_secs())
            .collect();
        assert_eq!(limits, vec![3.0, 2.0, 1.5, 1.0]);

        let rounds: Vec<u32> = Difficulty::ALL.iter().map(|d| d.round_count()).collect();
        assert_eq!(rounds, vec![5, 10, 15, 20]);

        assert_eq!(Difficulty::Pro.wait_range_secs(), 0.5..=3.0);
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("EXPERT".parse::<Difficulty>().unwrap(), Difficulty::Expert);
        assert_eq!("pro".parse::<Difficulty>().unwrap(), Difficulty::Pro);
        assert!("legend".parse::<Difficulty>().is_err());
        assert_eq!(Difficulty::default(), Difficulty::Medium);
    }

    #[test]
    fn serializes_as_tier_name() {
        let json = serde_json::to_string(&Difficulty::Beginner).unwrap();
        assert_eq!(json, "\"Beginner\"");
    }
}
