pub mod achievement;
pub mod difficulty;
pub mod round;
pub mod session;

pub use achievement::{default_catalog, Achievement};
pub use difficulty::{Difficulty, DifficultyProfile};
pub use round::{ReactionRating, RoundOutcome};
pub use session::SessionRecord;
