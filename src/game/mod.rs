pub mod clock;
pub mod controller;
pub mod feedback;
pub mod recorder;
pub mod scheduler;
pub mod state;
pub mod timers;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{GameController, PlayerInput};
pub use feedback::{Feedback, LogFeedback};
pub use recorder::SessionRecorder;
pub use scheduler::{RoundScheduler, COUNTDOWN_START, RESULT_DISPLAY_DELAY};
pub use state::{GameEvent, GameSnapshot, GameState};
pub use timers::{TimerKind, TimerQueue};
