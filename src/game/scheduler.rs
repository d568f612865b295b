//! Round scheduler: the wait → bite → catch/miss state machine.
//!
//! The scheduler never sleeps. Timers live in a [`TimerQueue`] and fire when
//! the owner calls [`RoundScheduler::poll`] at or after their deadline, which
//! lets tests drive whole games with a [`ManualClock`](super::ManualClock).
//! Follow-up timers are armed relative to the deadline that fired, not the
//! poll time, so a late poll replays the same timeline.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use log::debug;
use rand::Rng;

use super::clock::Clock;
use super::feedback::Feedback;
use super::recorder::SessionRecorder;
use super::state::{GameEvent, GameSnapshot, GameState};
use super::timers::{TimerKind, TimerQueue};
use crate::models::{Difficulty, RoundOutcome, SessionRecord};
use crate::settings::AppSettings;
use crate::stats;

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

pub const COUNTDOWN_START: u32 = 3;
const COUNTDOWN_STEP: Duration = Duration::from_secs(1);
/// How long a round result stays up before the next round starts on its own.
pub const RESULT_DISPLAY_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy)]
enum Input {
    Catch,
    Continue,
    Timer(TimerKind),
}

#[derive(Debug, Clone, Copy)]
enum Cue {
    BiteStart,
    CatchSuccess,
    Miss,
    CountdownTick,
}

pub struct RoundScheduler<C: Clock, R: Rng> {
    clock: C,
    rng: R,
    feedback: Box<dyn Feedback>,
    state: GameState,
    settings: AppSettings,
    difficulty: Difficulty,
    current_round: u32,
    current_wait: f64,
    bite_started_at: Option<Instant>,
    /// Monotonic/wall pair captured at game start; wall timestamps derive from it.
    anchor: Option<(Instant, DateTime<Utc>)>,
    recorder: SessionRecorder,
    timers: TimerQueue,
    finished: Option<SessionRecord>,
    events: Vec<GameEvent>,
}

impl<C: Clock, R: Rng> RoundScheduler<C, R> {
    pub fn new(clock: C, rng: R, feedback: Box<dyn Feedback>) -> Self {
        Self {
            clock,
            rng,
            feedback,
            state: GameState::Idle,
            settings: AppSettings::default(),
            difficulty: Difficulty::default(),
            current_round: 0,
            current_wait: 0.0,
            bite_started_at: None,
            anchor: None,
            recorder: SessionRecorder::new(),
            timers: TimerQueue::new(),
            finished: None,
            events: Vec::new(),
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn total_rounds(&self) -> u32 {
        self.difficulty.round_count()
    }

    /// Outcomes of the running session, or of the finished one until the next start.
    pub fn rounds(&self) -> &[RoundOutcome] {
        if let Some(record) = self.recorder.current() {
            &record.rounds
        } else if let Some(record) = &self.finished {
            &record.rounds
        } else {
            &[]
        }
    }

    pub fn caught_count(&self) -> usize {
        stats::caught_count(self.rounds())
    }

    pub fn progress_percentage(&self) -> f64 {
        self.snapshot().progress()
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            state: self.state,
            difficulty: self.difficulty,
            current_round: self.current_round,
            total_rounds: self.total_rounds(),
            caught_count: self.caught_count(),
        }
    }

    pub fn finished_session(&self) -> Option<&SessionRecord> {
        self.finished.as_ref()
    }

    pub fn take_finished_session(&mut self) -> Option<SessionRecord> {
        self.finished.take()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    pub fn armed_timers(&self) -> usize {
        self.timers.armed_count()
    }

    /// Drains events produced since the last call, oldest first.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Starts a new game. Ignored unless the scheduler is idle or finished.
    pub fn start_game(&mut self, difficulty: Difficulty, settings: AppSettings) -> bool {
        if !self.state.can_start() {
            log_warn!("start_game ignored while {:?}", self.state);
            return false;
        }

        let now = self.clock.now();
        let wall = self.clock.wall_now();

        self.timers.cancel_all();
        self.difficulty = difficulty;
        self.settings = settings;
        self.current_round = 0;
        self.current_wait = 0.0;
        self.bite_started_at = None;
        self.finished = None;
        self.anchor = Some((now, wall));
        self.recorder.begin(difficulty, wall);
        self.feedback.prepare(&self.settings);

        log_info!(
            "starting {} game with {} rounds",
            difficulty.as_str(),
            difficulty.round_count()
        );

        if self.settings.show_countdown {
            self.enter_countdown(COUNTDOWN_START, now);
        } else {
            self.start_next_round(now);
        }
        true
    }

    /// The player's catch signal. Returns true if it landed during a bite.
    pub fn catch_fish(&mut self) -> bool {
        let now = self.clock.now();
        // A miss deadline that has already passed wins over this catch.
        self.fire_due(now);

        if self.state != GameState::Bite {
            debug!("catch ignored while {:?}", self.state);
            return false;
        }
        self.handle(Input::Catch, now);
        true
    }

    pub fn continue_after_result(&mut self) {
        let now = self.clock.now();
        self.fire_due(now);
        self.handle(Input::Continue, now);
    }

    /// Aborts the game. The partial session is dropped, never sealed.
    pub fn end_game(&mut self) {
        if self.state.is_idle() {
            return;
        }

        self.timers.cancel_all();
        self.recorder.discard();
        self.current_round = 0;
        self.bite_started_at = None;
        self.finished = None;
        self.anchor = None;

        log_info!("game ended by player");
        self.transition(GameState::Idle);
    }

    /// Fires every timer due at the clock's current time.
    pub fn poll(&mut self) {
        let now = self.clock.now();
        self.fire_due(now);
    }

    fn fire_due(&mut self, now: Instant) {
        while let Some((kind, deadline)) = self.timers.pop_due(now) {
            self.handle(Input::Timer(kind), deadline);
        }
    }

    fn handle(&mut self, input: Input, at: Instant) {
        match (self.state, input) {
            (GameState::Countdown(remaining), Input::Timer(TimerKind::Countdown)) => {
                if remaining > 1 {
                    self.enter_countdown(remaining - 1, at);
                } else {
                    self.timers.cancel(TimerKind::Countdown);
                    self.start_next_round(at);
                }
            }
            (GameState::Waiting, Input::Timer(TimerKind::Wait)) => self.trigger_bite(at),
            (GameState::Bite, Input::Catch) => self.record_catch(at),
            (GameState::Bite, Input::Timer(TimerKind::Miss)) => self.record_miss(at),
            (state, Input::Timer(TimerKind::Advance)) if state.is_result() => {
                self.start_next_round(at)
            }
            (state, Input::Continue) if state.is_result() => {
                self.timers.cancel(TimerKind::Advance);
                self.advance_or_finish(at);
            }
            (state, input) => debug!("ignoring {input:?} while {state:?}"),
        }
    }

    fn enter_countdown(&mut self, remaining: u32, at: Instant) {
        self.transition(GameState::Countdown(remaining));
        self.signal(Cue::CountdownTick);
        self.timers.arm(TimerKind::Countdown, at + COUNTDOWN_STEP);
    }

    fn start_next_round(&mut self, at: Instant) {
        self.current_round += 1;
        self.current_wait = self.rng.gen_range(self.difficulty.wait_range_secs());
        self.bite_started_at = None;

        debug!(
            "round {}/{} waits {:.3}s",
            self.current_round,
            self.total_rounds(),
            self.current_wait
        );

        self.transition(GameState::Waiting);
        self.timers
            .arm(TimerKind::Wait, at + Duration::from_secs_f64(self.current_wait));
    }

    fn trigger_bite(&mut self, at: Instant) {
        self.transition(GameState::Bite);
        self.bite_started_at = Some(at);
        self.timers
            .arm(TimerKind::Miss, at + self.difficulty.reaction_limit());
        self.signal(Cue::BiteStart);
    }

    fn record_catch(&mut self, at: Instant) {
        let Some(bite_started_at) = self.bite_started_at else {
            log_warn!("catch during bite without a bite start time");
            return;
        };

        self.timers.cancel(TimerKind::Miss);
        let reaction_time = at.saturating_duration_since(bite_started_at).as_secs_f64();
        let outcome = RoundOutcome::caught(
            self.current_round,
            self.current_wait,
            reaction_time,
            self.wall_at(at),
        );

        self.record(outcome);
        self.transition(GameState::Caught(reaction_time));
        self.signal(Cue::CatchSuccess);
        self.after_result(at);
    }

    fn record_miss(&mut self, at: Instant) {
        let outcome = RoundOutcome::missed(self.current_round, self.current_wait, self.wall_at(at));

        self.record(outcome);
        self.transition(GameState::Missed);
        self.signal(Cue::Miss);
        self.after_result(at);
    }

    fn record(&mut self, outcome: RoundOutcome) {
        match self.recorder.append_outcome(outcome.clone()) {
            Ok(()) => self.events.push(GameEvent::RoundRecorded(outcome)),
            Err(err) => log_warn!("dropping round {}: {err}", outcome.round_number),
        }
    }

    fn after_result(&mut self, at: Instant) {
        if self.current_round >= self.total_rounds() {
            self.finish(at);
        } else if self.settings.auto_next_round {
            self.timers
                .arm(TimerKind::Advance, at + RESULT_DISPLAY_DELAY);
        }
    }

    fn advance_or_finish(&mut self, at: Instant) {
        if self.current_round >= self.total_rounds() {
            self.finish(at);
        } else {
            self.start_next_round(at);
        }
    }

    fn finish(&mut self, at: Instant) {
        self.timers.cancel_all();

        let Some(record) = self.recorder.seal(self.wall_at(at)) else {
            log_warn!("finish requested without an open session");
            self.transition(GameState::Finished);
            return;
        };

        log_info!(
            "session {} finished: {}/{} caught",
            record.id,
            record.caught_count(),
            record.total_rounds()
        );

        self.finished = Some(record.clone());
        self.transition(GameState::Finished);
        self.events.push(GameEvent::SessionCompleted(record));
    }

    fn transition(&mut self, next: GameState) {
        debug!("game state {:?} -> {:?}", self.state, next);
        self.state = next;
        let snapshot = self.snapshot();
        self.events.push(GameEvent::StateChanged(snapshot));
    }

    fn signal(&mut self, cue: Cue) {
        let result = match cue {
            Cue::BiteStart => self
                .feedback
                .on_bite_start(self.settings.vibration_intensity),
            Cue::CatchSuccess => self.feedback.on_catch_success(),
            Cue::Miss => self.feedback.on_miss(),
            Cue::CountdownTick => self.feedback.on_countdown_tick(),
        };

        if let Err(err) = result {
            log_warn!("feedback for {cue:?} failed: {err:#}");
        }
    }

    fn wall_at(&self, at: Instant) -> DateTime<Utc> {
        match self.anchor {
            Some((instant, wall)) => {
                let offset = chrono::Duration::from_std(at.saturating_duration_since(instant))
                    .unwrap_or_else(|_| chrono::Duration::zero());
                wall + offset
            }
            None => self.clock.wall_now(),
        }
    }
}
