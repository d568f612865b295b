use anyhow::{anyhow, Context, Result};
use log::debug;
use rand::Rng;
use std::time::Instant;
use tokio::{
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
    time,
};
use tokio_util::sync::CancellationToken;

use super::clock::Clock;
use super::scheduler::RoundScheduler;
use super::state::GameEvent;
use crate::models::Difficulty;
use crate::settings::AppSettings;

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

#[derive(Debug, Clone)]
pub enum PlayerInput {
    Start {
        difficulty: Difficulty,
        settings: AppSettings,
    },
    Catch,
    Continue,
    End,
}

/// Runs a [`RoundScheduler`] on a tokio task. Inputs go in over a channel,
/// and every [`GameEvent`] the scheduler produces comes out on `events`.
pub struct GameController {
    inputs: UnboundedSender<PlayerInput>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl GameController {
    pub fn spawn<C, R>(scheduler: RoundScheduler<C, R>, events: UnboundedSender<GameEvent>) -> Self
    where
        C: Clock + 'static,
        R: Rng + Send + 'static,
    {
        let (inputs, receiver) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_game_loop(scheduler, receiver, events, cancel.clone()));

        Self {
            inputs,
            cancel,
            task,
        }
    }

    pub fn send(&self, input: PlayerInput) -> Result<()> {
        self.inputs
            .send(input)
            .map_err(|_| anyhow!("game loop has stopped"))
    }

    pub fn start_game(&self, difficulty: Difficulty, settings: AppSettings) -> Result<()> {
        self.send(PlayerInput::Start {
            difficulty,
            settings,
        })
    }

    pub fn catch_fish(&self) -> Result<()> {
        self.send(PlayerInput::Catch)
    }

    pub fn continue_after_result(&self) -> Result<()> {
        self.send(PlayerInput::Continue)
    }

    pub fn end_game(&self) -> Result<()> {
        self.send(PlayerInput::End)
    }

    /// Stops the loop and waits for the task. Pending timers are dropped with it.
    pub async fn shutdown(self) -> Result<()> {
        self.cancel.cancel();
        self.task.await.context("game loop task panicked")?;
        Ok(())
    }
}

async fn run_game_loop<C: Clock, R: Rng>(
    mut scheduler: RoundScheduler<C, R>,
    mut inputs: UnboundedReceiver<PlayerInput>,
    events: UnboundedSender<GameEvent>,
    cancel: CancellationToken,
) {
    log_info!("game loop started");

    loop {
        let deadline = scheduler.next_deadline();

        tokio::select! {
            _ = cancel.cancelled() => break,
            input = inputs.recv() => match input {
                Some(input) => apply_input(&mut scheduler, input),
                None => break,
            },
            _ = sleep_until(deadline) => scheduler.poll(),
        }

        for event in scheduler.take_events() {
            if events.send(event).is_err() {
                debug!("game event receiver dropped");
            }
        }
    }

    if !scheduler.state().is_idle() {
        scheduler.end_game();
    }
    log_info!("game loop stopped");
}

fn apply_input<C: Clock, R: Rng>(scheduler: &mut RoundScheduler<C, R>, input: PlayerInput) {
    match input {
        PlayerInput::Start {
            difficulty,
            settings,
        } => {
            if !scheduler.start_game(difficulty, settings) {
                log_warn!("start request dropped, a game is already running");
            }
        }
        PlayerInput::Catch => {
            scheduler.catch_fish();
        }
        PlayerInput::Continue => scheduler.continue_after_result(),
        PlayerInput::End => scheduler.end_game(),
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameState, LogFeedback, SystemClock};
    use rand::{rngs::StdRng, SeedableRng};
    use std::time::Duration;

    fn controller() -> (GameController, UnboundedReceiver<GameEvent>) {
        let scheduler = RoundScheduler::new(
            SystemClock,
            StdRng::seed_from_u64(11),
            Box::new(LogFeedback::default()),
        );
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        (GameController::spawn(scheduler, events_tx), events_rx)
    }

    async fn wait_for_state(events: &mut UnboundedReceiver<GameEvent>, wanted: GameState) {
        loop {
            match events.recv().await {
                Some(GameEvent::StateChanged(snapshot)) if snapshot.state == wanted => return,
                Some(_) => continue,
                None => panic!("event stream closed before {wanted:?}"),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn bite_then_catch_over_the_channel() {
        let (game, mut events) = controller();
        let settings = AppSettings {
            show_countdown: false,
            ..AppSettings::default()
        };

        game.start_game(Difficulty::Beginner, settings).unwrap();
        wait_for_state(&mut events, GameState::Bite).await;

        time::advance(Duration::from_millis(300)).await;
        game.catch_fish().unwrap();

        let recorded = loop {
            match events.recv().await {
                Some(GameEvent::RoundRecorded(outcome)) => break outcome,
                Some(_) => continue,
                None => panic!("event stream closed"),
            }
        };
        assert!(recorded.caught);
        assert_eq!(recorded.round_number, 1);
        let reaction = recorded.reaction_time.unwrap();
        assert!((0.3..3.0).contains(&reaction));

        game.end_game().unwrap();
        wait_for_state(&mut events, GameState::Idle).await;
        game.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn unattended_game_runs_to_completion() {
        let (game, mut events) = controller();
        game.start_game(Difficulty::Pro, AppSettings::default())
            .unwrap();

        let session = time::timeout(Duration::from_secs(600), async {
            loop {
                match events.recv().await {
                    Some(GameEvent::SessionCompleted(session)) => return session,
                    Some(_) => continue,
                    None => panic!("event stream closed"),
                }
            }
        })
        .await
        .expect("session should complete");

        assert_eq!(session.total_rounds(), 20);
        assert_eq!(session.caught_count(), 0);
        assert!(session.is_sealed());
        game.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn send_fails_after_shutdown() {
        let (game, _events) = controller();
        let inputs = game.inputs.clone();
        game.shutdown().await.unwrap();

        assert!(inputs.send(PlayerInput::Catch).is_err());
    }
}
