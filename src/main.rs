use anyhow::{Context, Result};
use chrono::Local;
use rand::{rngs::StdRng, SeedableRng};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};

use fishbite::{
    stats::format, AppContext, Difficulty, GameController, GameEvent, GameState, LogFeedback,
    RoundScheduler, SessionRecord, SystemClock,
};

#[tokio::main]
async fn main() -> Result<()> {
    fishbite::init_logging();

    let data_dir = fishbite::data_dir();
    let mut app = AppContext::open(&data_dir)
        .with_context(|| format!("failed to open data directory {}", data_dir.display()))?;

    let settings = app.settings.get();
    let difficulty = match std::env::args().nth(1) {
        Some(arg) => arg.parse::<Difficulty>()?,
        None => settings.selected_difficulty,
    };
    let auto_next = settings.auto_next_round;

    println!("{} ({})", difficulty.as_str(), difficulty.description());
    println!("Press Enter when the fish bites.");

    let scheduler = RoundScheduler::new(
        SystemClock,
        StdRng::from_entropy(),
        Box::new(LogFeedback::default()),
    );
    let (events_tx, mut events) = mpsc::unbounded_channel();
    let game = GameController::spawn(scheduler, events_tx);
    game.start_game(difficulty, settings)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut state = GameState::Idle;

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(GameEvent::StateChanged(snapshot)) => {
                    state = snapshot.state;
                    print_state(state, snapshot.current_round, snapshot.total_rounds, auto_next);
                }
                Some(GameEvent::RoundRecorded(_)) => {}
                Some(GameEvent::SessionCompleted(session)) => {
                    // History writes wait on the database thread.
                    let unlocked = tokio::task::block_in_place(|| {
                        app.history.add_session(session.clone(), &Local::now())
                    });
                    print_summary(&app, &session, &unlocked);
                    break;
                }
                None => break,
            },
            line = lines.next_line() => match line? {
                Some(_) if state == GameState::Bite => game.catch_fish()?,
                Some(_) if state.is_result() => game.continue_after_result()?,
                Some(_) => game.catch_fish()?,
                None => {
                    game.end_game()?;
                    break;
                }
            },
        }
    }

    game.shutdown().await
}

fn print_state(state: GameState, round: u32, total: u32, auto_next: bool) {
    match state {
        GameState::Countdown(n) => println!("{n}..."),
        GameState::Waiting => println!("Round {round}/{total}: waiting for a bite..."),
        GameState::Bite => println!("BITE!"),
        GameState::Caught(reaction) => {
            let rating = fishbite::ReactionRating::from_reaction_time(Some(reaction));
            println!("{} {}", rating.label(), format::reaction_time(Some(reaction)));
        }
        GameState::Missed => println!("{}", fishbite::ReactionRating::Missed.label()),
        GameState::Idle | GameState::Finished => {}
    }
    if state.is_result() && !auto_next {
        println!("Press Enter to continue.");
    }
}

fn print_summary(app: &AppContext, session: &SessionRecord, unlocked: &[String]) {
    println!();
    println!(
        "Caught {}/{} ({})",
        session.caught_count(),
        session.total_rounds(),
        format::percentage(session.success_rate())
    );
    println!(
        "Average {}  Best {}  Time {}",
        format::reaction_time(session.average_reaction_time()),
        format::reaction_time(session.best_reaction_time()),
        format::duration(session.duration(chrono::Utc::now()))
    );
    if app.history.is_new_record(session) {
        println!("New personal record!");
    }
    for id in unlocked {
        if let Some(achievement) = app.history.achievement_engine().get(id) {
            println!("Achievement unlocked: {}", achievement.title);
        }
    }
    println!(
        "Streak: {} day(s), {} sessions total",
        app.history.current_streak(&Local::now()),
        app.history.totals().sessions
    );
}
