//! Beatdash headless runner
//!
//! Loads a level declaration, plays attempts with no input until the player
//! dies or finishes, and logs how far it got. Handy for checking that a level
//! loads cleanly and that its opening is survivable.
//!
//! Usage: `beatdash-headless <level.json> [tuning.json] [attempts]`

use std::fmt;
use std::process::ExitCode;
use std::{env, fs, io};

use beatdash::audio::AudioManager;
use beatdash::level::{Level, LevelLoadError};
use beatdash::sim::{DEFAULT_VIEWPORT, GameEvent, GamePhase, GameState, TickInput, tick};
use beatdash::{Progression, Tuning};

const FRAME_DT: f32 = 1.0 / 60.0;
/// Ten minutes of play per attempt
const MAX_TICKS: u64 = 60 * 60 * 10;

#[derive(Debug)]
enum RunError {
    Usage,
    Io(String, io::Error),
    Level(LevelLoadError),
    Json(serde_json::Error),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::Usage => write!(f, "usage: beatdash-headless <level.json> [tuning.json] [attempts]"),
            RunError::Io(path, e) => write!(f, "{path}: {e}"),
            RunError::Level(e) => write!(f, "level failed to load: {e}"),
            RunError::Json(e) => write!(f, "invalid JSON: {e}"),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RunError::Usage => None,
            RunError::Io(_, e) => Some(e),
            RunError::Level(e) => Some(e),
            RunError::Json(e) => Some(e),
        }
    }
}

impl From<LevelLoadError> for RunError {
    fn from(e: LevelLoadError) -> Self {
        RunError::Level(e)
    }
}

impl From<serde_json::Error> for RunError {
    fn from(e: serde_json::Error) -> Self {
        RunError::Json(e)
    }
}

fn read(path: &str) -> Result<String, RunError> {
    fs::read_to_string(path).map_err(|e| RunError::Io(path.to_string(), e))
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(env::args().skip(1).collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<(), RunError> {
    let level_path = args.first().ok_or(RunError::Usage)?;
    let level = Level::from_json(&read(level_path)?)?;

    let tuning = match args.get(1) {
        Some(path) => Tuning::from_json(&read(path)?)?,
        None => Tuning::default(),
    };
    let attempts: u32 = match args.get(2) {
        Some(n) => n.parse().map_err(|_| RunError::Usage)?,
        None => 1,
    };

    let seed: u64 = rand::random();
    let name = level.metadata.name.clone();
    let difficulty = level.metadata.difficulty;
    let mut state = GameState::new(level, &tuning, DEFAULT_VIEWPORT, seed);
    let mut audio = AudioManager::default();
    let mut progression = Progression::new();

    for attempt in 1..=attempts {
        if attempt > 1 {
            tick(
                &mut state,
                &TickInput {
                    restart: true,
                    ..Default::default()
                },
                FRAME_DT,
            );
        }
        progression.record_attempt();

        let input = TickInput::default();
        for _ in 0..MAX_TICKS {
            if state.phase != GamePhase::Playing {
                break;
            }
            tick(&mut state, &input, FRAME_DT);

            let events = state.drain_events();
            audio.route(&events);
            for event in &events {
                match event {
                    GameEvent::Died { progress } => {
                        progression.update_level_progress(&name, *progress);
                    }
                    GameEvent::Completed { coins } => {
                        progression.complete_level(&name, *coins, difficulty);
                    }
                    GameEvent::CoinCollected { slot } => log::debug!("Coin in slot {slot:?}"),
                    GameEvent::ModeChanged { from, to } => log::debug!("{from:?} -> {to:?}"),
                    _ => {}
                }
            }
        }

        log::info!(
            "Attempt {}: {:?} at {:.1}% after {:.2}s",
            state.attempts,
            state.phase,
            state.progress() * 100.0,
            state.time
        );
    }

    println!("{}", progression.to_json()?);
    Ok(())
}
