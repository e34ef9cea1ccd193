//! Memory House headless runner
//!
//! Loads a level (or the built-in ground floor), walks the player toward each
//! memory in turn and logs every gameplay event. Useful for checking level
//! layouts and tuning without a renderer.
//!
//! Usage: `memory-house [LEVEL.json] [--settings FILE] [--seed N] [--seconds S]`

use std::path::PathBuf;
use std::process::ExitCode;

use glam::Vec2;

use memory_house::Settings;
use memory_house::sim::{GameEvent, GameState, Level, TickInput, load_level_from_path, tick};

const FRAME_DT: f32 = 1.0 / 60.0;

struct Args {
    level: Option<PathBuf>,
    settings: Option<PathBuf>,
    seed: u64,
    seconds: f32,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        level: None,
        settings: None,
        seed: 1,
        seconds: 60.0,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--settings" => {
                args.settings = Some(it.next().ok_or("--settings needs a path")?.into());
            }
            "--seed" => {
                let raw = it.next().ok_or("--seed needs a number")?;
                args.seed = raw.parse().map_err(|e| format!("bad seed '{raw}': {e}"))?;
            }
            "--seconds" => {
                let raw = it.next().ok_or("--seconds needs a number")?;
                args.seconds = raw.parse().map_err(|e| format!("bad duration '{raw}': {e}"))?;
            }
            _ if arg.starts_with("--") => return Err(format!("unknown option '{arg}'")),
            _ => args.level = Some(arg.into()),
        }
    }
    Ok(args)
}

/// Head for the nearest memory still lying around
fn autopilot(state: &GameState) -> Vec2 {
    let here = state.player.position;
    state
        .world
        .entities
        .iter()
        .filter(|e| e.memory.is_some())
        .map(|e| e.position)
        .min_by(|a, b| a.distance_squared(here).total_cmp(&b.distance_squared(here)))
        .map(|target| target - here)
        .unwrap_or(Vec2::ZERO)
}

fn log_event(time: f32, event: &GameEvent) {
    match event {
        GameEvent::MemoryCollected { id, photo } => {
            log::info!("[{time:6.2}s] memory {id} found: {photo}");
        }
        GameEvent::CollisionStarted { contact } => {
            log::info!(
                "[{time:6.2}s] bumped into something at ({:.0}, {:.0})",
                contact.x,
                contact.y
            );
        }
        GameEvent::FacingChanged { from, to } => {
            log::debug!("[{time:6.2}s] turned {} -> {}", from.as_str(), to.as_str());
        }
        other => log::info!("[{time:6.2}s] {other:?}"),
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let settings = args
        .settings
        .as_deref()
        .map(Settings::load_or_default)
        .unwrap_or_default();

    let level = match args.level.as_deref() {
        Some(path) => match load_level_from_path(path) {
            Ok(level) => level,
            Err(e) => {
                log::error!("{e}");
                return ExitCode::FAILURE;
            }
        },
        None => Level::demo_house(),
    };

    log::info!("Memory House (headless) starting on '{}'", level.name);
    let mut state = GameState::new(level, settings, args.seed);

    let frames = (args.seconds.max(0.0) / FRAME_DT) as u64;
    for _ in 0..frames {
        let input = TickInput::moving(autopilot(&state));
        tick(&mut state, &input, FRAME_DT);
        for event in state.events.drain() {
            log_event(state.time, &event);
        }
        if state.all_memories_collected() {
            break;
        }
    }

    let found: Vec<&str> = state
        .world
        .collected()
        .iter()
        .map(|m| m.photo.as_str())
        .collect();
    log::info!(
        "finished after {:.1}s at ({:.0}, {:.0}); {} memories found {:?}",
        state.time,
        state.player.position.x,
        state.player.position.y,
        found.len(),
        found
    );
    ExitCode::SUCCESS
}
