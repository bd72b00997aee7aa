#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that replays scripted taps against Cube Slide levels.

mod config;

use std::{fmt, path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Parser};
use cube_slide_core::{CellCoord, Command, Event, GameState};
use cube_slide_system_input::{Input, TapInput};
use cube_slide_system_levels::{load_level, Campaign, LevelAsset, Progress};
use cube_slide_world::{self as world, query, World};
use log::{debug, info, warn};

use config::CliConfig;

const FRAMING_ASPECT: f32 = 16.0 / 9.0;

/// Plays Cube Slide levels headlessly by tapping cells in order.
#[derive(Debug, Parser)]
#[command(name = "cube-slide", version, about)]
#[command(group(ArgGroup::new("source").required(true).args(["level", "levels"])))]
struct Args {
    /// Single level file to play.
    #[arg(long)]
    level: Option<PathBuf>,

    /// Directory of level files, played in file name order.
    #[arg(long)]
    levels: Option<PathBuf>,

    /// One-based campaign level to start from.
    #[arg(long, default_value_t = 1)]
    start: usize,

    /// TOML file with `[session]` and `[palette]` tables.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Cell to tap as `X,Z`. Repeatable; taps carry over into following levels.
    #[arg(long = "tap", value_parser = parse_tap)]
    taps: Vec<CellCoord>,

    /// Ticks allowed for a slide to settle before giving up.
    #[arg(long, default_value_t = 10_000)]
    max_ticks: u32,

    /// Simulated milliseconds per tick.
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,
}

fn parse_tap(raw: &str) -> Result<CellCoord, String> {
    let (x, z) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected X,Z but got {raw:?}"))?;
    let x = x
        .trim()
        .parse::<i32>()
        .map_err(|err| format!("invalid column {x:?}: {err}"))?;
    let z = z
        .trim()
        .parse::<i32>()
        .map_err(|err| format!("invalid row {z:?}: {err}"))?;
    Ok(CellCoord::on_plane(x, z))
}

/// Where a level stood once the taps ran out or the level ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Outcome {
    Completed { level: u32, moves_left: u32 },
    Failed { level: u32 },
    Unfinished { level: u32, moves_left: u32, cubes: usize },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed { level, moves_left } => {
                write!(f, "level {level} complete, moves left: {moves_left}")
            }
            Self::Failed { level } => write!(f, "level {level} failed"),
            Self::Unfinished {
                level,
                moves_left,
                cubes,
            } => write!(
                f,
                "level {level} unfinished, cubes left: {cubes}, moves left: {moves_left}"
            ),
        }
    }
}

struct Session {
    world: World,
    input: Input,
    tick: Duration,
    max_ticks: u32,
}

impl Session {
    fn new(config: &CliConfig, args: &Args) -> Self {
        Self {
            world: World::new(config.session.clone()),
            input: Input::new(),
            tick: Duration::from_millis(args.tick_ms),
            max_ticks: args.max_ticks,
        }
    }

    fn play(
        &mut self,
        asset: &LevelAsset,
        taps: &mut impl Iterator<Item = CellCoord>,
    ) -> Result<Outcome> {
        let events = self.apply(Command::LoadLevel {
            definition: asset.definition.clone(),
        });
        for event in &events {
            if let Event::LevelLoadRejected { level, reason } = event {
                bail!("level {level} was rejected: {reason:?}");
            }
        }

        let cell_size = query::config(&self.world).cell_size;
        if let Some(frame) = asset.frame(cell_size, FRAMING_ASPECT) {
            debug!(
                "camera at {} with orthographic size {}",
                frame.position, frame.orthographic_size
            );
        }

        while query::game_state(&self.world) == GameState::Playing {
            let Some(cell) = taps.next() else {
                break;
            };
            self.tap(cell)?;
        }
        Ok(self.outcome())
    }

    fn tap(&mut self, cell: CellCoord) -> Result<()> {
        let point = query::grid(&self.world).cell_to_world(cell);
        let mut commands = Vec::new();
        self.input
            .handle(TapInput::at(point), &self.world, &mut commands);
        if commands.is_empty() {
            warn!("tap at {cell} did not hit a clickable cube");
        }
        for command in commands {
            let _ = self.apply(command);
        }
        self.settle()
            .with_context(|| format!("slide started by tap at {cell} never settled"))
    }

    fn settle(&mut self) -> Result<()> {
        for _ in 0..self.max_ticks {
            if query::is_idle(&self.world) {
                return Ok(());
            }
            let _ = self.apply(Command::Tick { dt: self.tick });
        }
        if !query::is_idle(&self.world) {
            bail!(
                "{} slides still in flight after {} ticks",
                query::in_flight_moves(&self.world),
                self.max_ticks
            );
        }
        Ok(())
    }

    fn apply(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        for event in &events {
            match event {
                Event::TimeAdvanced { .. } => {}
                Event::LevelCompleted { .. } | Event::LevelFailed { .. } => info!("{event:?}"),
                _ => debug!("{event:?}"),
            }
        }
        events
    }

    fn outcome(&self) -> Outcome {
        let level = query::current_level(&self.world);
        let moves_left = query::moves_left(&self.world);
        match query::game_state(&self.world) {
            GameState::LevelComplete => Outcome::Completed { level, moves_left },
            GameState::LevelFailed => Outcome::Failed { level },
            _ => Outcome::Unfinished {
                level,
                moves_left,
                cubes: query::live_cube_count(&self.world),
            },
        }
    }
}

/// Entry point for the Cube Slide command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = CliConfig::load(args.config.as_deref())?;
    let mut session = Session::new(&config, &args);
    let mut taps = args.taps.iter().copied();

    if let Some(path) = &args.level {
        let asset = load_level(path, &config.palette)
            .with_context(|| format!("failed to load level {}", path.display()))?;
        println!("{}", session.play(&asset, &mut taps)?);
        return Ok(());
    }

    let Some(dir) = &args.levels else {
        bail!("either --level or --levels must be provided");
    };
    let mut campaign = Campaign::from_dir(dir, &config.palette)
        .with_context(|| format!("failed to load levels from {}", dir.display()))?;
    let mut asset = campaign.start(args.start).clone();
    loop {
        let outcome = session.play(&asset, &mut taps)?;
        println!("{outcome}");
        if !matches!(outcome, Outcome::Completed { .. }) {
            break;
        }
        match campaign.next() {
            Progress::Level(next) => asset = next.clone(),
            Progress::AllLevelsCompleted => {
                println!("all levels completed");
                break;
            }
        }
    }
    Ok(())
}
