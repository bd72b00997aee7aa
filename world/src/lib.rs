#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Cube Slide.
//!
//! The world owns the spatial grid, the cube pool, the slides in flight and
//! the game session. Every mutation flows through [`apply`]; read access is
//! exposed through the [`query`] module.

mod config;
mod cube;
mod grid;
mod pool;
mod session;
mod slide;

pub use config::{ConfigError, SessionConfig, MAX_EXIT_MARGIN_CELLS};
pub use cube::{Clickable, Cube, GridObject, Movable};
pub use grid::{CellType, GridError, SpatialGrid};
pub use pool::{ObjectPool, OverflowPolicy, PoolError, Poolable};
pub use session::GameSession;
pub use slide::{MoveResolver, StepOutcome};

use std::time::Duration;

use cube_slide_core::{
    Command, CubeId, CubeKind, Direction, Event, LevelDefinition, LoadRejection, MoveRejection,
    MoveResult, SpawnEntry, SpawnRejection,
};
use log::{debug, error, info, warn};

use slide::Slide;

/// Represents the authoritative Cube Slide world state.
#[derive(Debug)]
pub struct World {
    config: SessionConfig,
    grid: SpatialGrid,
    pool: ObjectPool<Cube>,
    resolver: MoveResolver,
    session: GameSession,
    live: Vec<CubeId>,
    slides: Vec<Slide>,
}

impl World {
    /// Creates a world sitting in the menu with a preallocated cube pool.
    ///
    /// Invalid config fields are repaired with a warning; see
    /// [`SessionConfig::sanitized`].
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        let config = config.sanitized();
        let mut pool = ObjectPool::new(config.pool_overflow);
        if let Err(err) =
            pool.register_kind(CubeKind::Basic, config.pool_initial_size, Cube::pooled)
        {
            error!("failed to preallocate the cube pool: {err}");
        }

        Self {
            grid: SpatialGrid::new(Default::default(), config.cell_size),
            resolver: MoveResolver::new(config.exit_margin, config.step_duration()),
            session: GameSession::new(),
            pool,
            live: Vec::new(),
            slides: Vec::new(),
            config,
        }
    }

    fn live_cube(&self, id: CubeId) -> Option<&Cube> {
        if self.live.contains(&id) {
            self.pool.get(id)
        } else {
            None
        }
    }

    fn load_level(&mut self, definition: LevelDefinition, out_events: &mut Vec<Event>) {
        if definition.grid_size.is_empty() {
            warn!(
                "level {} rejected: grid {:?} has an empty axis",
                definition.level, definition.grid_size
            );
            out_events.push(Event::LevelLoadRejected {
                level: definition.level,
                reason: LoadRejection::EmptyGrid,
            });
            return;
        }

        self.teardown(out_events);
        self.grid.resize(definition.grid_size);
        for cell in &definition.blocked {
            if !self.grid.set_cell_type(*cell, CellType::Blocked) {
                warn!("blocked cell {cell} lies outside the grid");
            }
        }

        self.session
            .start_level(definition.level, definition.moves, out_events);

        let mut entries: Vec<&SpawnEntry> = definition.cubes.iter().collect();
        entries.sort_by_key(|entry| entry.cell.z());
        for entry in entries {
            let _ = self.spawn_cube(entry, out_events);
        }

        info!(
            "level {} loaded with {} cubes",
            definition.level,
            self.live.len()
        );
        out_events.push(Event::LevelStarted {
            level: definition.level,
        });
    }

    fn spawn_cube(&mut self, entry: &SpawnEntry, out_events: &mut Vec<Event>) -> Option<CubeId> {
        let rejection = if !self.grid.is_in_bounds(entry.cell) {
            Some(SpawnRejection::OutOfBounds)
        } else if self.grid.is_blocked(entry.cell) {
            Some(SpawnRejection::BlockedCell)
        } else if !self.grid.is_occupiable(entry.cell, None) {
            Some(SpawnRejection::Occupied)
        } else {
            None
        };
        if let Some(reason) = rejection {
            warn!("skipping cube at {}: {reason:?}", entry.cell);
            out_events.push(Event::SpawnRejected {
                cell: entry.cell,
                reason,
            });
            return None;
        }

        let id = match self.pool.acquire(CubeKind::Basic) {
            Ok(id) => id,
            Err(err) => {
                warn!("cannot spawn cube at {}: {err}", entry.cell);
                out_events.push(Event::SpawnRejected {
                    cell: entry.cell,
                    reason: SpawnRejection::PoolExhausted,
                });
                return None;
            }
        };
        let cube = self.pool.get_mut(id)?;
        cube.initialize(entry);
        self.grid.register(&*cube);
        self.live.push(id);

        out_events.push(Event::CubeSpawned {
            cube: id,
            cell: entry.cell,
            direction: entry.direction,
            color: entry.color,
        });
        Some(id)
    }

    fn move_rejection(&self, id: CubeId) -> Option<MoveRejection> {
        if !self.session.is_playing() {
            return Some(MoveRejection::NotPlaying);
        }
        let Some(cube) = self.live_cube(id) else {
            return Some(MoveRejection::UnknownCube);
        };
        if cube.is_moving() {
            return Some(MoveRejection::CubeMoving);
        }
        if !self.slides.is_empty() && !self.config.allow_simultaneous_moves {
            return Some(MoveRejection::Busy);
        }
        None
    }

    fn request_move(&mut self, id: CubeId, direction: Direction, out_events: &mut Vec<Event>) {
        if let Some(reason) = self.move_rejection(id) {
            reject_move(id, reason, out_events);
            return;
        }
        if !self.session.use_move(out_events) {
            reject_move(id, MoveRejection::NoMovesLeft, out_events);
            return;
        }

        if let Some(cube) = self.pool.get_mut(id) {
            cube.set_moving(true);
        }
        out_events.push(Event::MoveStarted { cube: id });
        debug!("cube {id:?} starts sliding {direction:?}");

        let slide = Slide::new(id, direction);
        if self.step_slide(&slide, out_events) {
            self.check_level_end(out_events);
        } else {
            let index = self
                .slides
                .partition_point(|pending| pending.cube < slide.cube);
            self.slides.insert(index, slide);
        }
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if !self.session.is_playing() {
            return;
        }
        out_events.push(Event::TimeAdvanced { dt });
        if self.slides.is_empty() {
            return;
        }

        let interval = self.resolver.step_duration();
        let slides = std::mem::take(&mut self.slides);
        let mut in_flight = Vec::with_capacity(slides.len());
        let mut settled = false;
        for mut slide in slides {
            slide.accumulate(dt);
            let mut finished = false;
            while !finished && slide.take_step(interval) {
                finished = self.step_slide(&slide, out_events);
            }
            if finished {
                settled = true;
            } else {
                in_flight.push(slide);
            }
        }
        self.slides = in_flight;

        if settled {
            self.check_level_end(out_events);
        }
    }

    /// Runs one step of the slide. Returns `true` once the slide is over.
    fn step_slide(&mut self, slide: &Slide, out_events: &mut Vec<Event>) -> bool {
        let id = slide.cube;
        if !self.live.contains(&id) {
            debug!("dropping slide of released cube {id:?}");
            return true;
        }
        let Some(cube) = self.pool.get_mut(id) else {
            warn!("slide references unknown cube {id:?}");
            return true;
        };

        match self.resolver.step(&mut self.grid, cube, slide.direction) {
            Ok(StepOutcome::Advanced { from, to }) => {
                out_events.push(Event::CubeAdvanced { cube: id, from, to });
                false
            }
            Ok(StepOutcome::ExitedBoard) => {
                self.clear_cube(id, out_events);
                true
            }
            Ok(StepOutcome::Blocked { obstacle }) => {
                self.stop_cube(id);
                if let Some(obstacle) = obstacle {
                    debug!("cube {id:?} collided with {obstacle:?}");
                    out_events.push(Event::Collision {
                        moving: id,
                        obstacle,
                    });
                }
                out_events.push(Event::MoveCompleted {
                    cube: id,
                    result: MoveResult::Blocked,
                });
                true
            }
            Err(err) => {
                error!("slide of cube {id:?} aborted: {err}");
                self.stop_cube(id);
                out_events.push(Event::MoveCompleted {
                    cube: id,
                    result: MoveResult::Failed,
                });
                true
            }
        }
    }

    fn stop_cube(&mut self, id: CubeId) {
        if let Some(cube) = self.pool.get_mut(id) {
            cube.set_moving(false);
        }
    }

    fn clear_cube(&mut self, id: CubeId, out_events: &mut Vec<Event>) {
        if let Some(cube) = self.pool.get(id) {
            self.grid.unregister(cube);
        }
        self.live.retain(|live| *live != id);
        match self.pool.release(id) {
            Ok(()) => out_events.push(Event::CubeReleased { cube: id }),
            Err(err) => warn!("failed to release cube {id:?}: {err}"),
        }
        debug!("cube {id:?} left the board, {} remain", self.live.len());
        out_events.push(Event::MoveCompleted {
            cube: id,
            result: MoveResult::Success,
        });
    }

    // Only runs once a slide settles, so a freshly loaded level with no cubes
    // or an empty budget stays playing until a move is made or moves are added.
    fn check_level_end(&mut self, out_events: &mut Vec<Event>) {
        if !self.session.is_playing() || !self.slides.is_empty() {
            return;
        }
        if self.live.is_empty() {
            self.session.complete_level(out_events);
        } else if self.session.moves_left() == 0 {
            self.session.fail_level(out_events);
            self.release_live_cubes(out_events);
        }
    }

    fn release_live_cubes(&mut self, out_events: &mut Vec<Event>) {
        let live = std::mem::take(&mut self.live);
        for id in &live {
            out_events.push(Event::CubeReleased { cube: *id });
        }
        let released = self.pool.release_all(CubeKind::Basic);
        self.grid.clear();
        if released != live.len() {
            warn!(
                "released {released} pooled cubes while {} were live",
                live.len()
            );
        }
    }

    fn teardown(&mut self, out_events: &mut Vec<Event>) {
        for slide in std::mem::take(&mut self.slides) {
            debug!("cancelling slide of cube {:?}", slide.cube);
            self.stop_cube(slide.cube);
        }
        self.release_live_cubes(out_events);
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

fn reject_move(id: CubeId, reason: MoveRejection, out_events: &mut Vec<Event>) {
    debug!("move of cube {id:?} rejected: {reason:?}");
    out_events.push(Event::MoveRejected { cube: id, reason });
    out_events.push(Event::MoveCompleted {
        cube: id,
        result: MoveResult::Failed,
    });
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::LoadLevel { definition } => world.load_level(definition, out_events),
        Command::UnloadLevel => {
            world.teardown(out_events);
            world.grid.resize(Default::default());
            world.session.return_to_menu(out_events);
        }
        Command::SpawnCube { entry } => {
            if world.session.is_playing() {
                let _ = world.spawn_cube(&entry, out_events);
            } else {
                debug!("ignoring spawn at {} outside a running level", entry.cell);
            }
        }
        Command::RequestMove { cube, direction } => world.request_move(cube, direction, out_events),
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::TogglePause => world.session.toggle_pause(out_events),
        Command::AddMoves { amount } => world.session.add_moves(amount, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use cube_slide_core::{CellCoord, CubeId, CubeView, GameState};

    use super::{Cube, GameSession, GridObject, ObjectPool, SessionConfig, SpatialGrid, World};

    /// Provides read-only access to the spatial grid.
    #[must_use]
    pub fn grid(world: &World) -> &SpatialGrid {
        &world.grid
    }

    /// Provides read-only access to the game session.
    #[must_use]
    pub fn session(world: &World) -> &GameSession {
        &world.session
    }

    /// Current coarse game state.
    #[must_use]
    pub fn game_state(world: &World) -> GameState {
        world.session.state()
    }

    /// Moves left in the running level.
    #[must_use]
    pub fn moves_left(world: &World) -> u32 {
        world.session.moves_left()
    }

    /// Level number of the running (or last) level.
    #[must_use]
    pub fn current_level(world: &World) -> u32 {
        world.session.level()
    }

    /// Number of cubes still on the board.
    #[must_use]
    pub fn live_cube_count(world: &World) -> usize {
        world.live.len()
    }

    /// Live cube behind the identifier.
    #[must_use]
    pub fn cube(world: &World, id: CubeId) -> Option<&Cube> {
        world.live_cube(id)
    }

    /// Live cube registered at the cell, if any.
    #[must_use]
    pub fn cube_at(world: &World, cell: CellCoord) -> Option<&Cube> {
        world
            .grid
            .occupants(cell)
            .iter()
            .find_map(|id| world.live_cube(*id))
            .filter(|cube| cube.cell() == cell)
    }

    /// Captures a read-only view of the cubes on the board.
    #[must_use]
    pub fn cube_view(world: &World) -> CubeView {
        CubeView::from_snapshots(
            world
                .live
                .iter()
                .filter_map(|id| world.pool.get(*id))
                .map(Cube::snapshot)
                .collect(),
        )
    }

    /// Number of slides currently in flight.
    #[must_use]
    pub fn in_flight_moves(world: &World) -> usize {
        world.slides.len()
    }

    /// Whether no slide is in flight.
    #[must_use]
    pub fn is_idle(world: &World) -> bool {
        world.slides.is_empty()
    }

    /// Provides read-only access to the cube pool.
    #[must_use]
    pub fn pool(world: &World) -> &ObjectPool<Cube> {
        &world.pool
    }

    /// Configuration the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &SessionConfig {
        &world.config
    }
}
