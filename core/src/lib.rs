#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Cube Slide engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for the
//! presentation layer and systems to react to. Systems consume event streams,
//! query immutable snapshots, and respond exclusively with new command batches.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Tears down the current level and loads the provided definition.
    LoadLevel {
        /// Fully parsed level contents.
        definition: LevelDefinition,
    },
    /// Releases every cube of the current level and returns to the menu.
    UnloadLevel,
    /// Places an additional cube on the running level.
    SpawnCube {
        /// Placement of the new cube.
        entry: SpawnEntry,
    },
    /// Requests that a cube slide in the provided direction.
    RequestMove {
        /// Cube the player selected.
        cube: CubeId,
        /// Direction of travel for the slide.
        direction: Direction,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Switches between playing and paused.
    TogglePause,
    /// Grants additional moves to the running level.
    AddMoves {
        /// Number of moves added to the remaining budget.
        amount: u32,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced while playing.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// A cube was drawn from the pool and placed on the grid.
    CubeSpawned {
        /// Identifier of the spawned cube.
        cube: CubeId,
        /// Cell the cube occupies after spawning.
        cell: CellCoord,
        /// Direction the cube slides in when tapped.
        direction: Direction,
        /// Appearance applied to the cube.
        color: CubeColor,
    },
    /// A spawn entry could not be placed.
    SpawnRejected {
        /// Cell requested by the spawn entry.
        cell: CellCoord,
        /// Why the entry was skipped.
        reason: SpawnRejection,
    },
    /// A cube was returned to the pool.
    CubeReleased {
        /// Identifier of the released cube.
        cube: CubeId,
    },
    /// A move request was accepted and the slide began.
    MoveStarted {
        /// Cube that started sliding.
        cube: CubeId,
    },
    /// A move request was refused before any stepping happened.
    MoveRejected {
        /// Cube named in the request.
        cube: CubeId,
        /// Why the request was refused.
        reason: MoveRejection,
    },
    /// A cube advanced a single cell during a slide.
    CubeAdvanced {
        /// Cube that advanced.
        cube: CubeId,
        /// Cell occupied before the step.
        from: CellCoord,
        /// Cell occupied after the step.
        to: CellCoord,
    },
    /// A sliding cube ran into another cube.
    Collision {
        /// Cube that was sliding.
        moving: CubeId,
        /// Cube that stopped it.
        obstacle: CubeId,
    },
    /// A move request settled.
    MoveCompleted {
        /// Cube named in the request.
        cube: CubeId,
        /// Final outcome of the request.
        result: MoveResult,
    },
    /// The remaining move budget changed.
    MovesChanged {
        /// Moves left after the change.
        moves_left: u32,
    },
    /// The coarse game state changed.
    GameStateChanged {
        /// State after the transition.
        state: GameState,
    },
    /// A level finished loading and its cubes were spawned.
    LevelStarted {
        /// Level number.
        level: u32,
    },
    /// The board was cleared.
    LevelCompleted {
        /// Level number.
        level: u32,
    },
    /// The move budget ran out with cubes left on the board.
    LevelFailed {
        /// Level number.
        level: u32,
    },
    /// A level definition was refused and nothing was changed.
    LevelLoadRejected {
        /// Level number carried by the refused definition.
        level: u32,
        /// Why the definition was refused.
        reason: LoadRejection,
    },
}

/// Final outcome reported for every move request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveResult {
    /// The cube slid off the board and was cleared.
    Success,
    /// The request was refused (busy, no budget, wrong state).
    Failed,
    /// The cube stopped against another cube or blocked terrain.
    Blocked,
    /// Presentation-side outcome for moves aimed off the playable area.
    /// The world itself never reports it; run-off is part of a successful clear.
    OutOfBounds,
    /// Presentation-side outcome for budget exhaustion.
    /// The world reports refused requests as [`MoveResult::Failed`] with a
    /// [`MoveRejection::NoMovesLeft`] reason instead.
    NoMovesLeft,
}

/// Reasons a move request is refused before the slide starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveRejection {
    /// The game is not in the playing state.
    NotPlaying,
    /// The cube is not part of the running level.
    UnknownCube,
    /// The cube is already sliding.
    CubeMoving,
    /// Another slide is in flight and simultaneous moves are disabled.
    Busy,
    /// The move budget is spent.
    NoMovesLeft,
}

/// Reasons a spawn entry is skipped while loading a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnRejection {
    /// The requested cell lies outside the configured grid.
    OutOfBounds,
    /// Another cube already occupies the requested cell.
    Occupied,
    /// The requested cell is impassable terrain.
    BlockedCell,
    /// The pool had no instance to hand out.
    PoolExhausted,
}

/// Reasons a level definition is refused outright.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoadRejection {
    /// At least one grid axis has zero length.
    EmptyGrid,
}

/// Coarse state of the running game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameState {
    /// No level is running.
    Menu,
    /// A level is running and accepts moves.
    Playing,
    /// A level is suspended; slides do not advance.
    Paused,
    /// The board was cleared.
    LevelComplete,
    /// The move budget ran out.
    LevelFailed,
}

/// Cardinal slide directions on the board plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing z (rows grow downward).
    Up,
    /// Movement toward increasing z.
    Down,
    /// Movement toward decreasing x.
    Left,
    /// Movement toward increasing x.
    Right,
}

impl Direction {
    /// Every direction in declaration order.
    pub const ALL: [Direction; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// Unit cell offset travelled by a single step in this direction.
    #[must_use]
    pub const fn delta(self) -> CellCoord {
        match self {
            Self::Up => CellCoord::new(0, 0, -1),
            Self::Down => CellCoord::new(0, 0, 1),
            Self::Left => CellCoord::new(-1, 0, 0),
            Self::Right => CellCoord::new(1, 0, 0),
        }
    }

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Location of a single lattice cell. Signed so run-off cells past the grid
/// edge remain representable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    x: i32,
    y: i32,
    z: i32,
}

impl CellCoord {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Creates a coordinate on the board plane (`y == 0`).
    #[must_use]
    pub const fn on_plane(x: i32, z: i32) -> Self {
        Self { x, y: 0, z }
    }

    /// Column index.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Layer index; conventionally zero.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Row index.
    #[must_use]
    pub const fn z(&self) -> i32 {
        self.z
    }

    /// Neighbouring cell one step away in the provided direction.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let delta = direction.delta();
        Self {
            x: self.x.saturating_add(delta.x),
            y: self.y.saturating_add(delta.y),
            z: self.z.saturating_add(delta.z),
        }
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Extent of the play-area lattice measured in cells per axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    x: u32,
    y: u32,
    z: u32,
}

impl GridSize {
    /// Creates a new grid size.
    #[must_use]
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// Number of columns.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Number of layers.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Number of rows.
    #[must_use]
    pub const fn z(&self) -> u32 {
        self.z
    }

    /// Reports whether any axis has zero length.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.x == 0 || self.y == 0 || self.z == 0
    }

    /// Reports whether the cell lies within `[0, size)` on every axis.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        axis_contains(cell.x(), self.x)
            && axis_contains(cell.y(), self.y)
            && axis_contains(cell.z(), self.z)
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self::new(10, 1, 10)
    }
}

fn axis_contains(value: i32, length: u32) -> bool {
    u32::try_from(value).map_or(false, |value| value < length)
}

/// Handle identifying a pooled cube instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CubeId(u32);

impl CubeId {
    /// Creates a new cube identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Kinds of cubes the pool can hand out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CubeKind {
    /// Plain sliding cube.
    Basic,
}

/// Visual appearance applied to a cube. Cosmetic only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CubeColor {
    red: u8,
    green: u8,
    blue: u8,
    alpha: u8,
}

impl CubeColor {
    /// Opaque white, the fallback for unrecognised colors.
    pub const WHITE: Self = Self::from_rgb(0xff, 0xff, 0xff);

    /// Creates an opaque color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::from_rgba(red, green, blue, 0xff)
    }

    /// Creates a color from byte RGBA components.
    #[must_use]
    pub const fn from_rgba(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }

    /// Alpha component of the color.
    #[must_use]
    pub const fn alpha(&self) -> u8 {
        self.alpha
    }
}

impl Default for CubeColor {
    fn default() -> Self {
        Self::WHITE
    }
}

/// A single cube placement within a level definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnEntry {
    /// Starting cell of the cube.
    pub cell: CellCoord,
    /// Direction the cube slides in when tapped.
    pub direction: Direction,
    /// Appearance of the cube.
    pub color: CubeColor,
}

/// Parsed contents of a level, ready to be applied to the world.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelDefinition {
    /// Level number shown to the player.
    pub level: u32,
    /// Move budget for the level.
    pub moves: u32,
    /// Extent of the play-area grid.
    pub grid_size: GridSize,
    /// Cells marked as impassable terrain.
    pub blocked: Vec<CellCoord>,
    /// Cubes to spawn, in authoring order.
    pub cubes: Vec<SpawnEntry>,
}

/// Immutable representation of a single live cube used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CubeSnapshot {
    /// Identifier of the cube.
    pub id: CubeId,
    /// Cell currently occupied by the cube.
    pub cell: CellCoord,
    /// Direction the cube slides in.
    pub direction: Direction,
    /// Appearance of the cube.
    pub color: CubeColor,
    /// Whether the cube is mid-slide.
    pub moving: bool,
}

/// Read-only snapshot describing all live cubes.
#[derive(Clone, Debug, Default)]
pub struct CubeView {
    snapshots: Vec<CubeSnapshot>,
}

impl CubeView {
    /// Creates a new cube view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<CubeSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &CubeSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot for the provided cube.
    #[must_use]
    pub fn get(&self, id: CubeId) -> Option<&CubeSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Number of cubes captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no cubes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<CubeSnapshot> {
        self.snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CellCoord, CubeColor, CubeId, CubeSnapshot, CubeView, Direction, GridSize, MoveResult,
    };
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn direction_deltas_are_unit_and_distinct() {
        let deltas: Vec<CellCoord> = Direction::ALL.iter().map(|d| d.delta()).collect();
        for (index, delta) in deltas.iter().enumerate() {
            let length = delta.x().abs() + delta.y().abs() + delta.z().abs();
            assert_eq!(length, 1, "{:?} is not a unit step", Direction::ALL[index]);
            assert_eq!(delta.y(), 0);
            for other in deltas.iter().skip(index + 1) {
                assert_ne!(delta, other);
            }
        }
    }

    #[test]
    fn opposite_direction_undoes_step() {
        let origin = CellCoord::on_plane(3, 3);
        for direction in Direction::ALL {
            assert_eq!(origin.step(direction).step(direction.opposite()), origin);
        }
    }

    #[test]
    fn right_increases_x_and_up_decreases_z() {
        let origin = CellCoord::on_plane(2, 2);
        assert_eq!(origin.step(Direction::Right), CellCoord::on_plane(3, 2));
        assert_eq!(origin.step(Direction::Up), CellCoord::on_plane(2, 1));
    }

    #[test]
    fn grid_size_contains_only_half_open_range() {
        let size = GridSize::new(5, 1, 5);
        assert!(size.contains(CellCoord::new(0, 0, 0)));
        assert!(size.contains(CellCoord::new(4, 0, 4)));
        assert!(!size.contains(CellCoord::new(5, 0, 0)));
        assert!(!size.contains(CellCoord::new(-1, 0, 0)));
        assert!(!size.contains(CellCoord::new(0, 1, 0)));
    }

    #[test]
    fn grid_size_with_zero_axis_is_empty() {
        assert!(GridSize::new(4, 0, 4).is_empty());
        assert!(!GridSize::default().is_empty());
    }

    #[test]
    fn cube_view_lookup_is_sorted() {
        let snapshot = |id: u32| CubeSnapshot {
            id: CubeId::new(id),
            cell: CellCoord::on_plane(id as i32, 0),
            direction: Direction::Left,
            color: CubeColor::WHITE,
            moving: false,
        };
        let view = CubeView::from_snapshots(vec![snapshot(7), snapshot(2), snapshot(4)]);
        let order: Vec<u32> = view.iter().map(|s| s.id.get()).collect();
        assert_eq!(order, vec![2, 4, 7]);
        assert_eq!(view.get(CubeId::new(4)).map(|s| s.cell.x()), Some(4));
        assert!(view.get(CubeId::new(3)).is_none());
    }

    #[test]
    fn move_result_round_trips_through_bincode() {
        assert_round_trip(&MoveResult::Blocked);
    }

    #[test]
    fn cell_coord_round_trips_through_bincode() {
        assert_round_trip(&CellCoord::new(-3, 0, 12));
    }
}
