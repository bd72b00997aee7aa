//! Cube entity and the capability traits systems interact with.

use cube_slide_core::{CellCoord, CubeColor, CubeId, CubeKind, CubeSnapshot, Direction, SpawnEntry};

use crate::pool::Poolable;

/// Anything that occupies a cell of the [`crate::SpatialGrid`].
pub trait GridObject {
    /// Identifier under which the object is indexed.
    fn grid_id(&self) -> CubeId;

    /// Cell the object currently occupies.
    fn cell(&self) -> CellCoord;
}

/// Anything that can slide across the grid.
pub trait Movable {
    /// Direction the object slides in.
    fn direction(&self) -> Direction;

    /// Whether a slide is in flight for the object.
    fn is_moving(&self) -> bool;
}

/// Anything that reacts to a tap.
pub trait Clickable {
    /// Whether a tap on the object should turn into a move request.
    fn is_clickable(&self) -> bool;
}

/// A movable unit on the board. Instances live inside the pool and are
/// reinitialized every time they are handed out.
#[derive(Clone, Debug)]
pub struct Cube {
    id: CubeId,
    kind: CubeKind,
    cell: CellCoord,
    direction: Direction,
    color: CubeColor,
    moving: bool,
    active: bool,
}

impl Cube {
    /// Constructs an inactive cube. Used as the pool factory.
    #[must_use]
    pub fn pooled(id: CubeId, kind: CubeKind) -> Self {
        Self {
            id,
            kind,
            cell: CellCoord::on_plane(0, 0),
            direction: Direction::Right,
            color: CubeColor::WHITE,
            moving: false,
            active: false,
        }
    }

    /// Appearance of the cube.
    #[must_use]
    pub const fn color(&self) -> CubeColor {
        self.color
    }

    /// Whether the cube is currently handed out by the pool.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Captures an immutable snapshot of the cube.
    #[must_use]
    pub fn snapshot(&self) -> CubeSnapshot {
        CubeSnapshot {
            id: self.id,
            cell: self.cell,
            direction: self.direction,
            color: self.color,
            moving: self.moving,
        }
    }

    pub(crate) fn initialize(&mut self, entry: &SpawnEntry) {
        self.cell = entry.cell;
        self.direction = entry.direction;
        self.color = entry.color;
        self.moving = false;
    }

    pub(crate) fn set_cell(&mut self, cell: CellCoord) {
        self.cell = cell;
    }

    pub(crate) fn set_moving(&mut self, moving: bool) {
        self.moving = moving;
    }
}

impl GridObject for Cube {
    fn grid_id(&self) -> CubeId {
        self.id
    }

    fn cell(&self) -> CellCoord {
        self.cell
    }
}

impl Movable for Cube {
    fn direction(&self) -> Direction {
        self.direction
    }

    fn is_moving(&self) -> bool {
        self.moving
    }
}

impl Clickable for Cube {
    fn is_clickable(&self) -> bool {
        self.active && !self.moving
    }
}

impl Poolable for Cube {
    type Kind = CubeKind;

    fn kind(&self) -> CubeKind {
        self.kind
    }

    fn activate(&mut self) {
        self.active = true;
    }

    fn deactivate(&mut self) {
        self.active = false;
        self.moving = false;
    }
}
