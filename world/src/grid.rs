//! Sparse occupancy index over the bounded play-area lattice.

use std::collections::HashMap;

use cube_slide_core::{CellCoord, CubeId, GridSize};
use glam::Vec3;
use thiserror::Error;

use crate::cube::{Cube, GridObject};

/// Terrain attribute of a cell, independent of occupancy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CellType {
    /// Cell can be entered.
    #[default]
    Normal,
    /// Cell is impassable terrain.
    Blocked,
}

/// Invariant violations detected while mutating the grid.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum GridError {
    /// The object claims an in-bounds cell it was never registered at.
    #[error("cube {cube:?} is not registered at {cell}")]
    NotRegistered {
        /// Object that was asked to move.
        cube: CubeId,
        /// Cell the object claims to occupy.
        cell: CellCoord,
    },
}

/// Authoritative record of which cube occupies which cell.
///
/// Cells are only listed while they have occupants. Lookups outside the
/// configured bounds return empty results instead of failing; mutation
/// validity is decided by [`SpatialGrid::is_occupiable`].
#[derive(Clone, Debug)]
pub struct SpatialGrid {
    size: GridSize,
    cell_size: f32,
    occupants: HashMap<CellCoord, Vec<CubeId>>,
    cell_types: HashMap<CellCoord, CellType>,
}

impl SpatialGrid {
    /// Creates an empty grid with the provided extent and world-space cell size.
    #[must_use]
    pub fn new(size: GridSize, cell_size: f32) -> Self {
        Self {
            size,
            cell_size,
            occupants: HashMap::new(),
            cell_types: HashMap::new(),
        }
    }

    /// Extent of the grid.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// World-space length of a single cell edge.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Reconfigures the extent, dropping all occupancy and terrain.
    pub fn resize(&mut self, size: GridSize) {
        self.size = size;
        self.occupants.clear();
        self.cell_types.clear();
    }

    /// Drops all occupancy while keeping extent and terrain.
    pub fn clear(&mut self) {
        self.occupants.clear();
    }

    /// True iff every axis value is within `[0, size)`.
    #[must_use]
    pub fn is_in_bounds(&self, cell: CellCoord) -> bool {
        self.size.contains(cell)
    }

    /// Terrain attribute of the cell. Unknown cells are [`CellType::Normal`].
    #[must_use]
    pub fn cell_type(&self, cell: CellCoord) -> CellType {
        self.cell_types.get(&cell).copied().unwrap_or_default()
    }

    /// Marks the terrain of an in-bounds cell. Returns `false` for cells
    /// outside the grid, which are left untouched.
    pub fn set_cell_type(&mut self, cell: CellCoord, cell_type: CellType) -> bool {
        if !self.is_in_bounds(cell) {
            return false;
        }
        match cell_type {
            CellType::Normal => {
                let _ = self.cell_types.remove(&cell);
            }
            CellType::Blocked => {
                let _ = self.cell_types.insert(cell, cell_type);
            }
        }
        true
    }

    /// Whether the cell is impassable terrain.
    #[must_use]
    pub fn is_blocked(&self, cell: CellCoord) -> bool {
        self.cell_type(cell) == CellType::Blocked
    }

    /// Whether `requester` may occupy the cell: in bounds, not blocked, and
    /// not occupied by anything other than `requester` itself.
    #[must_use]
    pub fn is_occupiable(&self, cell: CellCoord, requester: Option<CubeId>) -> bool {
        self.is_in_bounds(cell)
            && !self.is_blocked(cell)
            && self.occupant_other_than(cell, requester).is_none()
    }

    /// Cubes registered at the cell, empty for unknown cells.
    #[must_use]
    pub fn occupants(&self, cell: CellCoord) -> &[CubeId] {
        self.occupants.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First occupant of the cell that is not `requester`.
    #[must_use]
    pub fn occupant_other_than(
        &self,
        cell: CellCoord,
        requester: Option<CubeId>,
    ) -> Option<CubeId> {
        self.occupants(cell)
            .iter()
            .copied()
            .find(|occupant| Some(*occupant) != requester)
    }

    /// Number of cells with at least one occupant.
    #[must_use]
    pub fn occupied_cell_count(&self) -> usize {
        self.occupants.len()
    }

    /// Adds the object to the occupant list of its current cell. Idempotent;
    /// ignores objects outside the grid.
    pub fn register<O: GridObject>(&mut self, object: &O) {
        let cell = object.cell();
        if !self.is_in_bounds(cell) {
            return;
        }
        let id = object.grid_id();
        let entry = self.occupants.entry(cell).or_default();
        if !entry.contains(&id) {
            entry.push(id);
        }
    }

    /// Removes the object from its current cell. No-op when absent.
    pub fn unregister<O: GridObject>(&mut self, object: &O) {
        let _ = self.remove_at(object.cell(), object.grid_id());
    }

    /// Moves the cube to `destination`: unregister at the old cell, update the
    /// cube's stored cell, register at the new one.
    ///
    /// Cubes travelling through run-off cells outside the grid are never
    /// registered, so relocating from such a cell is legal. A cube that claims
    /// an in-bounds cell it is not listed at is rejected without mutation.
    pub fn relocate(&mut self, cube: &mut Cube, destination: CellCoord) -> Result<(), GridError> {
        let origin = cube.cell();
        let id = cube.grid_id();
        if self.is_in_bounds(origin) && !self.remove_at(origin, id) {
            return Err(GridError::NotRegistered {
                cube: id,
                cell: origin,
            });
        }
        cube.set_cell(destination);
        self.register(&*cube);
        Ok(())
    }

    /// World-space position of the cell.
    #[must_use]
    pub fn cell_to_world(&self, cell: CellCoord) -> Vec3 {
        Vec3::new(cell.x() as f32, cell.y() as f32, cell.z() as f32) * self.cell_size
    }

    /// Cell containing the world-space point, rounding to the nearest lattice
    /// position.
    #[must_use]
    pub fn world_to_cell(&self, point: Vec3) -> CellCoord {
        let scaled = (point / self.cell_size).round();
        CellCoord::new(scaled.x as i32, scaled.y as i32, scaled.z as i32)
    }

    /// Whether the point lies past the play area extended by `margin` on the
    /// board plane. The play area spans the world positions of the first and
    /// last cells on each axis.
    #[must_use]
    pub fn is_beyond_exit(&self, point: Vec3, margin: f32) -> bool {
        let margin = margin.max(0.0);
        let max_x = self.last_cell_position(self.size.x()) + margin;
        let max_z = self.last_cell_position(self.size.z()) + margin;
        point.x < -margin || point.x > max_x || point.z < -margin || point.z > max_z
    }

    fn last_cell_position(&self, length: u32) -> f32 {
        length.saturating_sub(1) as f32 * self.cell_size
    }

    fn remove_at(&mut self, cell: CellCoord, id: CubeId) -> bool {
        let Some(entry) = self.occupants.get_mut(&cell) else {
            return false;
        };
        let Some(position) = entry.iter().position(|occupant| *occupant == id) else {
            return false;
        };
        let _ = entry.remove(position);
        if entry.is_empty() {
            let _ = self.occupants.remove(&cell);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cube_slide_core::{CubeColor, CubeKind, Direction, SpawnEntry};

    fn cube_at(id: u32, x: i32, z: i32) -> Cube {
        let mut cube = Cube::pooled(CubeId::new(id), CubeKind::Basic);
        cube.initialize(&SpawnEntry {
            cell: CellCoord::on_plane(x, z),
            direction: Direction::Right,
            color: CubeColor::WHITE,
        });
        cube
    }

    fn grid() -> SpatialGrid {
        SpatialGrid::new(GridSize::new(5, 1, 5), 1.0)
    }

    #[test]
    fn registered_cell_is_occupiable_only_by_its_owner() {
        let mut grid = grid();
        let owner = cube_at(0, 2, 2);
        grid.register(&owner);

        let cell = CellCoord::on_plane(2, 2);
        assert!(!grid.is_occupiable(cell, Some(CubeId::new(1))));
        assert!(!grid.is_occupiable(cell, None));
        assert!(grid.is_occupiable(cell, Some(CubeId::new(0))));
    }

    #[test]
    fn register_is_idempotent() {
        let mut grid = grid();
        let cube = cube_at(0, 1, 1);
        grid.register(&cube);
        grid.register(&cube);
        assert_eq!(grid.occupants(CellCoord::on_plane(1, 1)), &[CubeId::new(0)]);
    }

    #[test]
    fn register_ignores_out_of_bounds_cells() {
        let mut grid = grid();
        grid.register(&cube_at(0, 5, 0));
        grid.register(&cube_at(1, -1, 0));
        assert_eq!(grid.occupied_cell_count(), 0);
    }

    #[test]
    fn unregister_removes_empty_entries() {
        let mut grid = grid();
        let cube = cube_at(0, 1, 1);
        grid.register(&cube);
        grid.unregister(&cube);
        grid.unregister(&cube);
        assert!(grid.occupants(CellCoord::on_plane(1, 1)).is_empty());
        assert_eq!(grid.occupied_cell_count(), 0);
    }

    #[test]
    fn relocate_moves_occupancy_atomically() {
        let mut grid = grid();
        let mut cube = cube_at(0, 1, 1);
        grid.register(&cube);

        let destination = CellCoord::on_plane(2, 1);
        grid.relocate(&mut cube, destination).expect("relocate");

        assert!(grid.occupants(CellCoord::on_plane(1, 1)).is_empty());
        assert_eq!(grid.occupants(destination), &[CubeId::new(0)]);
        assert_eq!(cube.cell(), destination);
    }

    #[test]
    fn relocate_unregistered_cube_is_rejected_without_mutation() {
        let mut grid = grid();
        let mut cube = cube_at(4, 1, 1);

        let error = grid
            .relocate(&mut cube, CellCoord::on_plane(2, 1))
            .expect_err("cube was never registered");

        assert_eq!(
            error,
            GridError::NotRegistered {
                cube: CubeId::new(4),
                cell: CellCoord::on_plane(1, 1),
            }
        );
        assert_eq!(cube.cell(), CellCoord::on_plane(1, 1));
        assert_eq!(grid.occupied_cell_count(), 0);
    }

    #[test]
    fn relocate_from_run_off_cell_is_allowed() {
        let mut grid = grid();
        let mut cube = cube_at(0, 5, 2);
        grid.relocate(&mut cube, CellCoord::on_plane(6, 2)).expect("run-off");
        assert_eq!(cube.cell(), CellCoord::on_plane(6, 2));
        assert_eq!(grid.occupied_cell_count(), 0);
    }

    #[test]
    fn blocked_terrain_is_not_occupiable() {
        let mut grid = grid();
        let cell = CellCoord::on_plane(3, 3);
        assert!(grid.set_cell_type(cell, CellType::Blocked));
        assert!(!grid.is_occupiable(cell, None));
        assert!(!grid.set_cell_type(CellCoord::on_plane(9, 9), CellType::Blocked));

        assert!(grid.set_cell_type(cell, CellType::Normal));
        assert!(grid.is_occupiable(cell, None));
    }

    #[test]
    fn out_of_bounds_queries_are_empty() {
        let grid = grid();
        let outside = CellCoord::new(-4, 0, 40);
        assert!(grid.occupants(outside).is_empty());
        assert!(!grid.is_occupiable(outside, None));
        assert_eq!(grid.cell_type(outside), CellType::Normal);
    }

    #[test]
    fn world_conversions_use_cell_size() {
        let grid = SpatialGrid::new(GridSize::new(5, 1, 5), 2.0);
        let cell = CellCoord::on_plane(3, 1);
        let point = grid.cell_to_world(cell);
        assert_eq!(point, Vec3::new(6.0, 0.0, 2.0));
        assert_eq!(grid.world_to_cell(point), cell);
        assert_eq!(grid.world_to_cell(Vec3::new(6.7, 0.0, 1.2)), cell);
    }

    #[test]
    fn exit_test_extends_play_area_by_margin() {
        let grid = grid();
        assert!(!grid.is_beyond_exit(Vec3::new(4.0, 0.0, 2.0), 0.5));
        assert!(grid.is_beyond_exit(Vec3::new(5.0, 0.0, 2.0), 0.5));
        assert!(!grid.is_beyond_exit(Vec3::new(5.0, 0.0, 2.0), 1.0));
        assert!(grid.is_beyond_exit(Vec3::new(2.0, 0.0, -1.0), 0.5));
    }

    #[test]
    fn resize_drops_occupancy_and_terrain() {
        let mut grid = grid();
        grid.register(&cube_at(0, 1, 1));
        let _ = grid.set_cell_type(CellCoord::on_plane(0, 0), CellType::Blocked);
        grid.resize(GridSize::new(3, 1, 3));
        assert_eq!(grid.occupied_cell_count(), 0);
        assert!(!grid.is_blocked(CellCoord::on_plane(0, 0)));
        assert!(!grid.is_in_bounds(CellCoord::on_plane(3, 0)));
    }
}
