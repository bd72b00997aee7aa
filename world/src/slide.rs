//! Stepwise greedy slide resolution.
//!
//! A slide advances its cube one cell per step until the cube either leaves
//! the play area or stops against an obstacle. Steps are evaluated against the
//! live grid, so every cell a cube passes through is individually checked.

use std::time::Duration;

use cube_slide_core::{CellCoord, CubeId, Direction};

use crate::{
    cube::{Cube, GridObject},
    grid::{GridError, SpatialGrid},
};

/// Result of evaluating a single step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The cube moved one cell and the slide continues.
    Advanced {
        /// Cell occupied before the step.
        from: CellCoord,
        /// Cell occupied after the step.
        to: CellCoord,
    },
    /// The target position lies past the exit margin; the cube left the board.
    ExitedBoard,
    /// The cube cannot enter the next cell and stays where it is.
    Blocked {
        /// Cube occupying the next cell, `None` for impassable terrain.
        obstacle: Option<CubeId>,
    },
}

impl StepOutcome {
    /// Whether the slide ends with this step.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Advanced { .. })
    }
}

/// Evaluates slide steps against the grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoveResolver {
    exit_margin: f32,
    step_duration: Duration,
}

impl MoveResolver {
    /// Creates a resolver with the provided exit margin and step interval.
    #[must_use]
    pub fn new(exit_margin: f32, step_duration: Duration) -> Self {
        Self {
            exit_margin: exit_margin.max(0.0),
            step_duration,
        }
    }

    /// Simulated time between two steps.
    #[must_use]
    pub const fn step_duration(&self) -> Duration {
        self.step_duration
    }

    /// World-space exit margin.
    #[must_use]
    pub const fn exit_margin(&self) -> f32 {
        self.exit_margin
    }

    /// Evaluates one step of `cube` sliding toward `direction`, relocating it
    /// on the grid when the step succeeds.
    ///
    /// Cells outside the grid but inside the exit margin are run-off: the
    /// cube travels through them unregistered.
    pub fn step(
        &self,
        grid: &mut SpatialGrid,
        cube: &mut Cube,
        direction: Direction,
    ) -> Result<StepOutcome, GridError> {
        let current = cube.cell();
        let next = current.step(direction);

        if grid.is_beyond_exit(grid.cell_to_world(next), self.exit_margin) {
            return Ok(StepOutcome::ExitedBoard);
        }

        if grid.is_in_bounds(next) {
            if let Some(obstacle) = grid.occupant_other_than(next, Some(cube.grid_id())) {
                return Ok(StepOutcome::Blocked {
                    obstacle: Some(obstacle),
                });
            }
            if grid.is_blocked(next) {
                return Ok(StepOutcome::Blocked { obstacle: None });
            }
        }

        grid.relocate(cube, next)?;
        Ok(StepOutcome::Advanced {
            from: current,
            to: next,
        })
    }
}

/// A slide in flight, suspended between steps.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Slide {
    pub(crate) cube: CubeId,
    pub(crate) direction: Direction,
    elapsed: Duration,
}

impl Slide {
    pub(crate) fn new(cube: CubeId, direction: Direction) -> Self {
        Self {
            cube,
            direction,
            elapsed: Duration::ZERO,
        }
    }

    /// Accumulates ticked time.
    pub(crate) fn accumulate(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
    }

    /// Consumes one step interval if enough time has accumulated.
    pub(crate) fn take_step(&mut self, interval: Duration) -> bool {
        if self.elapsed < interval {
            return false;
        }
        self.elapsed -= interval;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cube_slide_core::{CubeColor, CubeKind, GridSize, SpawnEntry};

    fn spawn(grid: &mut SpatialGrid, id: u32, x: i32, z: i32) -> Cube {
        let mut cube = Cube::pooled(CubeId::new(id), CubeKind::Basic);
        cube.initialize(&SpawnEntry {
            cell: CellCoord::on_plane(x, z),
            direction: Direction::Right,
            color: CubeColor::WHITE,
        });
        grid.register(&cube);
        cube
    }

    fn resolver(margin: f32) -> MoveResolver {
        MoveResolver::new(margin, Duration::from_millis(100))
    }

    #[test]
    fn slide_advances_through_free_cells_then_exits() {
        let mut grid = SpatialGrid::new(GridSize::new(5, 1, 5), 1.0);
        let mut cube = spawn(&mut grid, 0, 0, 2);
        let resolver = resolver(0.5);

        let mut visited = Vec::new();
        loop {
            match resolver.step(&mut grid, &mut cube, Direction::Right).expect("step") {
                StepOutcome::Advanced { to, .. } => visited.push(to),
                StepOutcome::ExitedBoard => break,
                other => panic!("unexpected outcome {other:?}"),
            }
        }

        let expected: Vec<CellCoord> = (1..=4).map(|x| CellCoord::on_plane(x, 2)).collect();
        assert_eq!(visited, expected);
        assert_eq!(grid.occupants(CellCoord::on_plane(4, 2)), &[CubeId::new(0)]);
    }

    #[test]
    fn wide_margin_traverses_run_off_cells_unregistered() {
        let mut grid = SpatialGrid::new(GridSize::new(3, 1, 3), 1.0);
        let mut cube = spawn(&mut grid, 0, 2, 1);
        let resolver = resolver(2.0);

        let first = resolver.step(&mut grid, &mut cube, Direction::Right).expect("step");
        assert_eq!(
            first,
            StepOutcome::Advanced {
                from: CellCoord::on_plane(2, 1),
                to: CellCoord::on_plane(3, 1),
            }
        );
        assert_eq!(grid.occupied_cell_count(), 0);

        let second = resolver.step(&mut grid, &mut cube, Direction::Right).expect("step");
        assert!(!second.is_terminal());
        let third = resolver.step(&mut grid, &mut cube, Direction::Right).expect("step");
        assert_eq!(third, StepOutcome::ExitedBoard);
        assert_eq!(cube.cell(), CellCoord::on_plane(4, 1));
    }

    #[test]
    fn occupied_neighbour_blocks_immediately() {
        let mut grid = SpatialGrid::new(GridSize::new(5, 1, 5), 1.0);
        let mut moving = spawn(&mut grid, 0, 2, 2);
        let _obstacle = spawn(&mut grid, 1, 3, 2);

        let outcome = resolver(0.5)
            .step(&mut grid, &mut moving, Direction::Right)
            .expect("step");

        assert_eq!(
            outcome,
            StepOutcome::Blocked {
                obstacle: Some(CubeId::new(1))
            }
        );
        assert_eq!(moving.cell(), CellCoord::on_plane(2, 2));
        assert_eq!(grid.occupants(CellCoord::on_plane(3, 2)), &[CubeId::new(1)]);
    }

    #[test]
    fn blocked_terrain_stops_without_obstacle() {
        let mut grid = SpatialGrid::new(GridSize::new(5, 1, 5), 1.0);
        let _ = grid.set_cell_type(CellCoord::on_plane(2, 1), crate::CellType::Blocked);
        let mut cube = spawn(&mut grid, 0, 2, 3);

        let resolver = resolver(0.5);
        let first = resolver.step(&mut grid, &mut cube, Direction::Up).expect("step");
        assert!(!first.is_terminal());
        let second = resolver.step(&mut grid, &mut cube, Direction::Up).expect("step");
        assert_eq!(second, StepOutcome::Blocked { obstacle: None });
        assert_eq!(cube.cell(), CellCoord::on_plane(2, 2));
    }

    #[test]
    fn slide_timer_consumes_whole_intervals() {
        let mut slide = Slide::new(CubeId::new(0), Direction::Left);
        let interval = Duration::from_millis(100);
        slide.accumulate(Duration::from_millis(250));
        assert!(slide.take_step(interval));
        assert!(slide.take_step(interval));
        assert!(!slide.take_step(interval));

        slide.accumulate(Duration::from_millis(50));
        assert!(slide.take_step(interval));
        assert!(!slide.take_step(interval));
    }
}
