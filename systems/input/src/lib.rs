#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure input system turning player taps into move requests.

use cube_slide_core::{Command, GameState};
use cube_slide_world::{query, Clickable, GridObject, Movable, World};
use glam::Vec3;
use log::debug;

/// A single tap distilled from adapter input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TapInput {
    /// World-space point the tap landed on.
    pub point: Vec3,
    /// Whether the tap hit a UI element layered over the board.
    pub over_ui: bool,
}

impl TapInput {
    /// Creates a tap on the board at the provided world-space point.
    #[must_use]
    pub const fn at(point: Vec3) -> Self {
        Self {
            point,
            over_ui: false,
        }
    }

    /// Creates a tap from a pick ray, landing where the ray meets the board
    /// plane. Returns `None` when the ray never reaches the plane.
    #[must_use]
    pub fn from_ray(origin: Vec3, direction: Vec3) -> Option<Self> {
        board_intersection(origin, direction).map(Self::at)
    }
}

/// Point where a ray crosses the `y == 0` board plane.
#[must_use]
pub fn board_intersection(origin: Vec3, direction: Vec3) -> Option<Vec3> {
    if direction.y.abs() <= f32::EPSILON {
        return None;
    }
    let distance = -origin.y / direction.y;
    if distance < 0.0 {
        return None;
    }
    Some(origin + direction * distance)
}

/// Resolves taps against the board.
#[derive(Debug, Default)]
pub struct Input {
    ignored: u64,
}

impl Input {
    /// Creates a new input system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of taps that did not produce a command.
    #[must_use]
    pub const fn ignored_taps(&self) -> u64 {
        self.ignored
    }

    /// Maps the tap to the clickable cube underneath it and requests a slide
    /// in that cube's own direction.
    pub fn handle(&mut self, tap: TapInput, world: &World, out: &mut Vec<Command>) {
        if tap.over_ui || query::game_state(world) != GameState::Playing {
            self.ignore(tap, "board not accepting taps");
            return;
        }

        let cell = query::grid(world).world_to_cell(tap.point);
        let Some(cube) = query::cube_at(world, cell) else {
            self.ignore(tap, "no cube under tap");
            return;
        };
        if !cube.is_clickable() {
            self.ignore(tap, "cube is not clickable");
            return;
        }

        out.push(Command::RequestMove {
            cube: cube.grid_id(),
            direction: cube.direction(),
        });
    }

    fn ignore(&mut self, tap: TapInput, reason: &str) {
        self.ignored = self.ignored.saturating_add(1);
        debug!("ignoring tap at {}: {reason}", tap.point);
    }
}
