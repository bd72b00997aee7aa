//! Tunables for a play session.

use std::time::Duration;

use log::warn;
use serde::Deserialize;
use thiserror::Error;

use crate::pool::OverflowPolicy;

/// Widest exit margin accepted, measured in cells.
pub const MAX_EXIT_MARGIN_CELLS: f32 = 1024.0;

/// Reasons a session configuration cannot drive a level.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Cells must have a finite, positive edge.
    #[error("cell size must be finite and positive, got {0}")]
    CellSize(f32),
    /// The exit margin must be a finite, non-negative distance.
    #[error("exit margin must be finite and non-negative, got {0}")]
    ExitMargin(f32),
    /// The exit margin reaches so far that slides would never leave the board.
    #[error(
        "exit margin {margin} spans more than {max} cells of size {cell_size}",
        max = MAX_EXIT_MARGIN_CELLS
    )]
    ExitMarginTooWide {
        /// Configured margin.
        margin: f32,
        /// Configured cell size.
        cell_size: f32,
    },
    /// Move speed must be finite.
    #[error("move speed must be finite, got {0}")]
    MoveSpeed(f32),
    /// Step duration must be finite and non-negative.
    #[error("animation step duration must be finite and non-negative, got {0}")]
    StepDuration(f32),
}

/// Session configuration. Every field has a default so partial TOML tables
/// deserialize cleanly.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// World-space length of a cell edge.
    pub cell_size: f32,
    /// World-space distance past the last cell at which a sliding cube is
    /// considered off the board.
    pub exit_margin: f32,
    /// Divides the animation step duration; higher is faster.
    pub move_speed: f32,
    /// Seconds a single one-cell step takes at unit speed.
    pub animation_step_duration: f32,
    /// Whether several slides may be in flight at once.
    pub allow_simultaneous_moves: bool,
    /// Number of cubes preallocated by the pool.
    pub pool_initial_size: usize,
    /// What the pool does when it runs dry.
    pub pool_overflow: OverflowPolicy,
}

impl SessionConfig {
    /// Checks that every numeric field describes a level that can settle.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(ConfigError::CellSize(self.cell_size));
        }
        if !self.exit_margin.is_finite() || self.exit_margin < 0.0 {
            return Err(ConfigError::ExitMargin(self.exit_margin));
        }
        if self.exit_margin / self.cell_size > MAX_EXIT_MARGIN_CELLS {
            return Err(ConfigError::ExitMarginTooWide {
                margin: self.exit_margin,
                cell_size: self.cell_size,
            });
        }
        if !self.move_speed.is_finite() {
            return Err(ConfigError::MoveSpeed(self.move_speed));
        }
        if !self.animation_step_duration.is_finite() || self.animation_step_duration < 0.0 {
            return Err(ConfigError::StepDuration(self.animation_step_duration));
        }
        Ok(())
    }

    /// Replaces every invalid field, logging each repair.
    ///
    /// Out-of-range fields fall back to their defaults; an overly wide exit
    /// margin is clamped to [`MAX_EXIT_MARGIN_CELLS`] cells.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        while let Err(err) = self.validate() {
            warn!("{err}; repairing session config");
            match err {
                ConfigError::CellSize(_) => self.cell_size = defaults.cell_size,
                ConfigError::ExitMargin(_) => self.exit_margin = defaults.exit_margin,
                ConfigError::ExitMarginTooWide { cell_size, .. } => {
                    self.exit_margin = cell_size * MAX_EXIT_MARGIN_CELLS;
                }
                ConfigError::MoveSpeed(_) => self.move_speed = defaults.move_speed,
                ConfigError::StepDuration(_) => {
                    self.animation_step_duration = defaults.animation_step_duration;
                }
            }
        }
        self
    }

    /// Simulated time between two steps of a slide.
    #[must_use]
    pub fn step_duration(&self) -> Duration {
        let seconds = if self.move_speed > 0.0 {
            self.animation_step_duration / self.move_speed
        } else {
            self.animation_step_duration
        };
        Duration::try_from_secs_f32(seconds).unwrap_or(Duration::ZERO)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cell_size: 1.0,
            exit_margin: 15.0,
            move_speed: 3.0,
            animation_step_duration: 0.2,
            allow_simultaneous_moves: false,
            pool_initial_size: 10,
            pool_overflow: OverflowPolicy::Grow,
        }
    }
}
