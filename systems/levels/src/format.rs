//! On-disk JSON layout of a level file.

use cube_slide_core::Direction;
use log::warn;
use serde::Deserialize;

use crate::camera::CameraHints;

const DEFAULT_GRID_SIZE: [u32; 3] = [10, 1, 10];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LevelFile {
    pub(crate) level: u32,
    pub(crate) moves: u32,
    #[serde(default = "default_grid_size")]
    pub(crate) grid_size: [u32; 3],
    #[serde(default)]
    pub(crate) camera: Option<CameraHints>,
    #[serde(default)]
    pub(crate) blocked: Vec<CellRecord>,
    #[serde(default)]
    pub(crate) cubes: Vec<CubeRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CellRecord {
    pub(crate) x: i32,
    pub(crate) z: i32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CubeRecord {
    pub(crate) x: i32,
    pub(crate) z: i32,
    #[serde(default)]
    pub(crate) direction: Option<String>,
    #[serde(default)]
    pub(crate) color: Option<String>,
}

fn default_grid_size() -> [u32; 3] {
    DEFAULT_GRID_SIZE
}

/// Case-insensitive direction name; anything unrecognised slides right.
pub(crate) fn parse_direction(raw: Option<&str>) -> Direction {
    let Some(raw) = raw else {
        return Direction::Right;
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "up" => Direction::Up,
        "down" => Direction::Down,
        "left" => Direction::Left,
        "right" => Direction::Right,
        other => {
            warn!("unknown direction {other:?}, defaulting to right");
            Direction::Right
        }
    }
}
