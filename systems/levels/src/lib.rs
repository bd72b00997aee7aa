#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level content for Cube Slide: JSON level files, color handling, camera
//! framing hints and campaign progression.
//!
//! Parsing produces [`LevelAsset`] values whose definitions are handed to the
//! world through `Command::LoadLevel`.

mod camera;
mod campaign;
mod color;
mod format;

pub use camera::{frame_camera, CameraFrame, CameraHints};
pub use campaign::{Campaign, Progress};
pub use color::{parse_color, Palette};

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use cube_slide_core::{CellCoord, GridSize, LevelDefinition, SpawnEntry};
use log::debug;
use thiserror::Error;

use format::{parse_direction, LevelFile};

/// Failures raised while reading level content.
#[derive(Debug, Error)]
pub enum LevelError {
    /// The level file or directory could not be read.
    #[error("failed to read {path}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The level text is not a valid level document.
    #[error("malformed level document")]
    Parse(#[from] serde_json::Error),
    /// A campaign needs at least one level.
    #[error("no levels found")]
    EmptyCampaign,
}

/// A parsed level together with its presentation hints.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelAsset {
    /// Gameplay contents handed to the world.
    pub definition: LevelDefinition,
    /// Camera framing hints authored with the level.
    pub camera: CameraHints,
}

impl LevelAsset {
    /// Frames the level's cube layout for a camera with the given aspect ratio.
    #[must_use]
    pub fn frame(&self, cell_size: f32, aspect: f32) -> Option<CameraFrame> {
        let cells: Vec<CellCoord> = self
            .definition
            .cubes
            .iter()
            .map(|entry| entry.cell)
            .collect();
        frame_camera(&cells, cell_size, &self.camera, aspect)
    }
}

/// Parses a level document, resolving colors through `palette`.
pub fn parse_level(json: &str, palette: &Palette) -> Result<LevelAsset, LevelError> {
    let file: LevelFile = serde_json::from_str(json)?;
    let [x, y, z] = file.grid_size;

    let cubes = file
        .cubes
        .iter()
        .map(|record| SpawnEntry {
            cell: CellCoord::on_plane(record.x, record.z),
            direction: parse_direction(record.direction.as_deref()),
            color: palette.resolve(record.color.as_deref()),
        })
        .collect();
    let blocked = file
        .blocked
        .iter()
        .map(|record| CellCoord::on_plane(record.x, record.z))
        .collect();

    let definition = LevelDefinition {
        level: file.level,
        moves: file.moves,
        grid_size: GridSize::new(x, y, z),
        blocked,
        cubes,
    };
    debug!(
        "parsed level {} with {} cubes and {} moves",
        definition.level,
        definition.cubes.len(),
        definition.moves
    );

    Ok(LevelAsset {
        definition,
        camera: file.camera.unwrap_or_default(),
    })
}

/// Reads and parses the level file at `path`.
pub fn load_level(path: &Path, palette: &Palette) -> Result<LevelAsset, LevelError> {
    let json = fs::read_to_string(path).map_err(|source| LevelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_level(&json, palette)
}

#[cfg(test)]
mod tests {
    use cube_slide_core::{CubeColor, Direction};

    use super::*;

    const LEVEL: &str = r##"{
        "level": 3,
        "moves": 5,
        "gridSize": [6, 1, 4],
        "camera": { "height": 12, "offsetX": 0, "offsetZ": 0, "padding": 2 },
        "blocked": [ { "x": 5, "z": 0 } ],
        "cubes": [
            { "x": 0, "z": 2, "direction": "up", "color": "#FF66CC" },
            { "x": 4, "z": 1, "direction": "bogus", "color": "teal" },
            { "x": 2, "z": 3 }
        ]
    }"##;

    #[test]
    fn parses_complete_document() {
        let asset = parse_level(LEVEL, &Palette::default()).expect("parse");
        let definition = &asset.definition;

        assert_eq!(definition.level, 3);
        assert_eq!(definition.moves, 5);
        assert_eq!(definition.grid_size, GridSize::new(6, 1, 4));
        assert_eq!(definition.blocked, vec![CellCoord::on_plane(5, 0)]);
        assert_eq!(
            definition.cubes,
            vec![
                SpawnEntry {
                    cell: CellCoord::on_plane(0, 2),
                    direction: Direction::Up,
                    color: CubeColor::from_rgb(0xff, 0x66, 0xcc),
                },
                SpawnEntry {
                    cell: CellCoord::on_plane(4, 1),
                    direction: Direction::Right,
                    color: CubeColor::from_rgb(0x00, 0x80, 0x80),
                },
                SpawnEntry {
                    cell: CellCoord::on_plane(2, 3),
                    direction: Direction::Right,
                    color: CubeColor::WHITE,
                },
            ]
        );
        assert!((asset.camera.height - 12.0).abs() < f32::EPSILON);
        assert!((asset.camera.padding - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn palette_applies_while_parsing() {
        let palette = Palette {
            primary: "#000000".to_owned(),
            ..Palette::default()
        };
        let asset = parse_level(LEVEL, &palette).expect("parse");
        assert_eq!(
            asset.definition.cubes[0].color,
            CubeColor::from_rgb(0, 0, 0)
        );
    }

    #[test]
    fn malformed_documents_are_reported() {
        let error = parse_level("{ \"level\": 1 ", &Palette::default()).expect_err("truncated");
        assert!(matches!(error, LevelError::Parse(_)));

        let short_grid = r#"{ "level": 1, "moves": 2, "gridSize": [4, 4] }"#;
        let error = parse_level(short_grid, &Palette::default()).expect_err("short grid");
        assert!(matches!(error, LevelError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_its_path() {
        let path = Path::new("does/not/exist.json");
        let error = load_level(path, &Palette::default()).expect_err("missing");
        assert!(matches!(error, LevelError::Io { path: ref failed, .. } if failed == path));
    }

    #[test]
    fn framing_uses_authored_hints() {
        let asset = parse_level(LEVEL, &Palette::default()).expect("parse");
        let frame = asset.frame(1.0, 1.0).expect("frame");
        assert!((frame.position.y - 12.0).abs() < f32::EPSILON);
        assert!((frame.orthographic_size - 5.0).abs() < f32::EPSILON);
    }
}
