//! Top-down orthographic framing for a level's cube layout.

use cube_slide_core::CellCoord;
use glam::Vec3;
use serde::Deserialize;

/// Smallest framed extent, in cells, along either board axis.
const MIN_FRAMED_CELLS: i32 = 6;

/// Framing hints authored alongside a level.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CameraHints {
    /// Camera height above the board plane.
    pub height: f32,
    /// World-space shift of the framed center along x.
    pub offset_x: f32,
    /// World-space shift of the framed center along z.
    pub offset_z: f32,
    /// Empty border around the content, in cells.
    pub padding: f32,
}

impl Default for CameraHints {
    fn default() -> Self {
        Self {
            height: 10.0,
            offset_x: 0.5,
            offset_z: 0.5,
            padding: 1.0,
        }
    }
}

/// Placement of a camera looking straight down at the board.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraFrame {
    /// Camera position.
    pub position: Vec3,
    /// Half of the vertical extent the camera shows.
    pub orthographic_size: f32,
}

/// Frames the bounding box of `cells`, enlarged to at least six cells per
/// axis and padded by the hinted number of cells. Returns `None` when there
/// is nothing to frame.
#[must_use]
pub fn frame_camera(
    cells: &[CellCoord],
    cell_size: f32,
    hints: &CameraHints,
    aspect: f32,
) -> Option<CameraFrame> {
    let first = cells.first()?;
    let (mut min_x, mut max_x, mut min_z, mut max_z) = (first.x(), first.x(), first.z(), first.z());
    for cell in &cells[1..] {
        min_x = min_x.min(cell.x());
        max_x = max_x.max(cell.x());
        min_z = min_z.min(cell.z());
        max_z = max_z.max(cell.z());
    }

    let width = (max_x - min_x + 1).max(MIN_FRAMED_CELLS) as f32 * cell_size;
    let depth = (max_z - min_z + 1).max(MIN_FRAMED_CELLS) as f32 * cell_size;
    let center_x = (min_x + max_x) as f32 * 0.5 * cell_size + hints.offset_x;
    let center_z = (min_z + max_z) as f32 * 0.5 * cell_size + hints.offset_z;

    let aspect = if aspect > 0.0 { aspect } else { 1.0 };
    let padding = hints.padding * cell_size;
    let orthographic_size = (depth / 2.0 + padding).max(width / 2.0 / aspect + padding);

    Some(CameraFrame {
        position: Vec3::new(center_x, hints.height, center_z),
        orthographic_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_to_frame() {
        assert_eq!(frame_camera(&[], 1.0, &CameraHints::default(), 1.0), None);
    }

    #[test]
    fn small_layouts_are_framed_at_minimum_size() {
        let cells = [CellCoord::on_plane(1, 1), CellCoord::on_plane(3, 2)];
        let frame = frame_camera(&cells, 1.0, &CameraHints::default(), 1.0).expect("frame");

        assert_eq!(frame.position, Vec3::new(2.5, 10.0, 2.0));
        assert!((frame.orthographic_size - 4.0).abs() < f32::EPSILON);
    }

    #[test]
    fn wide_layouts_are_limited_by_aspect() {
        let cells = [CellCoord::on_plane(0, 0), CellCoord::on_plane(19, 3)];
        let hints = CameraHints {
            offset_x: 0.0,
            offset_z: 0.0,
            padding: 0.0,
            ..CameraHints::default()
        };
        let frame = frame_camera(&cells, 2.0, &hints, 2.0).expect("frame");

        assert_eq!(frame.position, Vec3::new(19.0, 10.0, 3.0));
        assert!((frame.orthographic_size - 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn partial_hints_keep_defaults() {
        let hints: CameraHints = serde_json::from_str(r#"{ "height": 14 }"#).expect("parse");
        assert!((hints.height - 14.0).abs() < f32::EPSILON);
        assert!((hints.offset_z - 0.5).abs() < f32::EPSILON);
    }
}
