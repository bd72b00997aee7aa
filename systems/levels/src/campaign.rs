//! Ordered level progression.

use std::{fs, path::Path};

use log::info;

use crate::{load_level, LevelAsset, LevelError, Palette};

/// Outcome of advancing the campaign.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Progress<'a> {
    /// The next level to load.
    Level(&'a LevelAsset),
    /// The last level was already reached.
    AllLevelsCompleted,
}

/// Ordered list of levels with a cursor on the one being played.
#[derive(Clone, Debug)]
pub struct Campaign {
    levels: Vec<LevelAsset>,
    current: Option<usize>,
}

impl Campaign {
    /// Creates a campaign over the provided levels.
    pub fn new(levels: Vec<LevelAsset>) -> Result<Self, LevelError> {
        if levels.is_empty() {
            return Err(LevelError::EmptyCampaign);
        }
        Ok(Self {
            levels,
            current: None,
        })
    }

    /// Loads every `*.json` file in `dir`, ordered by file name.
    pub fn from_dir(dir: &Path, palette: &Palette) -> Result<Self, LevelError> {
        let entries = fs::read_dir(dir).map_err(|source| LevelError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| LevelError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        let levels = paths
            .iter()
            .map(|path| load_level(path, palette))
            .collect::<Result<Vec<_>, _>>()?;
        info!("loaded {} levels from {}", levels.len(), dir.display());
        Self::new(levels)
    }

    /// Number of levels in the campaign.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Reports whether the campaign holds no levels. Always `false` for a
    /// constructed campaign.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// One-based position of the level being played, `0` before the first
    /// start.
    #[must_use]
    pub fn current_level(&self) -> usize {
        self.current.map_or(0, |index| index + 1)
    }

    /// Whether a level follows the current one.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.current.map_or(0, |index| index + 1) < self.levels.len()
    }

    /// Jumps to the one-based level `number`, clamped to the campaign.
    pub fn start(&mut self, number: usize) -> &LevelAsset {
        let index = number.saturating_sub(1).min(self.levels.len() - 1);
        self.select(index)
    }

    /// Replays the current level, or the first one if none was started.
    pub fn restart(&mut self) -> &LevelAsset {
        let index = self.current.unwrap_or(0);
        self.select(index)
    }

    /// Advances to the following level.
    pub fn next(&mut self) -> Progress<'_> {
        if !self.has_next() {
            return Progress::AllLevelsCompleted;
        }
        let index = self.current.map_or(0, |index| index + 1);
        Progress::Level(self.select(index))
    }

    fn select(&mut self, index: usize) -> &LevelAsset {
        self.current = Some(index);
        &self.levels[index]
    }
}

#[cfg(test)]
mod tests {
    use cube_slide_core::{GridSize, LevelDefinition};

    use super::*;
    use crate::CameraHints;

    fn asset(level: u32) -> LevelAsset {
        LevelAsset {
            definition: LevelDefinition {
                level,
                moves: 3,
                grid_size: GridSize::default(),
                blocked: Vec::new(),
                cubes: Vec::new(),
            },
            camera: CameraHints::default(),
        }
    }

    fn campaign() -> Campaign {
        Campaign::new(vec![asset(1), asset(2), asset(3)]).expect("campaign")
    }

    #[test]
    fn empty_campaign_is_rejected() {
        assert!(matches!(
            Campaign::new(Vec::new()),
            Err(LevelError::EmptyCampaign)
        ));
    }

    #[test]
    fn start_clamps_to_available_levels() {
        let mut campaign = campaign();
        assert_eq!(campaign.current_level(), 0);
        assert_eq!(campaign.start(0).definition.level, 1);
        assert_eq!(campaign.start(9).definition.level, 3);
        assert_eq!(campaign.current_level(), 3);
        assert!(!campaign.has_next());
    }

    #[test]
    fn next_walks_levels_then_reports_completion() {
        let mut campaign = campaign();
        let mut seen = Vec::new();
        while let Progress::Level(level) = campaign.next() {
            seen.push(level.definition.level);
        }
        assert_eq!(seen, vec![1, 2, 3]);
        assert_eq!(campaign.next(), Progress::AllLevelsCompleted);
        assert_eq!(campaign.current_level(), 3);
    }

    #[test]
    fn restart_replays_current_level() {
        let mut campaign = campaign();
        assert_eq!(campaign.restart().definition.level, 1);
        let _ = campaign.start(2);
        assert_eq!(campaign.restart().definition.level, 2);
    }
}
