use std::{fs, path::Path};

use anyhow::{Context, Result};
use cube_slide_system_levels::Palette;
use cube_slide_world::SessionConfig;
use serde::Deserialize;

/// Settings read from the optional `--config` file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct CliConfig {
    pub(crate) session: SessionConfig,
    pub(crate) palette: Palette,
}

impl CliConfig {
    /// Loads the file at `path`, or the defaults when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        parse_config(&contents)
            .with_context(|| format!("invalid config at {}", path.display()))
    }
}

fn parse_config(contents: &str) -> Result<CliConfig> {
    let config: CliConfig =
        toml::from_str(contents).context("failed to parse config toml contents")?;
    config.session.validate().context("invalid session settings")?;
    Ok(config)
}
