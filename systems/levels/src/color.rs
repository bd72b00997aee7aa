//! Cube color parsing and palette remapping.

use cube_slide_core::CubeColor;
use log::warn;
use serde::Deserialize;

const NAMED_COLORS: [(&str, CubeColor); 23] = [
    ("red", CubeColor::from_rgb(0xff, 0x00, 0x00)),
    ("cyan", CubeColor::from_rgb(0x00, 0xff, 0xff)),
    ("blue", CubeColor::from_rgb(0x00, 0x00, 0xff)),
    ("darkblue", CubeColor::from_rgb(0x00, 0x00, 0xa0)),
    ("lightblue", CubeColor::from_rgb(0xad, 0xd8, 0xe6)),
    ("purple", CubeColor::from_rgb(0x80, 0x00, 0x80)),
    ("yellow", CubeColor::from_rgb(0xff, 0xff, 0x00)),
    ("lime", CubeColor::from_rgb(0x00, 0xff, 0x00)),
    ("fuchsia", CubeColor::from_rgb(0xff, 0x00, 0xff)),
    ("white", CubeColor::from_rgb(0xff, 0xff, 0xff)),
    ("silver", CubeColor::from_rgb(0xc0, 0xc0, 0xc0)),
    ("grey", CubeColor::from_rgb(0x80, 0x80, 0x80)),
    ("gray", CubeColor::from_rgb(0x80, 0x80, 0x80)),
    ("black", CubeColor::from_rgb(0x00, 0x00, 0x00)),
    ("orange", CubeColor::from_rgb(0xff, 0xa5, 0x00)),
    ("brown", CubeColor::from_rgb(0xa5, 0x2a, 0x2a)),
    ("maroon", CubeColor::from_rgb(0x80, 0x00, 0x00)),
    ("green", CubeColor::from_rgb(0x00, 0x80, 0x00)),
    ("olive", CubeColor::from_rgb(0x80, 0x80, 0x00)),
    ("navy", CubeColor::from_rgb(0x00, 0x00, 0x80)),
    ("teal", CubeColor::from_rgb(0x00, 0x80, 0x80)),
    ("aqua", CubeColor::from_rgb(0x00, 0xff, 0xff)),
    ("magenta", CubeColor::from_rgb(0xff, 0x00, 0xff)),
];

/// Level designers author cubes in these four colors; the palette decides how
/// they are displayed.
const DESIGN_PRIMARY: &str = "#FF66CC";
const DESIGN_SECONDARY: &str = "#9B6BFF";
const DESIGN_ACCENT1: &str = "#FFD84D";
const DESIGN_ACCENT2: &str = "#FFA525";

/// Display colors substituted for the four design colors.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Replacement for `#FF66CC`.
    pub primary: String,
    /// Replacement for `#9B6BFF`.
    pub secondary: String,
    /// Replacement for `#FFD84D`.
    pub accent1: String,
    /// Replacement for `#FFA525`.
    pub accent2: String,
}

impl Palette {
    /// Resolves an authored color string to the color a cube is shown in.
    ///
    /// Design colors go through the palette, everything else is parsed
    /// directly. Missing or unreadable colors fall back to white.
    #[must_use]
    pub fn resolve(&self, raw: Option<&str>) -> CubeColor {
        let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
            return CubeColor::WHITE;
        };

        let authored = match self.replacement(&raw.to_ascii_uppercase()) {
            Some(replacement) => replacement,
            None => raw,
        };
        parse_color(authored).unwrap_or_else(|| {
            warn!("unrecognised color {authored:?}, using white");
            CubeColor::WHITE
        })
    }

    fn replacement(&self, upper: &str) -> Option<&str> {
        match upper {
            DESIGN_PRIMARY => Some(&self.primary),
            DESIGN_SECONDARY => Some(&self.secondary),
            DESIGN_ACCENT1 => Some(&self.accent1),
            DESIGN_ACCENT2 => Some(&self.accent2),
            _ => None,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            primary: DESIGN_PRIMARY.to_owned(),
            secondary: DESIGN_SECONDARY.to_owned(),
            accent1: DESIGN_ACCENT1.to_owned(),
            accent2: DESIGN_ACCENT2.to_owned(),
        }
    }
}

/// Parses `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA` or a named color.
#[must_use]
pub fn parse_color(raw: &str) -> Option<CubeColor> {
    let raw = raw.trim();
    if let Some(hex) = raw.strip_prefix('#') {
        return parse_hex(hex);
    }
    NAMED_COLORS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(raw))
        .map(|(_, color)| *color)
}

fn parse_hex(hex: &str) -> Option<CubeColor> {
    if !hex.is_ascii() {
        return None;
    }
    let channels: Vec<u8> = match hex.len() {
        3 | 4 => hex
            .chars()
            .map(|digit| digit.to_digit(16).map(|value| (value * 0x11) as u8))
            .collect::<Option<_>>()?,
        6 | 8 => (0..hex.len())
            .step_by(2)
            .map(|start| u8::from_str_radix(&hex[start..start + 2], 16).ok())
            .collect::<Option<_>>()?,
        _ => return None,
    };

    match channels.as_slice() {
        [r, g, b] => Some(CubeColor::from_rgb(*r, *g, *b)),
        [r, g, b, a] => Some(CubeColor::from_rgba(*r, *g, *b, *a)),
        _ => None,
    }
}
