use std::fs;
use std::path::{Path, PathBuf};

use rusttype::{point, Font, PositionedGlyph, Scale};

use crate::error::{MemeError, Result};

/// Bold display faces tried in order when no font path is configured.
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/msttcorefonts/Impact.ttf",
    "/usr/share/fonts/truetype/msttcorefonts/impact.ttf",
    "/System/Library/Fonts/Supplemental/Impact.ttf",
    "/Library/Fonts/Impact.ttf",
    "C:\\Windows\\Fonts\\impact.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Bold.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSansBold.ttf",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub width: f32,
    pub ascent: f32,
    /// Negative: distance below the baseline.
    pub descent: f32,
}

pub struct MemeFont {
    font: Font<'static>,
    source: PathBuf,
}

impl MemeFont {
    pub fn from_bytes(bytes: Vec<u8>, source: impl Into<PathBuf>) -> Result<Self> {
        let source = source.into();
        let font = Font::try_from_vec(bytes).ok_or_else(|| {
            MemeError::ConfigError(format!("{} is not a usable font", source.display()))
        })?;
        Ok(Self { font, source })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| {
            MemeError::ConfigError(format!("cannot read font {}: {}", path.display(), e))
        })?;
        Self::from_bytes(bytes, path)
    }

    /// Loads `configured` if given, otherwise the first installed system face.
    pub fn locate(configured: Option<&Path>) -> Result<Self> {
        if let Some(path) = configured {
            return Self::load(path);
        }
        SYSTEM_FONT_CANDIDATES
            .iter()
            .map(Path::new)
            .find(|path| path.is_file())
            .ok_or_else(|| {
                MemeError::ConfigError(
                    "no caption font found; set MEME_FONT_PATH to a .ttf file".into(),
                )
            })
            .and_then(Self::load)
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn measure(&self, text: &str, px: f32) -> TextMetrics {
        let scale = Scale::uniform(px);
        let v_metrics = self.font.v_metrics(scale);
        let width = self
            .font
            .layout(text, scale, point(0.0, 0.0))
            .last()
            .map(|glyph| glyph.position().x + glyph.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0);
        TextMetrics {
            width,
            ascent: v_metrics.ascent,
            descent: v_metrics.descent,
        }
    }

    /// Glyphs for one line of text starting at `(left, baseline)`, kerned.
    pub fn glyphs(&self, text: &str, px: f32, left: f32, baseline: f32) -> Vec<PositionedGlyph<'static>> {
        self.font
            .layout(text, Scale::uniform(px), point(left, baseline))
            .collect()
    }
}

impl std::fmt::Debug for MemeFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemeFont").field("source", &self.source).finish()
    }
}

/// Font for glyph tests. Without one the test is skipped locally and fails
/// when `CI` is set.
#[cfg(test)]
pub(crate) fn test_font() -> Option<MemeFont> {
    let configured = std::env::var_os("MEME_FONT_PATH");
    font_or_skip(
        MemeFont::locate(configured.as_deref().map(Path::new)),
        std::env::var_os("CI").is_some(),
    )
}

#[cfg(test)]
fn font_or_skip(located: Result<MemeFont>, required: bool) -> Option<MemeFont> {
    match located {
        Ok(font) => Some(font),
        Err(e) if required => panic!(
            "glyph tests need a font when CI is set: {}; install fonts-dejavu-core or set MEME_FONT_PATH",
            e
        ),
        Err(e) => {
            eprintln!("skipping glyph test: {}", e);
            None
        }
    }
}
