use ab_glyph::{FontVec, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::bitmap;

/// Font files tried in order when nothing else is configured
pub const DEFAULT_FONT_CANDIDATES: &[&str] = &["arial.ttf", "DejaVuSans.ttf"];

/// Directories searched for each font candidate, in order
pub const DEFAULT_FONT_DIRECTORIES: &[&str] = &[
    "static",
    "/usr/share/fonts/truetype/msttcorefonts",
    "/usr/share/fonts/truetype/dejavu",
    "/usr/share/fonts/dejavu",
    "/usr/share/fonts/TTF",
    "/Library/Fonts",
    "C:\\Windows\\Fonts",
];

/// The face used to render text watermarks
pub enum DisplayFont {
    TrueType { font: FontVec, source: PathBuf },
    Builtin,
}

impl std::fmt::Debug for DisplayFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayFont::TrueType { source, .. } => {
                f.debug_struct("TrueType").field("source", source).finish()
            }
            DisplayFont::Builtin => f.write_str("Builtin"),
        }
    }
}

impl DisplayFont {
    pub fn is_builtin(&self) -> bool {
        matches!(self, DisplayFont::Builtin)
    }

    /// Width and height of `text` rendered at `font_size`
    pub fn text_size(&self, font_size: u32, text: &str) -> (u32, u32) {
        match self {
            DisplayFont::TrueType { font, .. } => {
                text_size(PxScale::from(font_size as f32), font, text)
            }
            DisplayFont::Builtin => bitmap::text_size(font_size, text),
        }
    }

    pub fn draw_text(
        &self,
        canvas: &mut RgbaImage,
        color: Rgba<u8>,
        x: i64,
        y: i64,
        font_size: u32,
        text: &str,
    ) {
        match self {
            DisplayFont::TrueType { font, .. } => {
                let x = x.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
                let y = y.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
                draw_text_mut(
                    canvas,
                    color,
                    x,
                    y,
                    PxScale::from(font_size as f32),
                    font,
                    text,
                );
            }
            DisplayFont::Builtin => bitmap::draw_text(canvas, color, x, y, font_size, text),
        }
    }
}

/// Ordered list of font files to try; the first one that parses wins.
#[derive(Debug, Clone)]
pub struct FontLoader {
    candidates: Vec<PathBuf>,
    directories: Vec<PathBuf>,
}

impl Default for FontLoader {
    fn default() -> Self {
        Self {
            candidates: DEFAULT_FONT_CANDIDATES.iter().map(PathBuf::from).collect(),
            directories: DEFAULT_FONT_DIRECTORIES.iter().map(PathBuf::from).collect(),
        }
    }
}

impl FontLoader {
    pub fn new(candidates: Vec<PathBuf>, directories: Vec<PathBuf>) -> Self {
        Self {
            candidates,
            directories,
        }
    }

    /// Load the first usable candidate, or the built-in face. Never fails.
    pub fn load_display_font(&self) -> DisplayFont {
        for candidate in &self.candidates {
            for path in self.search_paths(candidate) {
                match load_font_file(&path) {
                    Ok(font) => {
                        info!("Using font {:?} for text watermarks", path);
                        return DisplayFont::TrueType { font, source: path };
                    }
                    Err(e) => debug!("Font {:?} not usable: {}", path, e),
                }
            }
        }

        info!("No TrueType font found, using built-in bitmap face");
        DisplayFont::Builtin
    }

    fn search_paths(&self, candidate: &Path) -> Vec<PathBuf> {
        if candidate.is_absolute() {
            return vec![candidate.to_path_buf()];
        }

        let mut paths = vec![candidate.to_path_buf()];
        paths.extend(self.directories.iter().map(|dir| dir.join(candidate)));
        paths
    }
}

fn load_font_file(path: &Path) -> Result<FontVec, Box<dyn std::error::Error>> {
    let font_data = std::fs::read(path)?;
    let font = FontVec::try_from_vec(font_data).map_err(|_| "Failed to parse font")?;
    Ok(font)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_fonts_fall_back_to_builtin() {
        let temp_dir = TempDir::new().unwrap();
        let loader = FontLoader::new(
            vec![PathBuf::from("no-such-font.ttf")],
            vec![temp_dir.path().to_path_buf()],
        );

        assert!(loader.load_display_font().is_builtin());
    }

    #[test]
    fn test_unparseable_font_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("broken.ttf"), b"not a font").unwrap();

        let loader = FontLoader::new(
            vec![PathBuf::from("broken.ttf")],
            vec![temp_dir.path().to_path_buf()],
        );

        assert!(loader.load_display_font().is_builtin());
    }

    /// DejaVuSans from the default search directories, if installed
    fn installed_dejavu() -> Option<PathBuf> {
        DEFAULT_FONT_DIRECTORIES
            .iter()
            .map(|dir| Path::new(dir).join("DejaVuSans.ttf"))
            .find(|path| path.exists())
    }

    #[test]
    fn test_first_usable_candidate_wins() {
        // Skip test if font file doesn't exist
        let Some(font_path) = installed_dejavu() else {
            return;
        };

        let temp_dir = TempDir::new().unwrap();
        let loader = FontLoader::new(
            vec![PathBuf::from("missing.ttf"), font_path.clone()],
            vec![temp_dir.path().to_path_buf()],
        );

        match loader.load_display_font() {
            DisplayFont::TrueType { source, .. } => assert_eq!(source, font_path),
            DisplayFont::Builtin => panic!("expected {:?} to load", font_path),
        }
    }

    #[test]
    fn test_builtin_measures_text() {
        let font = DisplayFont::Builtin;
        let (width, height) = font.text_size(36, "TEST");
        assert!(width > 0);
        assert!(height > 0);
    }
}
