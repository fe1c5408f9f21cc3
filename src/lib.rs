use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod batch;
pub mod preflight;
pub mod watermark;

use watermark::font::{DEFAULT_FONT_CANDIDATES, DEFAULT_FONT_DIRECTORIES};
use watermark::{DEFAULT_JPEG_QUALITY, FontLoader, Position, WatermarkKind};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub watermark: WatermarkConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub fonts: FontConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WatermarkConfig {
    pub kind: WatermarkKind,
    pub text: String,
    pub image: Option<PathBuf>,
    pub position: Position,
    pub opacity: u8,
    pub font_size: u32,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            kind: WatermarkKind::Text,
            text: "© Your Watermark".to_string(),
            image: None,
            position: Position::BottomRight,
            opacity: 50,
            font_size: 36,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub jpeg_quality: u8,
    /// Skip sources that are themselves `_wm` outputs of an earlier run
    pub skip_watermarked: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            skip_watermarked: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FontConfig {
    /// Font files tried in order; the first that loads is used
    pub candidates: Vec<PathBuf>,
    /// Directories searched for relative candidates
    pub directories: Vec<PathBuf>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            candidates: DEFAULT_FONT_CANDIDATES.iter().map(PathBuf::from).collect(),
            directories: DEFAULT_FONT_DIRECTORIES.iter().map(PathBuf::from).collect(),
        }
    }
}

impl FontConfig {
    pub fn loader(&self) -> FontLoader {
        FontLoader::new(self.candidates.clone(), self.directories.clone())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml_edit::de::Error),
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml_edit::de::from_str::<Config>(content)?)
    }

    /// Read a TOML config file; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}
