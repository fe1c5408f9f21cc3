use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::path::PathBuf;
use std::str::FromStr;

use super::WatermarkError;

pub const MIN_OPACITY: u8 = 10;
pub const MAX_OPACITY: u8 = 100;
pub const MIN_FONT_SIZE: u32 = 12;
pub const MAX_FONT_SIZE: u32 = 100;

/// Anchor of the watermark inside the image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum Position {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
    Center,
}

impl Position {
    pub fn as_str(&self) -> &'static str {
        match self {
            Position::TopLeft => "top_left",
            Position::TopRight => "top_right",
            Position::BottomLeft => "bottom_left",
            Position::BottomRight => "bottom_right",
            Position::Center => "center",
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Position {
    /// Unknown names resolve to `BottomRight`
    fn from(name: &str) -> Self {
        match name.trim().to_lowercase().replace('-', "_").as_str() {
            "top_left" => Position::TopLeft,
            "top_right" => Position::TopRight,
            "bottom_left" => Position::BottomLeft,
            "center" | "centre" => Position::Center,
            _ => Position::BottomRight,
        }
    }
}

impl From<String> for Position {
    fn from(name: String) -> Self {
        Position::from(name.as_str())
    }
}

impl FromStr for Position {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Position::from(s))
    }
}

/// Watermark opacity in percent, always within 10..=100
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opacity(u8);

impl Opacity {
    pub fn new(percent: u8) -> Result<Self, WatermarkError> {
        if (MIN_OPACITY..=MAX_OPACITY).contains(&percent) {
            Ok(Self(percent))
        } else {
            Err(WatermarkError::InvalidOpacity(percent))
        }
    }

    pub fn percent(&self) -> u8 {
        self.0
    }

    /// Uniform alpha value applied to the overlay, truncated like `255 * percent / 100`
    pub fn alpha(&self) -> u8 {
        (255u32 * self.0 as u32 / 100) as u8
    }
}

impl Default for Opacity {
    fn default() -> Self {
        Self(50)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatermarkKind {
    #[default]
    Text,
    Image,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WatermarkContent {
    Text { text: String, font_size: u32 },
    Image { path: PathBuf },
}

/// Everything needed to watermark one batch of images. Built once per run.
#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkSpec {
    pub content: WatermarkContent,
    pub position: Position,
    pub opacity: Opacity,
}

impl WatermarkSpec {
    pub fn text(
        text: impl Into<String>,
        font_size: u32,
        position: Position,
        opacity: Opacity,
    ) -> Result<Self, WatermarkError> {
        if !(MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&font_size) {
            return Err(WatermarkError::InvalidFontSize(font_size));
        }

        Ok(Self {
            content: WatermarkContent::Text {
                text: text.into(),
                font_size,
            },
            position,
            opacity,
        })
    }

    pub fn image(path: impl Into<PathBuf>, position: Position, opacity: Opacity) -> Self {
        Self {
            content: WatermarkContent::Image { path: path.into() },
            position,
            opacity,
        }
    }

    pub fn kind(&self) -> WatermarkKind {
        match self.content {
            WatermarkContent::Text { .. } => WatermarkKind::Text,
            WatermarkContent::Image { .. } => WatermarkKind::Image,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opacity_alpha() {
        assert_eq!(Opacity::new(100).unwrap().alpha(), 255);
        assert_eq!(Opacity::new(50).unwrap().alpha(), 127);
        assert_eq!(Opacity::new(10).unwrap().alpha(), 25);
    }

    #[test]
    fn test_opacity_out_of_range() {
        assert!(matches!(
            Opacity::new(9),
            Err(WatermarkError::InvalidOpacity(9))
        ));
        assert!(Opacity::new(101).is_err());
    }

    #[test]
    fn test_position_names() {
        assert_eq!(Position::from("top_left"), Position::TopLeft);
        assert_eq!(Position::from("Top-Right"), Position::TopRight);
        assert_eq!(Position::from("bottom_left"), Position::BottomLeft);
        assert_eq!(Position::from("center"), Position::Center);
        assert_eq!(Position::from("somewhere"), Position::BottomRight);
        assert_eq!("".parse::<Position>().unwrap(), Position::BottomRight);
    }

    #[test]
    fn test_text_spec_rejects_font_size() {
        let result = WatermarkSpec::text("x", 11, Position::Center, Opacity::default());
        assert!(matches!(result, Err(WatermarkError::InvalidFontSize(11))));
        let result = WatermarkSpec::text("x", 101, Position::Center, Opacity::default());
        assert!(result.is_err());

        let spec = WatermarkSpec::text("x", 36, Position::Center, Opacity::default()).unwrap();
        assert_eq!(spec.kind(), WatermarkKind::Text);
    }
}
