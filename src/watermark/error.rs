use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatermarkError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Failed to load watermark image {path:?}: {source}")]
    WatermarkImage {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Opacity must be between 10 and 100 percent, got {0}")]
    InvalidOpacity(u8),

    #[error("Font size must be between 12 and 100, got {0}")]
    InvalidFontSize(u32),

    #[error("Source path has no file name: {0:?}")]
    InvalidPath(PathBuf),
}
