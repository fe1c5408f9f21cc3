use crate::WatermarkConfig;
use crate::batch::find_images;
use crate::watermark::{Opacity, WatermarkError, WatermarkKind, WatermarkSpec};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};

/// Conditions that abort a run before any image is touched
#[derive(Debug, Error)]
pub enum PreflightError {
    #[error("No directory selected")]
    DirectoryNotSelected,

    #[error("Directory does not exist: {0:?}")]
    DirectoryMissing(PathBuf),

    #[error("Failed to read directory {path:?}: {source}")]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No image files found in {0:?}")]
    NoImagesFound(PathBuf),

    #[error("No watermark image selected")]
    WatermarkImageNotSelected,

    #[error("Watermark image does not exist: {0:?}")]
    WatermarkImageMissing(PathBuf),

    #[error("Watermark text is empty")]
    EmptyWatermarkText,

    #[error("Invalid watermark settings: {0}")]
    InvalidSettings(#[from] WatermarkError),
}

/// Turn watermark settings into a validated `WatermarkSpec`
pub fn build_spec(config: &WatermarkConfig) -> Result<WatermarkSpec, PreflightError> {
    let opacity = Opacity::new(config.opacity)?;

    match config.kind {
        WatermarkKind::Text => {
            if config.text.trim().is_empty() {
                return Err(PreflightError::EmptyWatermarkText);
            }
            Ok(WatermarkSpec::text(
                config.text.clone(),
                config.font_size,
                config.position,
                opacity,
            )?)
        }
        WatermarkKind::Image => {
            let path = config
                .image
                .as_ref()
                .ok_or(PreflightError::WatermarkImageNotSelected)?;
            if !path.is_file() {
                return Err(PreflightError::WatermarkImageMissing(path.clone()));
            }
            Ok(WatermarkSpec::image(path, config.position, opacity))
        }
    }
}

/// Validate the directory and collect the images a run would process
pub fn check_directory(
    directory: Option<&Path>,
    skip_watermarked: bool,
) -> Result<Vec<PathBuf>, PreflightError> {
    let directory = directory.ok_or(PreflightError::DirectoryNotSelected)?;

    if directory.as_os_str().is_empty() {
        return Err(PreflightError::DirectoryNotSelected);
    }

    if !directory.is_dir() {
        error!("Directory does not exist: {:?}", directory);
        return Err(PreflightError::DirectoryMissing(directory.to_path_buf()));
    }

    let images = find_images(directory, skip_watermarked).map_err(|source| {
        PreflightError::DirectoryUnreadable {
            path: directory.to_path_buf(),
            source,
        }
    })?;

    if images.is_empty() {
        return Err(PreflightError::NoImagesFound(directory.to_path_buf()));
    }

    info!("Found {} image(s) in {:?}", images.len(), directory);
    Ok(images)
}

/// Run every check and return the spec and file list for a batch
pub fn preflight(
    directory: Option<&Path>,
    config: &WatermarkConfig,
    skip_watermarked: bool,
) -> Result<(WatermarkSpec, Vec<PathBuf>), PreflightError> {
    info!("Performing preflight checks...");

    let images = check_directory(directory, skip_watermarked)?;
    let spec = build_spec(config)?;

    Ok((spec, images))
}
