use image::{DynamicImage, Rgba, RgbaImage, imageops::FilterType};
use std::path::Path;
use tracing::debug;

use super::WatermarkError;
use super::composite_overlay;
use super::position::resolve_offset;
use super::types::{Opacity, Position};

/// Decode a watermark image and convert it to RGBA
pub fn load_watermark_image(path: &Path) -> Result<RgbaImage, WatermarkError> {
    let watermark = image::open(path).map_err(|source| WatermarkError::WatermarkImage {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(
        "Loaded watermark image {:?} ({}x{})",
        path,
        watermark.width(),
        watermark.height()
    );
    Ok(watermark.to_rgba8())
}

/// Largest side a watermark may have on an image of the given size
pub fn max_watermark_side(image_width: u32, image_height: u32) -> u32 {
    (image_width / 4).min(image_height / 4).max(1)
}

/// Downscale the watermark to fit a quarter of the smaller image side, keeping its aspect ratio
pub fn fit_watermark(watermark: &RgbaImage, image_width: u32, image_height: u32) -> RgbaImage {
    let max_side = max_watermark_side(image_width, image_height);
    if watermark.width() <= max_side && watermark.height() <= max_side {
        return watermark.clone();
    }

    DynamicImage::ImageRgba8(watermark.clone())
        .resize(max_side, max_side, FilterType::Lanczos3)
        .to_rgba8()
}

/// Overwrite every pixel's alpha with the same value
pub fn set_uniform_alpha(watermark: &mut RgbaImage, alpha: u8) {
    for pixel in watermark.pixels_mut() {
        pixel[3] = alpha;
    }
}

/// Place a scaled, uniformly transparent copy of `watermark` on `image`
pub fn add_image_watermark(
    image: &DynamicImage,
    watermark: &RgbaImage,
    position: Position,
    opacity: Opacity,
) -> RgbaImage {
    let (width, height) = (image.width(), image.height());

    let mut mark = fit_watermark(watermark, width, height);
    set_uniform_alpha(&mut mark, opacity.alpha());

    let (x, y) = resolve_offset((width, height), mark.dimensions(), position);

    let mut overlay = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 0]));
    image::imageops::replace(&mut overlay, &mark, x, y);

    composite_overlay(image, &overlay)
}
