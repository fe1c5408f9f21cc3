// Watermark compositing - text and image overlays, flattening and JPEG output
mod bitmap;
pub mod compositor;
mod error;
pub mod font;
pub mod image_mark;
pub mod position;
pub mod text;
mod types;

use image::{DynamicImage, RgbaImage};

pub use compositor::{Compositor, DEFAULT_JPEG_QUALITY, output_path_for};
pub use error::WatermarkError;
pub use font::{DisplayFont, FontLoader};
pub use position::resolve_offset;
pub use types::{
    MAX_FONT_SIZE, MAX_OPACITY, MIN_FONT_SIZE, MIN_OPACITY, Opacity, Position, WatermarkContent,
    WatermarkKind, WatermarkSpec,
};

/// Alpha-blend a same-size overlay onto a copy of `base`
pub(crate) fn composite_overlay(base: &DynamicImage, overlay: &RgbaImage) -> RgbaImage {
    let mut composited = base.to_rgba8();
    image::imageops::overlay(&mut composited, overlay, 0, 0);
    composited
}
