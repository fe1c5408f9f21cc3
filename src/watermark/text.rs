use chrono::Datelike;
use image::{DynamicImage, Rgba, RgbaImage};

use super::font::DisplayFont;
use super::position::resolve_offset;
use super::types::{Opacity, Position};
use super::composite_overlay;

/// Replace the `{year}` placeholder with the current year
pub fn expand_text(text: &str) -> String {
    if text.contains("{year}") {
        let current_year = chrono::Local::now().year();
        text.replace("{year}", &current_year.to_string())
    } else {
        text.to_string()
    }
}

/// Draw white text on a transparent overlay and composite it over `image`
pub fn add_text_watermark(
    image: &DynamicImage,
    font: &DisplayFont,
    text: &str,
    font_size: u32,
    position: Position,
    opacity: Opacity,
) -> RgbaImage {
    let (width, height) = (image.width(), image.height());
    let text = expand_text(text);

    let text_dimensions = font.text_size(font_size, &text);
    let (x, y) = resolve_offset((width, height), text_dimensions, position);

    let mut overlay = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 0]));
    font.draw_text(
        &mut overlay,
        Rgba([255, 255, 255, opacity.alpha()]),
        x,
        y,
        font_size,
        &text,
    );

    composite_overlay(image, &overlay)
}
