use crate::watermark::image_mark::{
    add_image_watermark, fit_watermark, load_watermark_image, max_watermark_side,
    set_uniform_alpha,
};
use crate::watermark::{Opacity, Position, WatermarkError};
use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
use tempfile::TempDir;

#[test]
fn test_large_watermark_is_downscaled() {
    let watermark = RgbaImage::from_pixel(400, 200, Rgba([255, 0, 0, 255]));

    // Quarter of the smaller side of 800x600 is 150
    assert_eq!(max_watermark_side(800, 600), 150);
    let fitted = fit_watermark(&watermark, 800, 600);

    assert!(fitted.width().max(fitted.height()) <= 150);
    assert_eq!(fitted.width(), 150);
    // 2:1 aspect ratio within rounding
    assert!((fitted.height() as i64 - 75).abs() <= 1);
}

#[test]
fn test_tall_watermark_keeps_aspect_ratio() {
    let watermark = RgbaImage::from_pixel(90, 300, Rgba([0, 0, 255, 255]));
    let fitted = fit_watermark(&watermark, 1000, 400);

    assert_eq!(fitted.height(), 100);
    assert!((fitted.width() as i64 - 30).abs() <= 1);
}

#[test]
fn test_small_watermark_is_untouched() {
    let watermark = RgbaImage::from_pixel(40, 20, Rgba([0, 255, 0, 255]));
    let fitted = fit_watermark(&watermark, 800, 600);
    assert_eq!(fitted.dimensions(), (40, 20));
}

#[test]
fn test_uniform_alpha_discards_existing_alpha() {
    let mut watermark = RgbaImage::from_fn(4, 4, |x, _| Rgba([10, 20, 30, (x * 60) as u8]));
    set_uniform_alpha(&mut watermark, 25);
    assert!(watermark.pixels().all(|p| p[3] == 25));
    assert_eq!(watermark.get_pixel(3, 3), &Rgba([10, 20, 30, 25]));
}

#[test]
fn test_image_watermark_placed_top_left() {
    let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(400, 400, Rgba([0, 0, 0, 255])));
    let watermark = RgbaImage::from_pixel(50, 50, Rgba([255, 255, 255, 0]));

    let result = add_image_watermark(
        &image,
        &watermark,
        Position::TopLeft,
        Opacity::new(100).unwrap(),
    );

    assert_eq!(result.dimensions(), (400, 400));
    // Transparent source pixels become fully opaque
    assert_eq!(result.get_pixel(20, 20), &Rgba([255, 255, 255, 255]));
    assert_eq!(result.get_pixel(69, 69), &Rgba([255, 255, 255, 255]));
    assert_eq!(result.get_pixel(70, 70), &Rgba([0, 0, 0, 255]));
    assert_eq!(result.get_pixel(19, 19), &Rgba([0, 0, 0, 255]));
}

#[test]
fn test_oversized_placement_is_clipped() {
    let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 255])));
    let watermark = RgbaImage::from_pixel(100, 100, Rgba([255, 255, 255, 255]));

    // Max side is 2px; bottom-right with a 20px margin lands off-canvas
    let result = add_image_watermark(
        &image,
        &watermark,
        Position::BottomRight,
        Opacity::new(100).unwrap(),
    );
    assert_eq!(result.dimensions(), (8, 8));
    assert!(result.pixels().all(|p| *p == Rgba([0, 0, 0, 255])));
}

#[test]
fn test_load_watermark_image_converts_to_rgba() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("logo.png");
    RgbImage::from_pixel(12, 6, Rgb([1, 2, 3])).save(&path).unwrap();

    let loaded = load_watermark_image(&path).unwrap();
    assert_eq!(loaded.dimensions(), (12, 6));
    assert_eq!(loaded.get_pixel(0, 0), &Rgba([1, 2, 3, 255]));
}

#[test]
fn test_load_unreadable_watermark() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("logo.png");
    std::fs::write(&path, b"garbage").unwrap();

    let result = load_watermark_image(&path);
    assert!(matches!(result, Err(WatermarkError::WatermarkImage { .. })));
}
