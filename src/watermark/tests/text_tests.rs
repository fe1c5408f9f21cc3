use crate::watermark::text::{add_text_watermark, expand_text};
use crate::watermark::{DisplayFont, Opacity, Position};
use chrono::Datelike;
use image::{DynamicImage, Rgba, RgbaImage};

fn black_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255])))
}

#[test]
fn test_text_drawn_at_bottom_right() {
    let image = black_image(200, 100);
    let font = DisplayFont::Builtin;

    // Builtin face at size 16 measures 46x14 for four glyphs
    assert_eq!(font.text_size(16, "TEST"), (46, 14));

    let result = add_text_watermark(
        &image,
        &font,
        "TEST",
        16,
        Position::BottomRight,
        Opacity::new(100).unwrap(),
    );

    assert_eq!(result.dimensions(), (200, 100));
    // Top-left dot of the first 'T' at (200-46-20, 100-14-20)
    assert_eq!(result.get_pixel(134, 66), &Rgba([255, 255, 255, 255]));
    // Outside the text box nothing changes
    assert_eq!(result.get_pixel(10, 10), &Rgba([0, 0, 0, 255]));
}

#[test]
fn test_text_opacity_blends_with_source() {
    let image = black_image(200, 100);
    let result = add_text_watermark(
        &image,
        &DisplayFont::Builtin,
        "TEST",
        16,
        Position::TopLeft,
        Opacity::new(50).unwrap(),
    );

    let pixel = result.get_pixel(20, 20);
    assert!(
        (120..=135).contains(&pixel[0]),
        "expected half-bright white, got {:?}",
        pixel
    );
    assert_eq!(pixel[3], 255);
}

#[test]
fn test_source_is_not_modified() {
    let image = black_image(120, 80);
    let before = image.to_rgba8();

    let _ = add_text_watermark(
        &image,
        &DisplayFont::Builtin,
        "A",
        24,
        Position::Center,
        Opacity::new(100).unwrap(),
    );

    assert_eq!(image.to_rgba8(), before);
}

#[test]
fn test_expand_year_placeholder() {
    let year = chrono::Local::now().year();
    assert_eq!(expand_text("© {year} Studio"), format!("© {} Studio", year));
    assert_eq!(expand_text("plain"), "plain");
}

/// Channel maximum of `image` inside the rectangle, clipped to the image
fn max_red(image: &RgbaImage, x0: i64, y0: i64, x1: i64, y1: i64) -> u8 {
    let mut max = 0;
    for y in y0.max(0)..y1.min(image.height() as i64) {
        for x in x0.max(0)..x1.min(image.width() as i64) {
            max = max.max(image.get_pixel(x as u32, y as u32)[0]);
        }
    }
    max
}

#[test]
fn test_truetype_text_at_bottom_right() {
    use crate::watermark::font::DEFAULT_FONT_DIRECTORIES;
    use crate::watermark::{FontLoader, resolve_offset};
    use std::path::PathBuf;

    let loader = FontLoader::new(
        vec![PathBuf::from("DejaVuSans.ttf")],
        DEFAULT_FONT_DIRECTORIES.iter().map(PathBuf::from).collect(),
    );
    let font = loader.load_display_font();
    // Skip test if font file doesn't exist
    if font.is_builtin() {
        return;
    }

    let image = black_image(800, 600);
    let (text_width, text_height) = font.text_size(36, "TEST");
    assert!(text_width > 0 && text_height > 0);
    let (x, y) = resolve_offset((800, 600), (text_width, text_height), Position::BottomRight);
    let (right, bottom) = (x + text_width as i64, y + text_height as i64);

    for (percent, expected) in [(100u8, 255u8), (50, 127)] {
        let result = add_text_watermark(
            &image,
            &font,
            "TEST",
            36,
            Position::BottomRight,
            Opacity::new(percent).unwrap(),
        );

        // Glyph outlines may overhang the measured box by a few pixels
        let inside = max_red(&result, x - 4, y - 4, right + 4, bottom + 4);
        assert!(
            inside.abs_diff(expected) <= 2,
            "expected peak {} at {}%, got {}",
            expected,
            percent,
            inside
        );
        assert_eq!(max_red(&result, 0, 0, 800, y - 8), 0);
        assert_eq!(max_red(&result, 0, 0, x - 8, 600), 0);
    }
}
