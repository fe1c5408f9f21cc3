use super::types::Position;

/// Distance between the watermark and the image edge, in pixels
pub const MARGIN: i64 = 20;

/// Compute the top-left offset of watermark content inside an image.
///
/// Offsets are not clamped: content larger than the image yields negative
/// coordinates and is clipped when drawn.
pub fn resolve_offset(image_size: (u32, u32), content_size: (u32, u32), position: Position) -> (i64, i64) {
    let (image_width, image_height) = (image_size.0 as i64, image_size.1 as i64);
    let (content_width, content_height) = (content_size.0 as i64, content_size.1 as i64);

    let right = image_width - content_width - MARGIN;
    let bottom = image_height - content_height - MARGIN;

    match position {
        Position::TopLeft => (MARGIN, MARGIN),
        Position::TopRight => (right, MARGIN),
        Position::BottomLeft => (MARGIN, bottom),
        Position::BottomRight => (right, bottom),
        Position::Center => (
            (image_width - content_width).div_euclid(2),
            (image_height - content_height).div_euclid(2),
        ),
    }
}
