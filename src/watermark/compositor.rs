use image::{DynamicImage, ImageEncoder, Rgb, RgbImage, RgbaImage, codecs::jpeg::JpegEncoder};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::font::{DisplayFont, FontLoader};
use super::image_mark::{add_image_watermark, load_watermark_image};
use super::text::add_text_watermark;
use super::types::{WatermarkContent, WatermarkSpec};
use super::WatermarkError;

pub const DEFAULT_JPEG_QUALITY: u8 = 95;
pub const OUTPUT_SUFFIX: &str = "_wm";

/// Resources resolved once per run: the display font or the decoded watermark image
enum Stamp {
    Text {
        font: DisplayFont,
        text: String,
        font_size: u32,
    },
    Image(RgbaImage),
}

/// Applies one `WatermarkSpec` to any number of source images
pub struct Compositor {
    spec: WatermarkSpec,
    stamp: Stamp,
    jpeg_quality: u8,
}

impl Compositor {
    /// Load the font or watermark image the spec needs
    pub fn prepare(
        spec: WatermarkSpec,
        fonts: &FontLoader,
        jpeg_quality: u8,
    ) -> Result<Self, WatermarkError> {
        let stamp = match &spec.content {
            WatermarkContent::Text { text, font_size } => Stamp::Text {
                font: fonts.load_display_font(),
                text: text.clone(),
                font_size: *font_size,
            },
            WatermarkContent::Image { path } => Stamp::Image(load_watermark_image(path)?),
        };

        Ok(Self {
            spec,
            stamp,
            jpeg_quality: jpeg_quality.clamp(1, 100),
        })
    }

    pub fn spec(&self) -> &WatermarkSpec {
        &self.spec
    }

    /// Watermark a decoded image and flatten it onto white
    pub fn render(&self, image: &DynamicImage) -> RgbImage {
        let composited = match &self.stamp {
            Stamp::Text {
                font,
                text,
                font_size,
            } => add_text_watermark(
                image,
                font,
                text,
                *font_size,
                self.spec.position,
                self.spec.opacity,
            ),
            Stamp::Image(watermark) => {
                add_image_watermark(image, watermark, self.spec.position, self.spec.opacity)
            }
        };

        flatten_on_white(&composited)
    }

    /// Watermark `source` and write `<stem>_wm.jpg` next to it
    pub fn process_file(&self, source: &Path) -> Result<PathBuf, WatermarkError> {
        let output = output_path_for(source)?;
        self.process_file_to(source, &output)?;
        Ok(output)
    }

    /// Watermark `source` and write the JPEG result to `output`
    pub fn process_file_to(&self, source: &Path, output: &Path) -> Result<(), WatermarkError> {
        debug!("Opening image file: {:?}", source);
        let image = image::open(source)?;
        let rendered = self.render(&image);
        save_jpeg(&rendered, output, self.jpeg_quality)?;
        debug!("Wrote watermarked image {:?}", output);
        Ok(())
    }
}

/// `<dir>/<stem>_wm.jpg` for a source path
pub fn output_path_for(source: &Path) -> Result<PathBuf, WatermarkError> {
    let stem = source
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| WatermarkError::InvalidPath(source.to_path_buf()))?;
    Ok(source.with_file_name(format!("{}{}.jpg", stem, OUTPUT_SUFFIX)))
}

/// Paste an RGBA image onto an opaque white background using its alpha as mask
pub fn flatten_on_white(image: &RgbaImage) -> RgbImage {
    let mut flattened = RgbImage::new(image.width(), image.height());

    for (x, y, pixel) in image.enumerate_pixels() {
        let alpha = pixel[3] as u32;
        let blend = |channel: u8| -> u8 {
            ((channel as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8
        };
        flattened.put_pixel(x, y, Rgb([blend(pixel[0]), blend(pixel[1]), blend(pixel[2])]));
    }

    flattened
}

/// Encode an RGB image as JPEG. A partially written file is removed on failure.
pub fn save_jpeg(image: &RgbImage, path: &Path, quality: u8) -> Result<(), WatermarkError> {
    let output = BufWriter::new(std::fs::File::create(path)?);
    let encoder = JpegEncoder::new_with_quality(output, quality);
    let result = encoder.write_image(
        image,
        image.width(),
        image.height(),
        image::ExtendedColorType::Rgb8,
    );

    if let Err(e) = result {
        if let Err(remove_error) = std::fs::remove_file(path) {
            debug!("Failed to remove incomplete {:?}: {}", path, remove_error);
        }
        return Err(e.into());
    }

    Ok(())
}
