use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use thiserror::Error;

use crate::ratio::AspectRatio;

/// Previews larger than this on either side get downscaled before display.
pub const PREVIEW_MAX_DIMENSION: u32 = 800;

/// Exports are full quality; the border is the point, not compression.
const JPEG_QUALITY: u8 = 100;

#[derive(Error, Debug)]
pub enum BorderError {
    #[error("source image has a zero dimension")]
    EmptyImage,

    #[error("image error: {0}")]
    Image(#[from] image::error::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Center `src` on a solid-color canvas sized to the target aspect ratio.
///
/// One dimension is kept, the other grows so the canvas ratio matches the
/// preset. The source is pasted verbatim, never scaled or blended.
pub fn compose(
    src: &RgbImage,
    border_color: Rgb<u8>,
    ratio: AspectRatio,
) -> Result<RgbImage, BorderError> {
    let (orig_width, orig_height) = src.dimensions();
    if orig_width == 0 || orig_height == 0 {
        return Err(BorderError::EmptyImage);
    }

    let target = ratio.value();
    let orig = orig_width as f64 / orig_height as f64;

    // Wider than target: keep width, grow height. Otherwise keep height,
    // grow width. Either way the canvas never shrinks below the source.
    let (new_width, new_height) = if orig > target {
        (orig_width, (orig_width as f64 / target).floor() as u32)
    } else {
        ((orig_height as f64 * target).floor() as u32, orig_height)
    };

    let mut canvas = RgbImage::from_pixel(new_width, new_height, border_color);

    let paste_x = (new_width - orig_width) / 2;
    let paste_y = (new_height - orig_height) / 2;
    imageops::replace(&mut canvas, src, paste_x as i64, paste_y as i64);

    Ok(canvas)
}

/// Compose and shrink to preview size in one step.
pub fn compose_preview(
    src: &RgbImage,
    border_color: Rgb<u8>,
    ratio: AspectRatio,
) -> Result<RgbImage, BorderError> {
    let canvas = compose(src, border_color, ratio)?;
    Ok(downscale_for_preview(canvas, PREVIEW_MAX_DIMENSION))
}

/// Downscale only when a dimension exceeds `max_size`, preserving aspect.
fn downscale_for_preview(image: RgbImage, max_size: u32) -> RgbImage {
    let (width, height) = image.dimensions();
    if width <= max_size && height <= max_size {
        return image;
    }

    let scale = (max_size as f64 / width as f64).min(max_size as f64 / height as f64);
    let new_width = ((width as f64 * scale) as u32).max(1);
    let new_height = ((height as f64 * scale) as u32).max(1);

    imageops::resize(&image, new_width, new_height, FilterType::Lanczos3)
}

/// Write the composited canvas as a maximum-quality JPEG.
pub fn export_jpeg(image: &RgbImage, path: &Path) -> Result<(), BorderError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    let mut encoder = JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY);
    encoder.encode_image(image)?;
    writer.flush()?;

    log::info!(
        "Exported {}x{} JPEG to {}",
        image.width(),
        image.height(),
        path.display()
    );
    Ok(())
}
