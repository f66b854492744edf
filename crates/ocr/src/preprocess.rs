use image::{imageops::FilterType, DynamicImage, GrayImage, ImageBuffer, Luma};
use std::io::Cursor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("could not decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("could not encode normalized image: {0}")]
    Encode(String),
}

/// Engines degrade above roughly 300 DPI scans; photos from modern phone
/// cameras come in far larger than that.
const MAX_DIMENSION: u32 = 2600;
/// Below this, glyphs in a cropped screenshot get too small to segment.
const MIN_DIMENSION: u32 = 300;

/// Decode raw picker bytes (PNG / JPEG / WEBP / ...) and return a normalized
/// PNG ready for recognition.
pub fn normalize_for_ocr(data: &[u8]) -> Result<Vec<u8>, PreprocessError> {
    let img = image::load_from_memory(data)?;
    encode_png(normalize(img))
}

/// Rescale to the engine's sweet spot, then grayscale + contrast stretch.
fn normalize(img: DynamicImage) -> DynamicImage {
    let (w, h) = (img.width(), img.height());
    let img = if w > MAX_DIMENSION || h > MAX_DIMENSION {
        img.resize(MAX_DIMENSION, MAX_DIMENSION, FilterType::Lanczos3)
    } else if w.min(h) > 0 && w.min(h) < MIN_DIMENSION {
        // Small crops recognize noticeably better when doubled.
        img.resize(w * 2, h * 2, FilterType::Lanczos3)
    } else {
        img
    };

    DynamicImage::ImageLuma8(stretch_contrast(img.to_luma8()))
}

/// Remap pixel intensities so the darkest becomes 0 and the lightest 255.
fn stretch_contrast(gray: GrayImage) -> GrayImage {
    let (lo, hi) = gray
        .pixels()
        .fold((255u8, 0u8), |(lo, hi), p| (lo.min(p[0]), hi.max(p[0])));

    if lo == hi {
        // Uniform image, nothing to stretch.
        return gray;
    }

    let range = (hi - lo) as u32;
    let lut: Vec<u8> = (0..=255u32)
        .map(|v| {
            let v = v.saturating_sub(lo as u32).min(range);
            (v * 255 / range) as u8
        })
        .collect();

    ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
        Luma([lut[gray.get_pixel(x, y)[0] as usize]])
    })
}

fn encode_png(img: DynamicImage) -> Result<Vec<u8>, PreprocessError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| PreprocessError::Encode(e.to_string()))?;
    Ok(buf)
}
