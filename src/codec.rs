//! Image file encoding and decoding.
//!
//! The session only talks to [`ImageCodec`]. The default implementation
//! delegates to the `image` crate.

use crate::buffer::{PixelBuffer, PixelView};
use crate::error::{Error, Result};
use crate::format::ImageFormat;
use image::codecs::bmp::BmpEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use std::path::Path;

/// Default JPEG quality used when saving.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Encode/decode collaborator.
pub trait ImageCodec {
    /// Decode file bytes into an RGB24 buffer. `path` is only used for errors.
    fn decode(&self, path: &Path, bytes: &[u8]) -> Result<PixelBuffer>;

    /// Encode a view into the bytes of a file of the given format.
    fn encode(&self, image: &PixelView<'_>, format: ImageFormat) -> Result<Vec<u8>>;
}

/// Codec backed by the `image` crate (PNG, BMP, JPEG).
#[derive(Debug, Clone)]
pub struct ImageCrateCodec {
    jpeg_quality: u8,
}

impl ImageCrateCodec {
    /// Create a codec with the default JPEG quality.
    pub fn new() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    /// Set the JPEG quality (1-100).
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    /// Configured JPEG quality.
    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }
}

impl Default for ImageCrateCodec {
    fn default() -> Self {
        Self::new()
    }
}

/// Copy rows into a tightly packed vector, dropping stride padding.
fn packed_rows(image: &PixelView<'_>) -> Vec<u8> {
    let row_bytes = image.shape().row_bytes();
    if image.stride() == row_bytes {
        return image.as_bytes().to_vec();
    }
    let mut packed = Vec::with_capacity(row_bytes * image.height());
    for y in 0..image.height() {
        packed.extend_from_slice(image.row(y));
    }
    packed
}

impl ImageCodec for ImageCrateCodec {
    fn decode(&self, path: &Path, bytes: &[u8]) -> Result<PixelBuffer> {
        let decoded = image::load_from_memory(bytes).map_err(|e| Error::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let rgb = decoded.into_rgb8();
        let (width, height) = (rgb.width() as usize, rgb.height() as usize);
        PixelBuffer::from_raw(width, height, width * 3, rgb.into_raw())
    }

    fn encode(&self, image: &PixelView<'_>, format: ImageFormat) -> Result<Vec<u8>> {
        let width = u32::try_from(image.width())
            .map_err(|_| Error::Encode("image too wide".into()))?;
        let height = u32::try_from(image.height())
            .map_err(|_| Error::Encode("image too tall".into()))?;
        let pixels = packed_rows(image);

        let mut out = Vec::new();
        let result = match format {
            ImageFormat::Png => PngEncoder::new(&mut out).write_image(
                &pixels,
                width,
                height,
                ExtendedColorType::Rgb8,
            ),
            ImageFormat::Bmp => BmpEncoder::new(&mut out).write_image(
                &pixels,
                width,
                height,
                ExtendedColorType::Rgb8,
            ),
            ImageFormat::Jpeg => JpegEncoder::new_with_quality(&mut out, self.jpeg_quality)
                .write_image(&pixels, width, height, ExtendedColorType::Rgb8),
        };
        result.map_err(|e| Error::Encode(format!("{format}: {e}")))?;
        Ok(out)
    }
}
