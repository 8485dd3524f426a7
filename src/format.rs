//! Pixel layouts and on-disk image formats.

use std::path::Path;

/// In-memory pixel layout of a [`PixelBuffer`](crate::buffer::PixelBuffer).
///
/// The discriminant is part of the plugin ABI (`RawImage::format`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum PixelFormat {
    /// RGB 8-bit per channel, packed (24 bits/pixel).
    #[default]
    Rgb24 = 0,
}

impl PixelFormat {
    /// Bytes occupied by one pixel.
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgb24 => 3,
        }
    }

    /// Minimum row length in bytes for `width` pixels.
    pub const fn min_stride(self, width: usize) -> usize {
        width * self.bytes_per_pixel()
    }

    /// Convert an ABI discriminant back into a format.
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::Rgb24),
            _ => None,
        }
    }
}

/// Image file formats accepted for loading, saving and directory browsing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    /// Portable Network Graphics.
    Png,
    /// Windows bitmap.
    Bmp,
    /// JPEG (lossy).
    Jpeg,
}

impl ImageFormat {
    /// All supported formats.
    pub const ALL: [ImageFormat; 3] = [ImageFormat::Png, ImageFormat::Bmp, ImageFormat::Jpeg];

    /// Canonical filename extension.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Bmp => "bmp",
            Self::Jpeg => "jpg",
        }
    }

    /// Match an extension (without the dot), ignoring ASCII case.
    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|format| format.extension().eq_ignore_ascii_case(ext))
    }

    /// Format implied by a path's extension, if any.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Whether lossless re-encoding reproduces the pixels exactly.
    pub const fn is_lossless(self) -> bool {
        !matches!(self, Self::Jpeg)
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Png => "PNG",
            Self::Bmp => "BMP",
            Self::Jpeg => "JPEG",
        };
        f.write_str(name)
    }
}
