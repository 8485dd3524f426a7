//! Owned pixel buffers and borrowed views over them.
//!
//! A [`PixelBuffer`] always satisfies `data.len() == stride * height` and
//! `stride >= width * bytes_per_pixel`. Rows may carry padding bytes past
//! the last pixel, so every accessor walks rows through `stride`.

use crate::error::{Error, Result};
use crate::format::PixelFormat;

/// Shape of a pixel buffer, without its storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Shape {
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
    /// Bytes between the starts of consecutive rows.
    pub stride: usize,
    /// Pixel layout.
    pub format: PixelFormat,
}

impl Shape {
    /// Check the dimension invariants against a storage length.
    fn validate(&self, len: usize) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidBuffer(format!(
                "dimensions must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        let min_stride = self.format.min_stride(self.width);
        if self.stride < min_stride {
            return Err(Error::InvalidBuffer(format!(
                "stride {} is shorter than a row of {} bytes",
                self.stride, min_stride
            )));
        }
        let expected = self
            .stride
            .checked_mul(self.height)
            .ok_or_else(|| Error::InvalidBuffer("buffer size overflows".into()))?;
        if len != expected {
            return Err(Error::InvalidBuffer(format!(
                "expected {} bytes of pixel data, got {}",
                expected, len
            )));
        }
        Ok(())
    }

    /// Bytes of actual pixel data in one row.
    pub fn row_bytes(&self) -> usize {
        self.format.min_stride(self.width)
    }
}

/// Owned, contiguous RGB24 image.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    shape: Shape,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Create a zero-filled buffer with tightly packed rows.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        let stride = PixelFormat::Rgb24.min_stride(width);
        Self::with_stride(width, height, stride)
    }

    /// Create a zero-filled buffer with an explicit row stride.
    pub fn with_stride(width: usize, height: usize, stride: usize) -> Result<Self> {
        let len = stride
            .checked_mul(height)
            .ok_or_else(|| Error::InvalidBuffer("buffer size overflows".into()))?;
        Self::from_raw(width, height, stride, vec![0u8; len])
    }

    /// Create a zero-filled buffer with the same shape as `shape`.
    pub fn zeroed_like(shape: Shape) -> Result<Self> {
        Self::with_stride(shape.width, shape.height, shape.stride)
    }

    /// Wrap existing RGB24 bytes.
    ///
    /// Fails with [`Error::InvalidBuffer`] if `data.len() != stride * height`
    /// or the stride cannot hold a full row.
    pub fn from_raw(width: usize, height: usize, stride: usize, data: Vec<u8>) -> Result<Self> {
        let shape = Shape {
            width,
            height,
            stride,
            format: PixelFormat::Rgb24,
        };
        shape.validate(data.len())?;
        Ok(Self { shape, data })
    }

    /// Image width in pixels.
    pub fn width(&self) -> usize {
        self.shape.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> usize {
        self.shape.height
    }

    /// Bytes between row starts.
    pub fn stride(&self) -> usize {
        self.shape.stride
    }

    /// Pixel layout.
    pub fn format(&self) -> PixelFormat {
        self.shape.format
    }

    /// Full shape descriptor.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Raw storage including row padding.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Mutable raw storage including row padding.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume the buffer, returning its storage.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Pixel bytes of row `y`, without padding.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn row(&self, y: usize) -> &[u8] {
        let start = y * self.shape.stride;
        &self.data[start..start + self.shape.row_bytes()]
    }

    /// Mutable pixel bytes of row `y`, without padding.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        let start = y * self.shape.stride;
        let len = self.shape.row_bytes();
        &mut self.data[start..start + len]
    }

    /// RGB triple at `(x, y)`.
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let row = self.row(y);
        let i = x * 3;
        [row[i], row[i + 1], row[i + 2]]
    }

    /// Overwrite the RGB triple at `(x, y)`.
    pub fn set_pixel(&mut self, x: usize, y: usize, rgb: [u8; 3]) {
        let i = x * 3;
        self.row_mut(y)[i..i + 3].copy_from_slice(&rgb);
    }

    /// Borrow as a read-only view.
    pub fn as_view(&self) -> PixelView<'_> {
        PixelView {
            shape: self.shape,
            data: &self.data,
        }
    }

    /// Borrow as a writable view.
    pub fn as_view_mut(&mut self) -> PixelViewMut<'_> {
        PixelViewMut {
            shape: self.shape,
            data: &mut self.data,
        }
    }
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.shape.width)
            .field("height", &self.shape.height)
            .field("stride", &self.shape.stride)
            .field("format", &self.shape.format)
            .field("len", &self.data.len())
            .finish()
    }
}

/// Read-only borrow of pixel data with an explicit stride.
#[derive(Clone, Copy, Debug)]
pub struct PixelView<'a> {
    shape: Shape,
    data: &'a [u8],
}

impl<'a> PixelView<'a> {
    /// Build a view over foreign storage, validating the shape.
    pub fn new(shape: Shape, data: &'a [u8]) -> Result<Self> {
        shape.validate(data.len())?;
        Ok(Self { shape, data })
    }

    /// Image width in pixels.
    pub fn width(&self) -> usize {
        self.shape.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> usize {
        self.shape.height
    }

    /// Bytes between row starts.
    pub fn stride(&self) -> usize {
        self.shape.stride
    }

    /// Full shape descriptor.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Raw storage including row padding.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Pixel bytes of row `y`, without padding.
    #[inline]
    pub fn row(&self, y: usize) -> &'a [u8] {
        let start = y * self.shape.stride;
        &self.data[start..start + self.shape.row_bytes()]
    }

    /// RGB triple at `(x, y)`.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let row = self.row(y);
        let i = x * 3;
        [row[i], row[i + 1], row[i + 2]]
    }

    /// Copy into an owned buffer with the same shape.
    pub fn to_buffer(&self) -> PixelBuffer {
        PixelBuffer {
            shape: self.shape,
            data: self.data.to_vec(),
        }
    }
}

/// Writable borrow of pixel data with an explicit stride.
#[derive(Debug)]
pub struct PixelViewMut<'a> {
    shape: Shape,
    data: &'a mut [u8],
}

impl<'a> PixelViewMut<'a> {
    /// Build a writable view over foreign storage, validating the shape.
    pub fn new(shape: Shape, data: &'a mut [u8]) -> Result<Self> {
        shape.validate(data.len())?;
        Ok(Self { shape, data })
    }

    /// Image width in pixels.
    pub fn width(&self) -> usize {
        self.shape.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> usize {
        self.shape.height
    }

    /// Bytes between row starts.
    pub fn stride(&self) -> usize {
        self.shape.stride
    }

    /// Full shape descriptor.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Mutable pixel bytes of row `y`, without padding.
    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        let start = y * self.shape.stride;
        let len = self.shape.row_bytes();
        &mut self.data[start..start + len]
    }

    /// Overwrite the RGB triple at `(x, y)`.
    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, rgb: [u8; 3]) {
        let i = x * 3;
        self.row_mut(y)[i..i + 3].copy_from_slice(&rgb);
    }
}
