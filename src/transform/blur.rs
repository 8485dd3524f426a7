//! Built-in box blur.

use super::Transform;
use crate::buffer::{PixelBuffer, PixelView};
use crate::error::Result;

/// Default side length of the blur window.
pub const DEFAULT_KERNEL: usize = 8;

/// Largest supported window. Keeps `255 * kernel^2` within a `u32` sum.
pub const MAX_KERNEL: usize = 255;

/// Mean filter over a square `kernel x kernel` window.
///
/// The window around pixel `x` spans `x - kernel/2 ..= x - kernel/2 + kernel - 1`,
/// so even kernels lean one pixel towards the top-left. Samples outside the
/// image replicate the nearest edge pixel.
///
/// Applying the blur twice blurs further; it is not idempotent.
#[derive(Debug, Clone)]
pub struct BoxBlur {
    kernel: usize,
}

impl BoxBlur {
    /// Create a blur with the given window size, clamped to `1..=MAX_KERNEL`.
    pub fn new(kernel: usize) -> Self {
        Self {
            kernel: kernel.clamp(1, MAX_KERNEL),
        }
    }

    /// Window side length.
    pub fn kernel(&self) -> usize {
        self.kernel
    }

    /// Offset of the first window sample relative to the centre pixel.
    fn first_offset(&self) -> isize {
        -((self.kernel / 2) as isize)
    }
}

impl Default for BoxBlur {
    fn default() -> Self {
        Self::new(DEFAULT_KERNEL)
    }
}

#[inline]
fn clamp_index(i: isize, len: usize) -> usize {
    i.clamp(0, len as isize - 1) as usize
}

impl Transform for BoxBlur {
    fn name(&self) -> &str {
        "Blur"
    }

    fn apply(&self, input: &PixelView<'_>) -> Result<PixelBuffer> {
        let width = input.width();
        let height = input.height();
        let first = self.first_offset();
        let kernel = self.kernel as isize;
        let area = (self.kernel * self.kernel) as u32;

        // Horizontal pass: per-channel window sums for every pixel.
        let mut sums = vec![0u32; width * height * 3];
        for y in 0..height {
            let row = input.row(y);
            let out = &mut sums[y * width * 3..(y + 1) * width * 3];
            for x in 0..width {
                let mut acc = [0u32; 3];
                for dx in first..first + kernel {
                    let sx = clamp_index(x as isize + dx, width) * 3;
                    acc[0] += row[sx] as u32;
                    acc[1] += row[sx + 1] as u32;
                    acc[2] += row[sx + 2] as u32;
                }
                out[x * 3..x * 3 + 3].copy_from_slice(&acc);
            }
        }

        // Vertical pass over the horizontal sums.
        let mut output = PixelBuffer::zeroed_like(input.shape())?;
        for y in 0..height {
            let out_row = output.row_mut(y);
            for x in 0..width * 3 {
                let mut acc = 0u32;
                for dy in first..first + kernel {
                    let sy = clamp_index(y as isize + dy, height);
                    acc += sums[sy * width * 3 + x];
                }
                out_row[x] = ((acc + area / 2) / area) as u8;
            }
        }

        Ok(output)
    }
}
