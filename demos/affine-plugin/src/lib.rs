//! Demo plugin: a fixed affine warp.
//!
//! The top-left, top-right and bottom-left corners are mapped to points
//! inside the frame; pixels that fall outside the source are black. The
//! output keeps the input dimensions.

use pixview::buffer::{PixelView, PixelViewMut};

/// Where the three source corners land, as fractions of width and height.
const TARGET: [(f64, f64); 3] = [(0.0, 0.33), (0.85, 0.25), (0.15, 0.7)];

/// Maps destination coordinates back into the source image.
struct InverseMap {
    origin: (f64, f64),
    // inverse of the 2x2 linear part, row-major
    inv: [f64; 4],
}

impl InverseMap {
    fn new(width: usize, height: usize) -> Option<Self> {
        let (w, h) = (width as f64, height as f64);
        let span_x = (width.max(2) - 1) as f64;
        let span_y = (height.max(2) - 1) as f64;

        let origin = (TARGET[0].0 * w, TARGET[0].1 * h);
        let a = (
            (TARGET[1].0 * w - origin.0) / span_x,
            (TARGET[1].1 * h - origin.1) / span_x,
        );
        let b = (
            (TARGET[2].0 * w - origin.0) / span_y,
            (TARGET[2].1 * h - origin.1) / span_y,
        );
        let det = a.0 * b.1 - b.0 * a.1;
        if det.abs() < f64::EPSILON {
            return None;
        }
        Some(Self {
            origin,
            inv: [b.1 / det, -b.0 / det, -a.1 / det, a.0 / det],
        })
    }

    fn source(&self, x: usize, y: usize) -> (f64, f64) {
        let dx = x as f64 - self.origin.0;
        let dy = y as f64 - self.origin.1;
        (
            self.inv[0] * dx + self.inv[1] * dy,
            self.inv[2] * dx + self.inv[3] * dy,
        )
    }
}

fn affine(input: &PixelView<'_>, output: &mut PixelViewMut<'_>) -> Result<(), String> {
    let (width, height) = (input.width(), input.height());
    let map = InverseMap::new(width, height).ok_or("degenerate affine map")?;

    for y in 0..height {
        for x in 0..width {
            let (sx, sy) = map.source(x, y);
            let (sx, sy) = (sx.round(), sy.round());
            let inside = sx >= 0.0 && sy >= 0.0 && sx < width as f64 && sy < height as f64;
            let rgb = if inside {
                input.pixel(sx as usize, sy as usize)
            } else {
                [0, 0, 0]
            };
            output.set_pixel(x, y, rgb);
        }
    }
    Ok(())
}

pixview::define_transform_plugin! {
    name: "Affine",
    description: "Warps the image through a fixed affine map",
    apply: affine,
}
