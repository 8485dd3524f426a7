//! Demo plugin: 3x3 sharpening.

use pixview::buffer::{PixelView, PixelViewMut};

/// Laplacian sharpening kernel, row-major.
const KERNEL: [[i32; 3]; 3] = [[0, -1, 0], [-1, 5, -1], [0, -1, 0]];

fn sharpen(input: &PixelView<'_>, output: &mut PixelViewMut<'_>) -> Result<(), String> {
    let (width, height) = (input.width(), input.height());
    let clamp = |v: isize, len: usize| v.clamp(0, len as isize - 1) as usize;

    for y in 0..height {
        for x in 0..width {
            let mut acc = [0i32; 3];
            for (ky, row) in KERNEL.iter().enumerate() {
                for (kx, &weight) in row.iter().enumerate() {
                    if weight == 0 {
                        continue;
                    }
                    let sx = clamp(x as isize + kx as isize - 1, width);
                    let sy = clamp(y as isize + ky as isize - 1, height);
                    let px = input.pixel(sx, sy);
                    for (sum, &channel) in acc.iter_mut().zip(&px) {
                        *sum += weight * i32::from(channel);
                    }
                }
            }
            output.set_pixel(x, y, acc.map(|v| v.clamp(0, 255) as u8));
        }
    }
    Ok(())
}

pixview::define_transform_plugin! {
    name: "Sharpen",
    description: "Sharpens edges with a 3x3 kernel",
    apply: sharpen,
}
