//! Benchmarks for the built-in box blur.
//!
//! Run with:
//!   cargo bench -- blur

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use pixview::buffer::PixelBuffer;
use pixview::transform::{BoxBlur, DEFAULT_KERNEL, Transform};

/// Common resolutions to benchmark
const RESOLUTIONS: &[(usize, usize, &str)] = &[
    (640, 480, "VGA"),
    (1280, 720, "720p"),
    (1920, 1080, "1080p"),
];

fn gradient(width: usize, height: usize, stride: usize) -> PixelBuffer {
    let mut buf = PixelBuffer::with_stride(width, height, stride).expect("valid shape");
    for y in 0..height {
        for x in 0..width {
            buf.set_pixel(x, y, [(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8]);
        }
    }
    buf
}

fn bench_blur_resolutions(c: &mut Criterion) {
    let mut group = c.benchmark_group("box_blur");
    let blur = BoxBlur::new(DEFAULT_KERNEL);

    for &(width, height, name) in RESOLUTIONS {
        let input = gradient(width, height, width * 3);
        group.throughput(Throughput::Bytes(input.as_bytes().len() as u64));

        group.bench_with_input(BenchmarkId::new("apply", name), &input, |b, input| {
            b.iter(|| {
                let output = blur.apply(&input.as_view()).unwrap();
                std::hint::black_box(output);
            });
        });
    }

    group.finish();
}

fn bench_blur_kernels(c: &mut Criterion) {
    let mut group = c.benchmark_group("box_blur_kernel");
    // padded rows, 720p
    let input = gradient(1280, 720, 1280 * 3 + 64);

    for kernel in [2, 8, 32] {
        let blur = BoxBlur::new(kernel);
        group.bench_with_input(BenchmarkId::from_parameter(kernel), &input, |b, input| {
            b.iter(|| {
                let output = blur.apply(&input.as_view()).unwrap();
                std::hint::black_box(output);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_blur_resolutions, bench_blur_kernels);
criterion_main!(benches);
