//! Performance benchmarks for imageops-smartcrop
//!
//! Measures the blur, entropy, crop and compositing paths across image sizes
//! to track regressions.

use criterion::*;
use image::Rgba;
use imageops_smartcrop::{
    gaussian_coefficients, remap_global_opacity, AlphaCompositeExt, CropAlgorithm, EntropyExt,
    EntropyHistogram, GaussianBlurExt, GridCropParams, Image, SlicingCropParams, SmartCropExt,
};
use itertools::iproduct;
use std::hint::black_box;

/// Helper function to create a test RGBA image with a gradient and a busy subject
fn create_rgba_image(width: u32, height: u32) -> Image<Rgba<u8>> {
    let mut image: Image<Rgba<u8>> = Image::new(width, height);

    iproduct!(0..height, 0..width).for_each(|(y, x)| {
        let r = ((x * 255) / width) as u8;
        let g = ((y * 255) / height) as u8;
        let b = ((x + y) * 255 / (width + height)) as u8;
        let a = if (x + y) % 3 == 0 { 128 } else { 255 };
        image.put_pixel(x, y, Rgba([r, g, b, a]));
    });

    // Checkerboard subject in the right third
    let (left, top, size) = (width * 2 / 3, height / 4, width.min(height) / 4);
    iproduct!(top..(top + size).min(height), left..(left + size).min(width)).for_each(|(y, x)| {
        let v = if (x / 2 + y / 2) % 2 == 0 { 250 } else { 5 };
        image.put_pixel(x, y, Rgba([v, v, v, 255]));
    });

    image
}

fn bench_gaussian_coefficients(c: &mut Criterion) {
    let mut group = c.benchmark_group("gaussian_coefficients");

    for radius in [1u32, 5, 25, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(radius), &radius, |b, &radius| {
            b.iter(|| gaussian_coefficients(black_box(radius), None).unwrap());
        });
    }

    group.finish();
}

fn bench_gaussian_blur(c: &mut Criterion) {
    let mut group = c.benchmark_group("gaussian_blur");

    for size in [64u32, 256, 512] {
        let image = create_rgba_image(size, size);
        group.throughput(Throughput::Elements(u64::from(size * size)));

        for radius in [2u32, 8] {
            group.bench_with_input(
                BenchmarkId::new(format!("radius_{radius}"), size),
                &image,
                |b, image| b.iter(|| black_box(image).gaussian_blur(radius, None).unwrap()),
            );
        }
    }

    group.finish();
}

fn bench_entropy(c: &mut Criterion) {
    let mut group = c.benchmark_group("entropy");
    let image = create_rgba_image(256, 256);

    for histogram in [EntropyHistogram::Luminance, EntropyHistogram::Channels] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{histogram:?}")),
            &histogram,
            |b, &histogram| {
                b.iter(|| {
                    black_box(&image)
                        .entropy_with(0, 0, 256, 256, histogram)
                        .unwrap()
                });
            },
        );
    }

    group.finish();
}

fn bench_smart_crop(c: &mut Criterion) {
    let mut group = c.benchmark_group("smart_crop");

    for size in [128u32, 512, 1024] {
        let image = create_rgba_image(size, size * 3 / 4);
        let target = size / 4;

        group.bench_with_input(BenchmarkId::new("slicing", size), &image, |b, image| {
            let algorithm = CropAlgorithm::Slicing(SlicingCropParams::default());
            b.iter(|| {
                black_box(image)
                    .smart_crop_region(target, target, &algorithm)
                    .unwrap()
            });
        });

        group.bench_with_input(BenchmarkId::new("gridding", size), &image, |b, image| {
            let algorithm = CropAlgorithm::Gridding(GridCropParams::default());
            b.iter(|| {
                black_box(image)
                    .smart_crop_region(target, target, &algorithm)
                    .unwrap()
            });
        });
    }

    group.finish();
}

fn bench_compositing(c: &mut Criterion) {
    let mut group = c.benchmark_group("compositing");
    let canvas = create_rgba_image(512, 512);
    let stamp = create_rgba_image(256, 256);

    for pct in [100u8, 70] {
        group.bench_with_input(BenchmarkId::new("merge", pct), &pct, |b, &pct| {
            b.iter_batched(
                || canvas.clone(),
                |mut canvas| {
                    canvas
                        .merge_preserving_alpha(&stamp, (128, 128), (0, 0), (256, 256), pct)
                        .unwrap();
                    canvas
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.bench_function("remap_global_opacity", |b| {
        b.iter_batched(
            || canvas.clone(),
            |mut canvas| {
                remap_global_opacity(&mut canvas, 50).unwrap();
                canvas
            },
            BatchSize::LargeInput,
        );
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_gaussian_coefficients,
    bench_gaussian_blur,
    bench_entropy,
    bench_smart_crop,
    bench_compositing,
);
criterion_main!(benches);
