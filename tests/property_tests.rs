//! Property-based tests for imageops-smartcrop
//!
//! These tests use proptest to verify mathematical properties and invariants
//! that should hold for all possible inputs to the crop, blur and
//! compositing operations.

use image::Rgba;
use imageops_smartcrop::{
    crop_by_gridding, crop_by_slicing, gaussian_coefficients, merge_copy_preserving_alpha,
    remap_global_opacity, EntropyExt, GaussianBlurExt, GridCropParams, Image, SlicingCropParams,
};
use proptest::prelude::*;

/// Strategy for generating small but valid image dimensions
fn image_dimensions() -> impl Strategy<Value = (u32, u32)> {
    (1u32..=24, 1u32..=24)
}

/// Strategy for generating dimensions large enough for a grid search
fn crop_dimensions() -> impl Strategy<Value = (u32, u32)> {
    (1u32..=90, 1u32..=90)
}

/// Strategy for generating RGBA pixel values
fn rgba_pixel() -> impl Strategy<Value = Rgba<u8>> {
    any::<[u8; 4]>().prop_map(Rgba)
}

/// Strategy for generating an image with arbitrary pixels
fn rgba_image(max_side: u32) -> impl Strategy<Value = Image<Rgba<u8>>> {
    (1..=max_side, 1..=max_side).prop_flat_map(|(width, height)| {
        prop::collection::vec(any::<u8>(), (width * height * 4) as usize).prop_map(
            move |data| {
                Image::from_raw(width, height, data).unwrap_or_else(|| Image::new(width, height))
            },
        )
    })
}

/// Strategy for generating any valid grid search configuration
///
/// Sub-grids may span the full grid on one axis, never on both.
fn grid_params() -> impl Strategy<Value = GridCropParams> {
    (1u32..=120, 1u32..=120, 1u32..=6, 1u32..=6)
        .prop_flat_map(|(max_width, max_height, rows, cols)| {
            (
                Just((max_width, max_height, rows, cols)),
                1..=rows,
                1..=cols,
                any::<bool>(),
            )
        })
        .prop_filter(
            "sub-grid must be smaller than the grid",
            |&((_, _, rows, cols), sub_rows, sub_cols, _)| sub_rows < rows || sub_cols < cols,
        )
        .prop_map(|((max_width, max_height, rows, cols), sub_rows, sub_cols, simulate)| {
            GridCropParams {
                grid_max_width: max_width,
                grid_max_height: max_height,
                grid_rows: rows,
                grid_cols: cols,
                sub_rows,
                sub_cols,
                simulate,
                ..GridCropParams::default()
            }
        })
}

/// Builds an image from row-major pixels
fn image_from_pixels(width: u32, height: u32, pixels: &[Rgba<u8>]) -> Image<Rgba<u8>> {
    Image::from_fn(width, height, |x, y| pixels[(y * width + x) as usize])
}

proptest! {
    /// Property: Kernel weights are normalized for every radius and sigma
    #[test]
    fn coefficients_sum_to_one(radius in 1u32..=64, sigma in prop::option::of(0.1f64..50.0)) {
        let kernel = gaussian_coefficients(radius, sigma).unwrap();
        prop_assert_eq!(kernel.len(), (2 * radius + 1) as usize);
        prop_assert!((kernel.iter().sum::<f64>() - 1.0).abs() < 1e-6);
        prop_assert!(kernel.iter().all(|&w| w >= 0.0));
    }

    /// Property: Kernels are symmetric around the center
    #[test]
    fn coefficients_are_symmetric(radius in 1u32..=32) {
        let kernel = gaussian_coefficients(radius, None).unwrap();
        let last = kernel.len() - 1;
        for i in 0..kernel.len() / 2 {
            prop_assert!((kernel[i] - kernel[last - i]).abs() < 1e-12);
        }
    }

    /// Property: Radius zero always fails, whatever the sigma
    #[test]
    fn zero_radius_always_fails(sigma in prop::option::of(any::<f64>())) {
        prop_assert!(gaussian_coefficients(0, sigma).is_err());
    }

    /// Property: Entropy of a uniform window is exactly zero
    #[test]
    fn uniform_window_has_zero_entropy(
        (width, height) in image_dimensions(),
        pixel in rgba_pixel()
    ) {
        let image: Image<Rgba<u8>> = Image::from_pixel(width, height, pixel);
        prop_assert_eq!(image.entropy(0, 0, width, height).unwrap(), 0.0);
    }

    /// Property: Entropy ignores pixel order inside the window
    #[test]
    fn entropy_is_permutation_invariant(
        (width, height) in image_dimensions(),
        seed in any::<u64>(),
        rotation in any::<usize>()
    ) {
        let pixels: Vec<Rgba<u8>> = (0..u64::from(width * height))
            .map(|i| {
                let v = (i.wrapping_mul(0x9E37_79B9).wrapping_add(seed) >> 3) as u8;
                Rgba([v, v.wrapping_mul(3), v ^ 0x5A, 255])
            })
            .collect();
        let mut permuted = pixels.clone();
        permuted.reverse();
        permuted.rotate_left(rotation % pixels.len());

        let original = image_from_pixels(width, height, &pixels);
        let shuffled = image_from_pixels(width, height, &permuted);

        let a = original.entropy(0, 0, width, height).unwrap();
        let b = shuffled.entropy(0, 0, width, height).unwrap();
        prop_assert!((a - b).abs() < 1e-9);
    }

    /// Property: Blur never changes dimensions
    #[test]
    fn blur_preserves_dimensions(image in rgba_image(24), radius in 1u32..=12) {
        let blurred = image.gaussian_blur(radius, None).unwrap();
        prop_assert_eq!(blurred.dimensions(), image.dimensions());
    }

    /// Property: Blur output stays within the input's per-channel range
    #[test]
    fn blur_does_not_overshoot(image in rgba_image(16), radius in 1u32..=6) {
        let blurred = image.gaussian_blur(radius, None).unwrap();
        for channel in 0..4 {
            let min = image.pixels().map(|p| p[channel]).min().unwrap_or(0);
            let max = image.pixels().map(|p| p[channel]).max().unwrap_or(0);
            prop_assert!(blurred.pixels().all(|p| (min..=max).contains(&p[channel])));
        }
    }

    /// Property: Slicing crop regions stay inside the image at the clamped target size
    #[test]
    fn slicing_region_is_contained(
        image in rgba_image(40),
        target in (1u32..=60, 1u32..=60)
    ) {
        let (width, height) = image.dimensions();
        let region = crop_by_slicing(&image, target.0, target.1, &SlicingCropParams::default())
            .unwrap();

        prop_assert!(region.fits_within(width, height));
        let (_, _, w, h) = region.region();
        prop_assert_eq!((w, h), (target.0.min(width), target.1.min(height)));
    }

    /// Property: Full-size targets return the whole image
    #[test]
    fn slicing_full_size_is_identity(image in rgba_image(30)) {
        let (width, height) = image.dimensions();
        let region = crop_by_slicing(&image, width, height, &SlicingCropParams::default())
            .unwrap();
        prop_assert_eq!(region.region(), (0, 0, width, height));
    }

    /// Property: Grid crop regions stay inside the image at the clamped target size
    #[test]
    fn gridding_region_is_contained(
        (width, height) in crop_dimensions(),
        seed in any::<u8>(),
        target in (1u32..=100, 1u32..=100)
    ) {
        let image: Image<Rgba<u8>> = Image::from_fn(width, height, |x, y| {
            let v = ((x * 7 + y * 13) as u8).wrapping_mul(seed | 1);
            Rgba([v, v / 2, 255 - v, 255])
        });
        let outcome = crop_by_gridding(&image, target.0, target.1, &GridCropParams::default())
            .unwrap();

        prop_assert!(outcome.region.fits_within(width, height));
        let (_, _, w, h) = outcome.region.region();
        prop_assert_eq!((w, h), (target.0.min(width), target.1.min(height)));
    }

    /// Property: Every valid grid configuration yields a contained region,
    /// and drawing the simulation never changes which region is chosen
    #[test]
    fn gridding_region_is_contained_for_any_grid(
        (width, height) in crop_dimensions(),
        seed in any::<u8>(),
        target in (1u32..=100, 1u32..=100),
        params in grid_params()
    ) {
        let image: Image<Rgba<u8>> = Image::from_fn(width, height, |x, y| {
            let v = ((x * 5 + y * 11) as u8).wrapping_mul(seed | 1);
            Rgba([v, 255 - v, v / 3, 255])
        });
        let outcome = crop_by_gridding(&image, target.0, target.1, &params).unwrap();

        prop_assert!(outcome.region.fits_within(width, height));
        let (_, _, w, h) = outcome.region.region();
        prop_assert_eq!((w, h), (target.0.min(width), target.1.min(height)));

        if params.simulate {
            let overlay = outcome.overlay.as_ref();
            prop_assert_eq!(overlay.map(|o| o.dimensions()), Some((width, height)));

            let plain = GridCropParams { simulate: false, ..params.clone() };
            let unsimulated = crop_by_gridding(&image, target.0, target.1, &plain).unwrap();
            prop_assert_eq!(unsimulated.region.region(), outcome.region.region());
        } else {
            prop_assert!(outcome.overlay.is_none());
        }
    }

    /// Property: A full-strength merge is a pixel-for-pixel region copy
    #[test]
    fn full_strength_merge_is_region_copy(
        src in rgba_image(12),
        dst in rgba_image(12),
        offsets in (0u32..12, 0u32..12, 0u32..12, 0u32..12)
    ) {
        let (src_x, src_y, dst_x, dst_y) = offsets;
        let width = src.width().saturating_sub(src_x).min(dst.width().saturating_sub(dst_x));
        let height = src.height().saturating_sub(src_y).min(dst.height().saturating_sub(dst_y));

        let mut merged = dst.clone();
        merge_copy_preserving_alpha(
            &mut merged,
            &src,
            (dst_x.min(dst.width()), dst_y.min(dst.height())),
            (src_x.min(src.width()), src_y.min(src.height())),
            (width, height),
            100,
        )
        .unwrap();

        for (x, y, pixel) in merged.enumerate_pixels() {
            let inside = x >= dst_x && y >= dst_y && x < dst_x + width && y < dst_y + height;
            if inside {
                prop_assert_eq!(pixel, src.get_pixel(x - dst_x + src_x, y - dst_y + src_y));
            } else {
                prop_assert_eq!(pixel, dst.get_pixel(x, y));
            }
        }
    }

    /// Property: Partial merges never change destination alpha
    #[test]
    fn partial_merge_preserves_destination_alpha(
        src in rgba_image(10),
        dst in rgba_image(10),
        pct in 0u8..100
    ) {
        let width = src.width().min(dst.width());
        let height = src.height().min(dst.height());

        let mut merged = dst.clone();
        merge_copy_preserving_alpha(&mut merged, &src, (0, 0), (0, 0), (width, height), pct)
            .unwrap();

        for (merged_pixel, original) in merged.pixels().zip(dst.pixels()) {
            prop_assert_eq!(merged_pixel[3], original[3]);
        }
    }

    /// Property: Opacity remapping keeps alpha order and never lowers alpha
    #[test]
    fn remap_is_monotonic(image in rgba_image(12), pct in 0u8..=100) {
        let mut remapped = image.clone();
        remap_global_opacity(&mut remapped, pct).unwrap();

        let max = image.pixels().map(|p| p[3]).max().unwrap_or(0);
        for (before, after) in image.pixels().zip(remapped.pixels()) {
            prop_assert!(after[3] >= before[3]);
            prop_assert!(after[3] <= max);
            prop_assert_eq!(&before.0[..3], &after.0[..3]);
        }
        let alphas: Vec<(u8, u8)> = image
            .pixels()
            .zip(remapped.pixels())
            .map(|(before, after)| (before[3], after[3]))
            .collect();
        for pair in alphas.windows(2) {
            let ((a, remapped_a), (b, remapped_b)) = (pair[0], pair[1]);
            if a <= b {
                prop_assert!(remapped_a <= remapped_b);
            } else {
                prop_assert!(remapped_a >= remapped_b);
            }
        }
    }
}
