//! Internal utility functions for imageops-smartcrop.
//!
//! This module contains common functionality used across different image operations.

use image::{ImageBuffer, Pixel, Primitive};

use crate::Image;

/// Rounds a floating-point channel value to the nearest `u8`, saturating at the ends.
///
/// `imageproc`'s `Clamp` truncates, which would drift a uniform image
/// downwards by one level whenever the kernel sums to slightly below 1.0.
#[inline]
pub fn round_to_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Allocates a zeroed `Vec` of `len` elements without aborting on memory exhaustion.
///
/// # Returns
///
/// `None` if the allocation cannot be satisfied
pub fn try_zeroed_vec<T: Copy + Default>(len: usize) -> Option<Vec<T>> {
    let mut data = Vec::new();
    data.try_reserve_exact(len).ok()?;
    data.resize(len, T::default());
    Some(data)
}

/// Creates a zero-filled image, reporting allocation failure instead of aborting.
///
/// # Arguments
///
/// * `width` - The width of the image
/// * `height` - The height of the image
///
/// # Returns
///
/// The new image, or `None` if the size overflows or memory is exhausted
pub fn try_new_image<P>(width: u32, height: u32) -> Option<Image<P>>
where
    P: Pixel,
    P::Subpixel: Primitive + Default,
{
    let len = (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(usize::from(P::CHANNEL_COUNT))?;
    let data = try_zeroed_vec(len)?;
    ImageBuffer::from_raw(width, height, data)
}

/// Validates that an image has non-zero dimensions.
///
/// # Arguments
///
/// * `width` - The width of the image
/// * `height` - The height of the image
///
/// # Returns
///
/// `true` if neither dimension is zero
#[inline]
pub const fn is_non_empty(width: u32, height: u32) -> bool {
    width != 0 && height != 0
}

/// Checks that a `width x height` region at `(x, y)` lies inside a
/// `bounds.0 x bounds.1` image, without overflowing.
#[inline]
pub fn region_fits(x: u32, y: u32, width: u32, height: u32, bounds: (u32, u32)) -> bool {
    let right = u64::from(x) + u64::from(width);
    let bottom = u64::from(y) + u64::from(height);
    right <= u64::from(bounds.0) && bottom <= u64::from(bounds.1)
}
