use image::{GenericImage, GenericImageView, ImageError, Rgba};
use itertools::iproduct;
use tracing::debug;

use crate::error::CompositeError;
use crate::utils::{region_fits, round_to_u8, try_new_image};
use crate::Image;

/// Trait for alpha-aware compositing on RGBA images
///
/// Both operations keep the destination's alpha channel meaningful: merging
/// never lets the source overwrite destination transparency, and opacity
/// remapping only ever moves alpha towards the most opaque pixel.
pub trait AlphaCompositeExt {
    /// Merges a region of `src` into this image at `pct` percent, keeping this image's alpha
    ///
    /// See [`merge_copy_preserving_alpha`].
    ///
    /// # Errors
    ///
    /// * `CompositeError::InvalidParameter` - `pct` is above 100
    /// * `CompositeError::OutOfBounds` - a region is not inside its image
    /// * `CompositeError::AllocationFailed` - the scratch buffer could not be allocated
    ///
    /// # Examples
    ///
    /// ```
    /// use image::Rgba;
    /// use imageops_smartcrop::{AlphaCompositeExt, Image};
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut canvas: Image<Rgba<u8>> = Image::from_pixel(4, 4, Rgba([0, 0, 0, 128]));
    /// let stamp: Image<Rgba<u8>> = Image::from_pixel(2, 2, Rgba([255, 255, 255, 255]));
    ///
    /// canvas.merge_preserving_alpha(&stamp, (1, 1), (0, 0), (2, 2), 50)?;
    /// assert_eq!(*canvas.get_pixel(1, 1), Rgba([128, 128, 128, 128]));
    /// # Ok(())
    /// # }
    /// # example().unwrap();
    /// ```
    fn merge_preserving_alpha(
        &mut self,
        src: &Self,
        dst_origin: (u32, u32),
        src_origin: (u32, u32),
        size: (u32, u32),
        pct: u8,
    ) -> Result<&mut Self, CompositeError>;

    /// Moves every alpha value `pct` percent of the way towards the most opaque pixel
    ///
    /// See [`remap_global_opacity`].
    ///
    /// # Errors
    ///
    /// * `CompositeError::InvalidParameter` - `pct` is above 100
    fn remap_opacity(&mut self, pct: u8) -> Result<&mut Self, CompositeError>;
}

impl AlphaCompositeExt for Image<Rgba<u8>> {
    fn merge_preserving_alpha(
        &mut self,
        src: &Self,
        dst_origin: (u32, u32),
        src_origin: (u32, u32),
        size: (u32, u32),
        pct: u8,
    ) -> Result<&mut Self, CompositeError> {
        merge_copy_preserving_alpha(self, src, dst_origin, src_origin, size, pct)?;
        Ok(self)
    }

    fn remap_opacity(&mut self, pct: u8) -> Result<&mut Self, CompositeError> {
        remap_global_opacity(self, pct)?;
        Ok(self)
    }
}

/// Copies a `size` region from `src` at `src_origin` onto `dst` at
/// `dst_origin`, merged at `pct` percent, without touching `dst`'s alpha.
///
/// With `pct == 100` this is a plain region copy, alpha included.
/// Otherwise the destination region is copied into a scratch buffer, the
/// source is composited over it using `src_alpha * pct / 100` as its
/// opacity, and the scratch colors are written back while every destination
/// alpha value stays as it was. A fully transparent source pixel therefore
/// leaves the destination unchanged at any `pct`.
///
/// All parameters and both regions are checked before `dst` is modified.
///
/// # Errors
///
/// * `CompositeError::InvalidParameter` - `pct` is above 100
/// * `CompositeError::OutOfBounds` - a region is not fully inside its image
/// * `CompositeError::AllocationFailed` - the scratch buffer could not be
///   allocated; `dst` is untouched
pub fn merge_copy_preserving_alpha(
    dst: &mut Image<Rgba<u8>>,
    src: &Image<Rgba<u8>>,
    (dst_x, dst_y): (u32, u32),
    (src_x, src_y): (u32, u32),
    (width, height): (u32, u32),
    pct: u8,
) -> Result<(), CompositeError> {
    validate_pct(pct)?;
    check_region("destination", dst, dst_x, dst_y, width, height)?;
    check_region("source", src, src_x, src_y, width, height)?;

    if width == 0 || height == 0 {
        return Ok(());
    }

    let (image_width, image_height) = dst.dimensions();
    let out_of_destination = move |_: ImageError| CompositeError::OutOfBounds {
        image: "destination",
        x: dst_x,
        y: dst_y,
        width,
        height,
        image_width,
        image_height,
    };

    if pct == 100 {
        return dst
            .copy_from(&*src.view(src_x, src_y, width, height), dst_x, dst_y)
            .map_err(out_of_destination);
    }

    let mut scratch: Image<Rgba<u8>> =
        try_new_image(width, height).ok_or(CompositeError::AllocationFailed { width, height })?;

    let strength = f32::from(pct) / 100.0;
    for (y, x) in iproduct!(0..height, 0..width) {
        let below = dst.get_pixel(dst_x + x, dst_y + y);
        let above = src.get_pixel(src_x + x, src_y + y);
        let opacity = f32::from(above[3]) / 255.0 * strength;

        let mut merged = *below;
        for (channel, (&top, &bottom)) in merged.0[..3]
            .iter_mut()
            .zip(above.0[..3].iter().zip(below.0[..3].iter()))
        {
            *channel = round_to_u8(
                f32::from(top).mul_add(opacity, f32::from(bottom) * (1.0 - opacity)),
            );
        }
        scratch.put_pixel(x, y, merged);
    }

    dst.copy_from(&scratch, dst_x, dst_y).map_err(out_of_destination)?;

    debug!(dst_x, dst_y, src_x, src_y, width, height, pct, "merged region preserving alpha");
    Ok(())
}

/// Moves every pixel's alpha `pct` percent of the way towards the image's
/// most opaque alpha.
///
/// With `a_max` the largest alpha in the image, each pixel becomes
/// `a + (a_max - a) * pct / 100`, rounded. Relative ordering of alpha values
/// is kept, pixels already at `a_max` never change and color channels are
/// left alone. `pct == 0` is the identity.
///
/// # Errors
///
/// * `CompositeError::InvalidParameter` - `pct` is above 100
///
/// # Examples
///
/// ```
/// use image::Rgba;
/// use imageops_smartcrop::{remap_global_opacity, Image};
///
/// let mut image: Image<Rgba<u8>> = Image::from_pixel(2, 1, Rgba([9, 9, 9, 200]));
/// image.put_pixel(1, 0, Rgba([9, 9, 9, 100]));
///
/// remap_global_opacity(&mut image, 50).unwrap();
/// assert_eq!(image.get_pixel(0, 0)[3], 200);
/// assert_eq!(image.get_pixel(1, 0)[3], 150);
/// ```
pub fn remap_global_opacity(image: &mut Image<Rgba<u8>>, pct: u8) -> Result<(), CompositeError> {
    validate_pct(pct)?;

    let Some(most_opaque) = image.pixels().map(|pixel| pixel[3]).max() else {
        return Ok(());
    };

    let pct = u32::from(pct);
    for pixel in image.pixels_mut() {
        let alpha = u32::from(pixel[3]);
        let lift = ((u32::from(most_opaque) - alpha) * pct + 50) / 100;
        pixel[3] = (alpha + lift) as u8;
    }

    debug!(most_opaque, pct, "remapped global opacity");
    Ok(())
}

fn validate_pct(pct: u8) -> Result<(), CompositeError> {
    if pct > 100 {
        return Err(CompositeError::InvalidParameter(format!(
            "pct must be between 0 and 100, got {pct}"
        )));
    }
    Ok(())
}

fn check_region(
    image_name: &'static str,
    image: &Image<Rgba<u8>>,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
) -> Result<(), CompositeError> {
    let (image_width, image_height) = image.dimensions();
    if region_fits(x, y, width, height, (image_width, image_height)) {
        Ok(())
    } else {
        Err(CompositeError::OutOfBounds {
            image: image_name,
            x,
            y,
            width,
            height,
            image_width,
            image_height,
        })
    }
}
