use image::Pixel;
use tracing::{debug, trace};

use crate::error::SmartCropError;
use crate::ops::entropy::{EntropyExt, EntropyHistogram};
use crate::ops::geometry::PositionedRectangle;
use crate::Image;

/// Parameters for [`crop_by_slicing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SlicingCropParams {
    /// Largest strip, in pixels, removed from an edge per step
    pub slice_width: u32,
    /// Histogram measure used to score strips
    pub histogram: EntropyHistogram,
}

impl Default for SlicingCropParams {
    fn default() -> Self {
        Self {
            slice_width: 10,
            histogram: EntropyHistogram::Luminance,
        }
    }
}

impl SlicingCropParams {
    /// Checks the parameters without touching any image.
    ///
    /// # Errors
    ///
    /// * `SmartCropError::InvalidParameter` - `slice_width` is zero
    pub fn validate(&self) -> Result<(), SmartCropError> {
        if self.slice_width == 0 {
            return Err(SmartCropError::InvalidParameter(
                "slice_width must be >= 1".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Finds a crop region by repeatedly trimming the less busy edge.
///
/// Horizontally, strips of at most `slice_width` columns are taken from the
/// current left and right edges; the one with lower entropy is dropped. On a
/// tie the left side is kept. Vertically the same happens with top and
/// bottom strips across the already narrowed width. Targets larger than the
/// image leave that axis untouched.
///
/// # Arguments
///
/// * `image` - Source image, only read
/// * `target_width`, `target_height` - Requested crop size, at least 1
/// * `params` - Strip width and histogram measure
///
/// # Errors
///
/// * `SmartCropError::InvalidParameter` - a target dimension or `slice_width` is zero
/// * `SmartCropError::EmptyImage` - the image has a zero dimension
///
/// # Examples
///
/// ```
/// use image::Rgba;
/// use imageops_smartcrop::{crop_by_slicing, Image, SlicingCropParams};
///
/// let image: Image<Rgba<u8>> = Image::from_pixel(40, 30, Rgba([0, 0, 0, 255]));
/// let region = crop_by_slicing(&image, 40, 30, &SlicingCropParams::default()).unwrap();
/// assert_eq!(region.region(), (0, 0, 40, 30));
/// ```
pub fn crop_by_slicing<P>(
    image: &Image<P>,
    target_width: u32,
    target_height: u32,
    params: &SlicingCropParams,
) -> Result<PositionedRectangle, SmartCropError>
where
    P: Pixel<Subpixel = u8>,
{
    validate_target(target_width, target_height)?;
    params.validate()?;

    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(SmartCropError::EmptyImage);
    }

    let histogram = params.histogram;
    let (mut left, mut top, mut right, mut bottom) = (0, 0, width, height);

    let mut dx = width - width.min(target_width);
    while dx > 0 {
        let slice = dx.min(params.slice_width);
        let strip_height = bottom - top;
        let left_entropy = image.entropy_with(left, top, slice, strip_height, histogram)?;
        let right_entropy =
            image.entropy_with(right - slice, top, slice, strip_height, histogram)?;

        if left_entropy >= right_entropy {
            right -= slice;
        } else {
            left += slice;
        }
        trace!(left_entropy, right_entropy, left, right, "horizontal slice");
        dx -= slice;
    }

    let mut dy = height - height.min(target_height);
    while dy > 0 {
        let slice = dy.min(params.slice_width);
        let strip_width = right - left;
        let top_entropy = image.entropy_with(left, top, strip_width, slice, histogram)?;
        let bottom_entropy =
            image.entropy_with(left, bottom - slice, strip_width, slice, histogram)?;

        if top_entropy >= bottom_entropy {
            bottom -= slice;
        } else {
            top += slice;
        }
        trace!(top_entropy, bottom_entropy, top, bottom, "vertical slice");
        dy -= slice;
    }

    debug!(
        x = left,
        y = top,
        width = right - left,
        height = bottom - top,
        "slicing crop region"
    );

    Ok(PositionedRectangle::from_region(
        left,
        top,
        right - left,
        bottom - top,
    ))
}

pub(crate) fn validate_target(target_width: u32, target_height: u32) -> Result<(), SmartCropError> {
    if target_width == 0 || target_height == 0 {
        return Err(SmartCropError::InvalidParameter(format!(
            "target size must be at least 1x1, got {target_width}x{target_height}"
        )));
    }
    Ok(())
}
