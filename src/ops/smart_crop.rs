use image::{GenericImage, GenericImageView, Rgba};
use tracing::debug;

use crate::error::SmartCropError;
use crate::ops::composite::merge_copy_preserving_alpha;
use crate::ops::geometry::PositionedRectangle;
use crate::ops::grid_crop::{crop_by_gridding, GridCropParams};
use crate::ops::simulation::SIMULATION_OPACITY;
use crate::ops::slicing_crop::{crop_by_slicing, SlicingCropParams};
use crate::utils::try_new_image;
use crate::Image;

/// Region search used by [`SmartCropExt`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CropAlgorithm {
    /// Trim the less busy edge strip until the target size is reached
    Slicing(SlicingCropParams),
    /// Descend into the busiest block of a cell grid
    Gridding(GridCropParams),
}

impl Default for CropAlgorithm {
    fn default() -> Self {
        Self::Slicing(SlicingCropParams::default())
    }
}

/// Trait for entropy-driven cropping
///
/// Both searches only read the image. [`SmartCropExt::smart_crop`] then
/// copies the chosen region into a new buffer.
pub trait SmartCropExt {
    /// Finds the region a smart crop to `target_width x target_height` would keep
    ///
    /// The region always lies inside the image. Targets larger than the image
    /// are reduced to the image size on that axis.
    ///
    /// # Errors
    ///
    /// * `SmartCropError::InvalidParameter` - a target dimension is zero or
    ///   the algorithm parameters are invalid
    /// * `SmartCropError::EmptyImage` - the image has a zero dimension
    /// * `SmartCropError::AllocationFailed` - a working buffer could not be allocated
    fn smart_crop_region(
        &self,
        target_width: u32,
        target_height: u32,
        algorithm: &CropAlgorithm,
    ) -> Result<PositionedRectangle, SmartCropError>;

    /// Crops the image to its most interesting `target_width x target_height` region
    ///
    /// When the algorithm is [`CropAlgorithm::Gridding`] with `simulate` set,
    /// nothing is cropped: the result is a copy of the whole image with the
    /// search overlay merged on top at 70% opacity.
    ///
    /// # Errors
    ///
    /// * `SmartCropError::InvalidParameter` - a target dimension is zero or
    ///   the algorithm parameters are invalid
    /// * `SmartCropError::EmptyImage` - the image has a zero dimension
    /// * `SmartCropError::AllocationFailed` - the result could not be allocated
    ///
    /// # Examples
    ///
    /// ```
    /// use image::Rgba;
    /// use imageops_smartcrop::{CropAlgorithm, Image, SmartCropExt};
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let image: Image<Rgba<u8>> = Image::from_pixel(64, 48, Rgba([30, 60, 90, 255]));
    /// let cropped = image.smart_crop(32, 32, &CropAlgorithm::default())?;
    /// assert_eq!(cropped.dimensions(), (32, 32));
    /// # Ok(())
    /// # }
    /// # example().unwrap();
    /// ```
    fn smart_crop(
        &self,
        target_width: u32,
        target_height: u32,
        algorithm: &CropAlgorithm,
    ) -> Result<Image<Rgba<u8>>, SmartCropError>;
}

impl SmartCropExt for Image<Rgba<u8>> {
    fn smart_crop_region(
        &self,
        target_width: u32,
        target_height: u32,
        algorithm: &CropAlgorithm,
    ) -> Result<PositionedRectangle, SmartCropError> {
        match algorithm {
            CropAlgorithm::Slicing(params) => {
                crop_by_slicing(self, target_width, target_height, params)
            }
            CropAlgorithm::Gridding(params) => {
                let params = GridCropParams {
                    simulate: false,
                    ..params.clone()
                };
                crop_by_gridding(self, target_width, target_height, &params)
                    .map(|outcome| outcome.region)
            }
        }
    }

    fn smart_crop(
        &self,
        target_width: u32,
        target_height: u32,
        algorithm: &CropAlgorithm,
    ) -> Result<Image<Rgba<u8>>, SmartCropError> {
        if let CropAlgorithm::Gridding(params) = algorithm {
            if params.simulate {
                return simulate_grid_crop(self, target_width, target_height, params);
            }
        }

        let region = self.smart_crop_region(target_width, target_height, algorithm)?;
        let (x, y, width, height) = region.region();
        let mut cropped: Image<Rgba<u8>> =
            try_new_image(width, height).ok_or(SmartCropError::AllocationFailed { width, height })?;
        cropped
            .copy_from(&*self.view(x, y, width, height), 0, 0)
            .map_err(|err| SmartCropError::InvalidParameter(err.to_string()))?;

        debug!(x, y, width, height, "smart crop applied");
        Ok(cropped)
    }
}

fn simulate_grid_crop(
    image: &Image<Rgba<u8>>,
    target_width: u32,
    target_height: u32,
    params: &GridCropParams,
) -> Result<Image<Rgba<u8>>, SmartCropError> {
    let outcome = crop_by_gridding(image, target_width, target_height, params)?;

    let (width, height) = image.dimensions();
    let mut preview: Image<Rgba<u8>> =
        try_new_image(width, height).ok_or(SmartCropError::AllocationFailed { width, height })?;
    preview.copy_from_slice(image.as_raw());
    if let Some(overlay) = outcome.overlay {
        merge_copy_preserving_alpha(
            &mut preview,
            &overlay,
            (0, 0),
            (0, 0),
            (width, height),
            SIMULATION_OPACITY,
        )?;
    }

    debug!(width, height, "smart crop simulated");
    Ok(preview)
}
