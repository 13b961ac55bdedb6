mod error;
mod ops;
mod utils;

#[cfg(test)]
mod test_utils;

use image::{ImageBuffer, Pixel};

pub use error::{
    ColorParseError, CompositeError, EntropyError, GaussianBlurError, SmartCropError,
};
pub use ops::alpha::{
    from_inverted_alpha, to_inverted_alpha, InvertedAlphaExt, INVERTED_ALPHA_MAX,
};
pub use ops::color::parse_rgba_hex;
pub use ops::composite::{merge_copy_preserving_alpha, remap_global_opacity, AlphaCompositeExt};
pub use ops::entropy::{shannon_entropy, EntropyExt, EntropyHistogram};
pub use ops::gaussian::{default_sigma, gaussian_coefficients, GaussianBlurExt};
pub use ops::geometry::{Corner, Point, PositionedRectangle};
pub use ops::grid_crop::{crop_by_gridding, GridCropOutcome, GridCropParams, GridTermination};
pub use ops::simulation::{SimulationOverlay, DEFAULT_SIMULATION_COLORS, SIMULATION_OPACITY};
pub use ops::slicing_crop::{crop_by_slicing, SlicingCropParams};
pub use ops::smart_crop::{CropAlgorithm, SmartCropExt};
pub use ops::summed_area_table::{BlockSum, SummedAreaTable};

pub type Image<P> = ImageBuffer<P, Vec<<P as Pixel>::Subpixel>>;
