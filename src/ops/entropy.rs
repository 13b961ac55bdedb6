use image::{GenericImageView, Pixel};
use itertools::iproduct;

use crate::error::EntropyError;
use crate::utils::region_fits;
use crate::Image;

/// Intensity measure used to build the entropy histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EntropyHistogram {
    /// 256 buckets of Rec. 709 luma. Entropy is at most 8 bits.
    #[default]
    Luminance,
    /// One 256-bucket histogram each for red, green and blue. The score is
    /// the mean of the three channel entropies, so it is also at most 8 bits.
    Channels,
}

impl EntropyHistogram {
    /// Number of independent 256-bucket histograms for this measure.
    #[must_use]
    pub const fn bank_count(self) -> usize {
        match self {
            Self::Luminance => 1,
            Self::Channels => 3,
        }
    }

    /// Largest entropy a window can reach under this measure.
    #[must_use]
    pub const fn max_entropy(self) -> f64 {
        8.0
    }
}

/// Trait for measuring the Shannon entropy of image windows.
///
/// Entropy is a proxy for visual busyness: a flat window scores 0, a window
/// whose intensities spread evenly across all buckets scores the maximum.
pub trait EntropyExt {
    /// Shannon entropy, in bits, of the luminance histogram of a window.
    ///
    /// # Arguments
    ///
    /// * `x`, `y` - Top-left corner of the window
    /// * `width`, `height` - Window size; an empty window scores 0
    ///
    /// # Errors
    ///
    /// * `EntropyError::OutOfBounds` - the window is not fully inside the image
    ///
    /// # Examples
    ///
    /// ```
    /// use image::Rgba;
    /// use imageops_smartcrop::{EntropyExt, Image};
    ///
    /// let image: Image<Rgba<u8>> = Image::from_pixel(8, 8, Rgba([40, 40, 40, 255]));
    /// assert_eq!(image.entropy(0, 0, 8, 8).unwrap(), 0.0);
    /// ```
    fn entropy(&self, x: u32, y: u32, width: u32, height: u32) -> Result<f64, EntropyError> {
        self.entropy_with(x, y, width, height, EntropyHistogram::Luminance)
    }

    /// Shannon entropy of a window using the given histogram measure.
    ///
    /// # Errors
    ///
    /// * `EntropyError::OutOfBounds` - the window is not fully inside the image
    fn entropy_with(
        &self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        histogram: EntropyHistogram,
    ) -> Result<f64, EntropyError>;
}

impl<P> EntropyExt for Image<P>
where
    P: Pixel<Subpixel = u8>,
{
    fn entropy_with(
        &self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        histogram: EntropyHistogram,
    ) -> Result<f64, EntropyError> {
        window_entropy(self, x, y, width, height, histogram)
    }
}

/// Entropy of a window of any 8-bit image view.
///
/// The view is only read; the histogram lives on the stack.
pub(crate) fn window_entropy<I>(
    image: &I,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    histogram: EntropyHistogram,
) -> Result<f64, EntropyError>
where
    I: GenericImageView,
    I::Pixel: Pixel<Subpixel = u8>,
{
    let (image_width, image_height) = image.dimensions();
    if !region_fits(x, y, width, height, (image_width, image_height)) {
        return Err(EntropyError::OutOfBounds {
            x,
            y,
            width,
            height,
            image_width,
            image_height,
        });
    }

    let mut banks = [[0u64; 256]; 3];
    for (py, px) in iproduct!(y..y + height, x..x + width) {
        let pixel = image.get_pixel(px, py);
        match histogram {
            EntropyHistogram::Luminance => {
                banks[0][usize::from(pixel.to_luma()[0])] += 1;
            }
            EntropyHistogram::Channels => {
                let channels = pixel.to_rgb().0;
                for (bank, value) in banks.iter_mut().zip(channels) {
                    bank[usize::from(value)] += 1;
                }
            }
        }
    }

    let used = &banks[..histogram.bank_count()];
    let total: f64 = used.iter().map(|bank| shannon_entropy(bank)).sum();
    Ok(total / used.len() as f64)
}

/// Shannon entropy in bits of a histogram: `-Σ p log2 p` over non-empty buckets.
///
/// An empty histogram has entropy 0.
#[must_use]
pub fn shannon_entropy(buckets: &[u64]) -> f64 {
    let total: u64 = buckets.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;

    // p * log2(1/p) keeps a single full bucket at +0.0 rather than -0.0
    buckets
        .iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let count = count as f64;
            let probability = count / total;
            probability * (total / count).log2()
        })
        .sum()
}
