use image::Pixel;
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use tracing::debug;

use crate::error::GaussianBlurError;
use crate::utils::{is_non_empty, round_to_u8, try_new_image, try_zeroed_vec};
use crate::Image;

/// Default standard deviation for a kernel of the given radius.
///
/// `(2/3) * radius` gives a flatter curve, and so a softer blur, than the
/// usual `radius / 3` rule of thumb.
#[inline]
#[must_use]
pub fn default_sigma(radius: u32) -> f64 {
    2.0 / 3.0 * f64::from(radius)
}

/// Computes a normalized 1-D Gaussian kernel.
///
/// The kernel has `2 * radius + 1` taps; tap `i` (for offsets
/// `-radius..=radius`) is proportional to `exp(-i² / (2σ²))` and the taps sum
/// to 1.
///
/// # Arguments
///
/// * `radius` - Kernel radius in pixels, at least 1
/// * `sigma` - Standard deviation; `None` selects [`default_sigma`]
///
/// # Errors
///
/// * `GaussianBlurError::InvalidRadius` - `radius` is zero
/// * `GaussianBlurError::InvalidSigma` - `sigma` is not finite or not positive
/// * `GaussianBlurError::AllocationFailed` - the kernel does not fit in memory
///
/// # Examples
///
/// ```
/// use imageops_smartcrop::gaussian_coefficients;
///
/// let kernel = gaussian_coefficients(3, None).unwrap();
/// assert_eq!(kernel.len(), 7);
/// assert!((kernel.iter().sum::<f64>() - 1.0).abs() < 1e-6);
/// ```
pub fn gaussian_coefficients(radius: u32, sigma: Option<f64>) -> Result<Vec<f64>, GaussianBlurError> {
    if radius < 1 {
        return Err(GaussianBlurError::InvalidRadius(radius));
    }

    let sigma = match sigma {
        Some(sigma) if sigma.is_finite() && sigma > 0.0 => sigma,
        Some(sigma) => return Err(GaussianBlurError::InvalidSigma(sigma)),
        None => default_sigma(radius),
    };

    let taps = 2 * u64::from(radius) + 1;
    let mut kernel: Vec<f64> = usize::try_from(taps)
        .ok()
        .and_then(try_zeroed_vec)
        .ok_or(GaussianBlurError::AllocationFailed {
            width: u32::try_from(taps).unwrap_or(u32::MAX),
            height: 1,
        })?;

    let two_sigma_squared = 2.0 * sigma * sigma;
    let radius = i64::from(radius);
    for (weight, offset) in kernel.iter_mut().zip(-radius..=radius) {
        let offset = offset as f64;
        *weight = (-(offset * offset) / two_sigma_squared).exp();
    }

    let sum: f64 = kernel.iter().sum();
    kernel.iter_mut().for_each(|weight| *weight /= sum);

    Ok(kernel)
}

/// Trait for blurring images with a separable Gaussian kernel.
///
/// Every channel, alpha included, is averaged independently as a raw value.
/// No alpha blending or premultiplication takes place, so partially
/// transparent pixels are not weighted twice.
pub trait GaussianBlurExt {
    /// Output type of the blur
    type Output;

    /// Blurs the image with a Gaussian kernel of the given radius.
    ///
    /// A horizontal pass writes into an `f32` intermediate buffer and a
    /// vertical pass produces the result. Samples beyond the border repeat
    /// the edge pixel. The source image is never modified.
    ///
    /// # Arguments
    ///
    /// * `radius` - Kernel radius in pixels, at least 1
    /// * `sigma` - Standard deviation; `None` selects `(2/3) * radius`
    ///
    /// # Errors
    ///
    /// * `GaussianBlurError::InvalidRadius` / `InvalidSigma` - bad parameters,
    ///   reported before any allocation
    /// * `GaussianBlurError::EmptyImage` - the image has a zero dimension
    /// * `GaussianBlurError::AllocationFailed` - the intermediate or output buffer
    ///   could not be allocated
    ///
    /// # Examples
    ///
    /// ```
    /// use image::Rgba;
    /// use imageops_smartcrop::{GaussianBlurExt, Image};
    ///
    /// let image: Image<Rgba<u8>> = Image::from_pixel(20, 20, Rgba([90, 120, 30, 255]));
    /// let blurred = image.gaussian_blur(2, None).unwrap();
    /// assert_eq!(blurred, image);
    /// ```
    fn gaussian_blur(&self, radius: u32, sigma: Option<f64>) -> Result<Self::Output, GaussianBlurError>;
}

impl<P> GaussianBlurExt for Image<P>
where
    P: Pixel<Subpixel = u8>,
{
    type Output = Self;

    fn gaussian_blur(&self, radius: u32, sigma: Option<f64>) -> Result<Self, GaussianBlurError> {
        let kernel = gaussian_coefficients(radius, sigma)?;

        let (width, height) = self.dimensions();
        if !is_non_empty(width, height) {
            return Err(GaussianBlurError::EmptyImage);
        }

        debug!(width, height, radius, ?sigma, "gaussian blur");

        let kernel: Vec<f32> = kernel.iter().map(|&weight| weight as f32).collect();
        let channels = usize::from(P::CHANNEL_COUNT);
        let allocation_failed = || GaussianBlurError::AllocationFailed { width, height };

        let mut intermediate: Vec<f32> =
            try_zeroed_vec(width as usize * height as usize * channels)
                .ok_or_else(allocation_failed)?;
        horizontal_pass(self, &mut intermediate, width as usize, channels, &kernel);

        let mut output: Self = try_new_image(width, height).ok_or_else(allocation_failed)?;
        vertical_pass(
            &intermediate,
            &mut output,
            width as usize,
            height as usize,
            channels,
            &kernel,
        );

        Ok(output)
    }
}

/// Convolves every row of `source` into `intermediate`, repeating edge samples.
fn horizontal_pass(
    source: &[u8],
    intermediate: &mut [f32],
    width: usize,
    channels: usize,
    kernel: &[f32],
) {
    let stride = width * channels;
    let radius = kernel.len() / 2;

    let convolve_row = |(source_row, row): (&[u8], &mut [f32])| {
        for x in 0..width {
            for channel in 0..channels {
                let mut sum = 0.0f32;
                for (offset, &weight) in kernel.iter().enumerate() {
                    let sx = (x + offset).saturating_sub(radius).min(width - 1);
                    sum += f32::from(source_row[sx * channels + channel]) * weight;
                }
                row[x * channels + channel] = sum;
            }
        }
    };

    #[cfg(feature = "rayon")]
    source
        .par_chunks_exact(stride)
        .zip(intermediate.par_chunks_exact_mut(stride))
        .for_each(convolve_row);

    #[cfg(not(feature = "rayon"))]
    source
        .chunks_exact(stride)
        .zip(intermediate.chunks_exact_mut(stride))
        .for_each(convolve_row);
}

/// Convolves every column of `intermediate` into `output`, repeating edge samples.
fn vertical_pass(
    intermediate: &[f32],
    output: &mut [u8],
    width: usize,
    height: usize,
    channels: usize,
    kernel: &[f32],
) {
    let stride = width * channels;
    let radius = kernel.len() / 2;

    let convolve_row = |(y, row): (usize, &mut [u8])| {
        for (index, value) in row.iter_mut().enumerate() {
            let mut sum = 0.0f32;
            for (offset, &weight) in kernel.iter().enumerate() {
                let sy = (y + offset).saturating_sub(radius).min(height - 1);
                sum += intermediate[sy * stride + index] * weight;
            }
            *value = round_to_u8(sum);
        }
    };

    #[cfg(feature = "rayon")]
    output
        .par_chunks_exact_mut(stride)
        .enumerate()
        .for_each(convolve_row);

    #[cfg(not(feature = "rayon"))]
    output
        .chunks_exact_mut(stride)
        .enumerate()
        .for_each(convolve_row);
}
