use thiserror::Error;

/// Error type for Gaussian coefficient generation and blurring
///
/// Parameter errors are detected before any buffer is allocated or read.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GaussianBlurError {
    /// The kernel radius must be at least one pixel
    #[error("Gaussian radius must be >= 1, got {0}")]
    InvalidRadius(u32),

    /// The standard deviation must be finite and strictly positive
    #[error("Gaussian sigma must be finite and > 0, got {0}")]
    InvalidSigma(f64),

    /// The source image has a zero dimension
    #[error("Cannot blur an empty image")]
    EmptyImage,

    /// An intermediate or result buffer could not be allocated
    ///
    /// The caller's image is never modified when this error is returned.
    #[error("Failed to allocate a {width}x{height} blur buffer")]
    AllocationFailed { width: u32, height: u32 },
}

/// Error type for entropy measurements
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntropyError {
    /// The requested window is not fully inside the image
    ///
    /// Windows are never clamped; the caller owns bounds checking.
    #[error("Window {x},{y} {width}x{height} exceeds image bounds {image_width}x{image_height}")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        image_width: u32,
        image_height: u32,
    },
}

/// Error type for smart crop searches
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SmartCropError {
    /// A crop parameter is out of its valid range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The source image has a zero dimension
    #[error("Cannot crop an empty image")]
    EmptyImage,

    /// A working-grid or overlay buffer could not be allocated
    #[error("Failed to allocate a {width}x{height} working buffer")]
    AllocationFailed { width: u32, height: u32 },

    /// An entropy window fell outside the image
    #[error(transparent)]
    Entropy(#[from] EntropyError),

    /// Compositing the simulation overlay failed
    #[error(transparent)]
    Composite(#[from] CompositeError),
}

/// Error type for alpha-aware compositing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositeError {
    /// A compositing parameter is out of its valid range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The source or destination region is not inside its image
    #[error("Region {x},{y} {width}x{height} exceeds {image} bounds {image_width}x{image_height}")]
    OutOfBounds {
        /// Which image the region belongs to ("source" or "destination")
        image: &'static str,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        image_width: u32,
        image_height: u32,
    },

    /// The scratch buffer could not be allocated
    ///
    /// The destination image is left untouched.
    #[error("Failed to allocate a {width}x{height} scratch buffer")]
    AllocationFailed { width: u32, height: u32 },
}

/// Error type for hex color parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    /// The color is not 6 or 8 hex digits (after an optional `#`)
    #[error("Color {0:?} must have 6 or 8 hex digits")]
    InvalidLength(String),

    /// The color contains a non-hex character
    #[error("Color {0:?} contains a non-hex digit")]
    InvalidDigit(String),
}

impl From<ColorParseError> for SmartCropError {
    fn from(error: ColorParseError) -> Self {
        Self::InvalidParameter(error.to_string())
    }
}
