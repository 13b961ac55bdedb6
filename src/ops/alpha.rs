//! Conversion between the standard 8-bit alpha convention used by every
//! buffer in this crate and the inverted 7-bit convention of GD-style hosts.
//!
//! | convention | fully opaque | fully transparent |
//! |------------|--------------|-------------------|
//! | standard   | 255          | 0                 |
//! | inverted   | 0            | 127               |
//!
//! All algorithms work in the standard convention. Callers holding inverted
//! alpha convert once on the way in and once on the way out.

use image::Rgba;

use crate::Image;

/// Largest alpha value in the inverted convention (fully transparent).
pub const INVERTED_ALPHA_MAX: u8 = 127;

/// Converts an inverted 7-bit alpha (0 = opaque, 127 = transparent) to standard 8-bit alpha.
///
/// Values above 127 are treated as fully transparent. Both endpoints map exactly.
#[inline]
#[must_use]
pub const fn from_inverted_alpha(alpha: u8) -> u8 {
    let alpha = if alpha > INVERTED_ALPHA_MAX {
        INVERTED_ALPHA_MAX
    } else {
        alpha
    };
    let opacity = INVERTED_ALPHA_MAX - alpha;
    (opacity << 1) + (opacity >> 6)
}

/// Converts a standard 8-bit alpha to the inverted 7-bit convention.
#[inline]
#[must_use]
pub const fn to_inverted_alpha(alpha: u8) -> u8 {
    INVERTED_ALPHA_MAX - (alpha >> 1)
}

/// Boundary conversion for whole images.
pub trait InvertedAlphaExt {
    /// Rewrites every alpha channel from the inverted 7-bit convention to the standard one.
    fn import_inverted_alpha(&mut self) -> &mut Self;

    /// Rewrites every alpha channel from the standard convention to the inverted 7-bit one.
    fn export_inverted_alpha(&mut self) -> &mut Self;
}

impl InvertedAlphaExt for Image<Rgba<u8>> {
    fn import_inverted_alpha(&mut self) -> &mut Self {
        self.pixels_mut()
            .for_each(|pixel| pixel[3] = from_inverted_alpha(pixel[3]));
        self
    }

    fn export_inverted_alpha(&mut self) -> &mut Self {
        self.pixels_mut()
            .for_each(|pixel| pixel[3] = to_inverted_alpha(pixel[3]));
        self
    }
}
