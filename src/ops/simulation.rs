//! Debug overlay for the grid crop search.
//!
//! The overlay is a transparent canvas the size of the source image. Each
//! search step marks its grid intersections and the block it descended
//! into, colored by nesting depth. The finished canvas is composited over
//! the source at [`SIMULATION_OPACITY`] percent.

use image::Rgba;
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use crate::error::SmartCropError;
use crate::utils::try_new_image;
use crate::Image;

/// Opacity, in percent, used when compositing the overlay onto the source.
pub const SIMULATION_OPACITY: u8 = 70;

/// Default marker colors, one per nesting depth modulo 3.
pub const DEFAULT_SIMULATION_COLORS: [[u8; 4]; 3] = [
    [255, 0, 0, 200],
    [0, 255, 0, 200],
    [0, 0, 255, 200],
];

const GRID_POINT_RADIUS: i32 = 1;

/// Marker canvas accumulated across the steps of one grid search.
#[derive(Debug, Clone)]
pub struct SimulationOverlay {
    canvas: Image<Rgba<u8>>,
    colors: [Rgba<u8>; 3],
}

impl SimulationOverlay {
    /// Allocates a fully transparent canvas.
    ///
    /// # Errors
    ///
    /// * `SmartCropError::AllocationFailed` - the canvas could not be allocated
    pub fn new(width: u32, height: u32, colors: [[u8; 4]; 3]) -> Result<Self, SmartCropError> {
        let canvas = try_new_image(width, height)
            .ok_or(SmartCropError::AllocationFailed { width, height })?;
        Ok(Self {
            canvas,
            colors: colors.map(Rgba),
        })
    }

    /// Marker color for a nesting depth.
    #[must_use]
    pub fn color(&self, depth: u32) -> Rgba<u8> {
        self.colors[depth as usize % self.colors.len()]
    }

    /// Marks every intersection of the given grid lines.
    pub fn mark_grid_points(&mut self, depth: u32, columns: &[u32], rows: &[u32]) {
        let color = self.color(depth);
        for &y in rows {
            for &x in columns {
                draw_filled_circle_mut(
                    &mut self.canvas,
                    (saturating_i32(x), saturating_i32(y)),
                    GRID_POINT_RADIUS,
                    color,
                );
            }
        }
    }

    /// Outlines a rectangle. Empty rectangles are skipped.
    pub fn mark_region(&mut self, depth: u32, x: u32, y: u32, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        let color = self.color(depth);
        let rect = Rect::at(saturating_i32(x), saturating_i32(y)).of_size(width, height);
        draw_hollow_rect_mut(&mut self.canvas, rect, color);
    }

    /// The accumulated canvas.
    #[must_use]
    pub fn into_image(self) -> Image<Rgba<u8>> {
        self.canvas
    }
}

fn saturating_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
