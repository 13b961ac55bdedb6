use image::Rgba;
use itertools::iproduct;
use tracing::{debug, trace, warn};

use crate::error::SmartCropError;
use crate::ops::color::parse_rgba_hex;
use crate::ops::entropy::{EntropyExt, EntropyHistogram};
use crate::ops::geometry::PositionedRectangle;
use crate::ops::simulation::{SimulationOverlay, DEFAULT_SIMULATION_COLORS};
use crate::ops::slicing_crop::validate_target;
use crate::ops::summed_area_table::SummedAreaTable;
use crate::utils::try_new_image;
use crate::Image;

/// Block sums read from the summed-area table carry rounding noise; a later
/// block must beat the best by more than this to count as better.
const TIE_TOLERANCE: f64 = 1e-9;

/// Parameters for [`crop_by_gridding`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GridCropParams {
    /// Largest working-grid width; windows are downsampled to fit
    pub grid_max_width: u32,
    /// Largest working-grid height
    pub grid_max_height: u32,
    /// Rows of cells the working grid is split into
    pub grid_rows: u32,
    /// Columns of cells the working grid is split into
    pub grid_cols: u32,
    /// Rows of the cell block the search descends into
    pub sub_rows: u32,
    /// Columns of the cell block the search descends into
    pub sub_cols: u32,
    /// Draw the search on an overlay instead of cropping
    pub simulate: bool,
    /// RGBA marker colors, cycled by nesting depth
    pub simulation_colors: [[u8; 4]; 3],
    /// Histogram measure used to score cells
    pub histogram: EntropyHistogram,
}

impl Default for GridCropParams {
    fn default() -> Self {
        Self {
            grid_max_width: 200,
            grid_max_height: 200,
            grid_rows: 5,
            grid_cols: 5,
            sub_rows: 3,
            sub_cols: 3,
            simulate: false,
            simulation_colors: DEFAULT_SIMULATION_COLORS,
            histogram: EntropyHistogram::Luminance,
        }
    }
}

impl GridCropParams {
    /// Replaces the marker colors with hex strings (`#RRGGBB` or `#RRGGBBAA`).
    ///
    /// # Errors
    ///
    /// * `SmartCropError::InvalidParameter` - a color is malformed
    pub fn with_simulation_colors(mut self, colors: [&str; 3]) -> Result<Self, SmartCropError> {
        for (slot, color) in self.simulation_colors.iter_mut().zip(colors) {
            *slot = parse_rgba_hex(color)?.0;
        }
        Ok(self)
    }

    /// Checks the parameters without touching any image.
    ///
    /// # Errors
    ///
    /// * `SmartCropError::InvalidParameter` - a size is zero, the block is
    ///   larger than the grid, or the block covers the whole grid
    pub fn validate(&self) -> Result<(), SmartCropError> {
        let invalid = |message: String| Err(SmartCropError::InvalidParameter(message));

        if self.grid_max_width == 0 || self.grid_max_height == 0 {
            return invalid(format!(
                "grid max size must be at least 1x1, got {}x{}",
                self.grid_max_width, self.grid_max_height
            ));
        }
        if self.grid_rows == 0 || self.grid_cols == 0 {
            return invalid(format!(
                "grid must have at least 1x1 cells, got {}x{}",
                self.grid_rows, self.grid_cols
            ));
        }
        if !(1..=self.grid_rows).contains(&self.sub_rows)
            || !(1..=self.grid_cols).contains(&self.sub_cols)
        {
            return invalid(format!(
                "sub-grid {}x{} must be between 1x1 and the grid {}x{}",
                self.sub_rows, self.sub_cols, self.grid_rows, self.grid_cols
            ));
        }
        if self.sub_rows == self.grid_rows && self.sub_cols == self.grid_cols {
            return invalid("sub-grid must be smaller than the grid".to_owned());
        }
        Ok(())
    }
}

/// Why the grid search stopped descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridTermination {
    /// The window fits inside the target size
    TargetReached,
    /// The working grid became smaller than the cell grid
    GridDegenerate,
}

/// Result of [`crop_by_gridding`].
#[derive(Debug, Clone)]
pub struct GridCropOutcome {
    /// Target-sized region centered on the final window, inside the image
    pub region: PositionedRectangle,
    /// Marker canvas, present when `simulate` was requested
    pub overlay: Option<Image<Rgba<u8>>>,
    /// Number of times the window was narrowed
    pub iterations: u32,
    /// Why the search stopped
    pub termination: GridTermination,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Window {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

impl Window {
    fn fits(&self, width: u32, height: u32) -> bool {
        self.width <= width && self.height <= height
    }

    fn centroid(&self) -> (f64, f64) {
        (
            f64::from(self.x) + f64::from(self.width) / 2.0,
            f64::from(self.y) + f64::from(self.height) / 2.0,
        )
    }
}

enum Step {
    Narrowed(Window),
    Done(GridTermination),
}

/// Finds a crop region by recursively descending into the busiest part of a grid.
///
/// Starting from the whole image, each step downsamples the current window
/// to at most `grid_max_width x grid_max_height` (keeping its aspect ratio),
/// splits it into `grid_rows x grid_cols` cells, scores every cell by
/// entropy and moves the window onto the `sub_rows x sub_cols` block of cells
/// with the largest total; ties go to the first block in row-major order.
/// The search stops once the window fits the target, or early if the working
/// grid gets smaller than the cell grid. The result is a target-sized region
/// centered on the last window and shifted back inside the image.
///
/// With `simulate` set, the grid points and chosen blocks of every step are
/// drawn onto [`GridCropOutcome::overlay`]; region selection is unaffected.
///
/// # Errors
///
/// * `SmartCropError::InvalidParameter` - bad target size or grid parameters
/// * `SmartCropError::EmptyImage` - the image has a zero dimension
/// * `SmartCropError::AllocationFailed` - a working grid or the overlay could
///   not be allocated; nothing partially built is returned
///
/// # Examples
///
/// ```
/// use image::Rgba;
/// use imageops_smartcrop::{crop_by_gridding, GridCropParams, Image};
///
/// let image: Image<Rgba<u8>> = Image::from_pixel(300, 200, Rgba([10, 10, 10, 255]));
/// let outcome = crop_by_gridding(&image, 100, 100, &GridCropParams::default()).unwrap();
/// let (_, _, width, height) = outcome.region.region();
/// assert_eq!((width, height), (100, 100));
/// ```
pub fn crop_by_gridding(
    image: &Image<Rgba<u8>>,
    target_width: u32,
    target_height: u32,
    params: &GridCropParams,
) -> Result<GridCropOutcome, SmartCropError> {
    validate_target(target_width, target_height)?;
    params.validate()?;

    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(SmartCropError::EmptyImage);
    }

    let mut overlay = if params.simulate {
        Some(SimulationOverlay::new(
            width,
            height,
            params.simulation_colors,
        )?)
    } else {
        None
    };

    let mut window = Window {
        x: 0,
        y: 0,
        width,
        height,
    };
    let mut iterations = 0;
    let termination = loop {
        match search_step(
            image,
            window,
            (target_width, target_height),
            params,
            overlay.as_mut(),
            iterations,
        )? {
            Step::Narrowed(next) => {
                window = next;
                iterations += 1;
            }
            Step::Done(termination) => break termination,
        }
    };

    let region = centered_region(
        window,
        target_width.min(width),
        target_height.min(height),
        (width, height),
    );
    let (x, y, region_width, region_height) = region.region();

    if let Some(overlay) = overlay.as_mut() {
        overlay.mark_region(iterations, x, y, region_width, region_height);
    }

    debug!(
        x,
        y,
        width = region_width,
        height = region_height,
        iterations,
        ?termination,
        "grid crop region"
    );

    Ok(GridCropOutcome {
        region,
        overlay: overlay.map(SimulationOverlay::into_image),
        iterations,
        termination,
    })
}

/// One descent: either narrows the window or reports why the search is over.
fn search_step(
    image: &Image<Rgba<u8>>,
    window: Window,
    (target_width, target_height): (u32, u32),
    params: &GridCropParams,
    overlay: Option<&mut SimulationOverlay>,
    depth: u32,
) -> Result<Step, SmartCropError> {
    if window.fits(target_width, target_height) {
        return Ok(Step::Done(GridTermination::TargetReached));
    }

    let (work_width, work_height) = working_size(
        window.width,
        window.height,
        params.grid_max_width,
        params.grid_max_height,
    );
    if work_width < params.grid_cols || work_height < params.grid_rows {
        warn!(
            work_width,
            work_height,
            grid_rows = params.grid_rows,
            grid_cols = params.grid_cols,
            "working grid smaller than cell grid, stopping early"
        );
        return Ok(Step::Done(GridTermination::GridDegenerate));
    }

    // Window-relative source offset of every working pixel edge
    let source_x = partition(window.width, work_width);
    let source_y = partition(window.height, work_height);
    let working = resample(image, window, &source_x, &source_y)?;

    // Working-grid offset of every cell edge
    let cell_x = partition(work_width, params.grid_cols);
    let cell_y = partition(work_height, params.grid_rows);

    let mut entropies = Vec::with_capacity(params.grid_rows as usize * params.grid_cols as usize);
    for (row, col) in iproduct!(0..params.grid_rows as usize, 0..params.grid_cols as usize) {
        let entropy = working.entropy_with(
            cell_x[col],
            cell_y[row],
            cell_x[col + 1] - cell_x[col],
            cell_y[row + 1] - cell_y[row],
            params.histogram,
        )?;
        trace!(depth, row, col, entropy, "cell entropy");
        entropies.push(entropy);
    }

    let best = SummedAreaTable::from_data(&entropies, params.grid_cols, params.grid_rows)
        .and_then(|table| table.best_block(params.sub_cols, params.sub_rows, TIE_TOLERANCE))
        .ok_or_else(|| {
            SmartCropError::InvalidParameter("sub-grid does not fit the grid".to_owned())
        })?;

    let (first_col, last_col) = (best.x as usize, (best.x + params.sub_cols) as usize);
    let (first_row, last_row) = (best.y as usize, (best.y + params.sub_rows) as usize);
    let left = source_x[cell_x[first_col] as usize];
    let right = source_x[cell_x[last_col] as usize];
    let top = source_y[cell_y[first_row] as usize];
    let bottom = source_y[cell_y[last_row] as usize];

    let next = Window {
        x: window.x + left,
        y: window.y + top,
        width: right - left,
        height: bottom - top,
    };

    debug!(
        depth,
        block_col = best.x,
        block_row = best.y,
        block_entropy = best.sum,
        x = next.x,
        y = next.y,
        width = next.width,
        height = next.height,
        "grid crop narrowed window"
    );

    if let Some(overlay) = overlay {
        let columns: Vec<u32> = cell_x
            .iter()
            .map(|&edge| window.x + source_x[edge as usize])
            .collect();
        let rows: Vec<u32> = cell_y
            .iter()
            .map(|&edge| window.y + source_y[edge as usize])
            .collect();
        overlay.mark_grid_points(depth, &columns, &rows);
        overlay.mark_region(depth, next.x, next.y, next.width, next.height);
    }

    Ok(Step::Narrowed(next))
}

/// Size of the working grid for a window, shrunk to fit the limits with the
/// aspect ratio kept. Windows that already fit are not resampled.
fn working_size(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width <= max_width && height <= max_height {
        return (width, height);
    }
    let scale = (f64::from(max_width) / f64::from(width))
        .min(f64::from(max_height) / f64::from(height));
    let shrink = |length: u32| ((f64::from(length) * scale).floor() as u32).max(1);
    (shrink(width), shrink(height))
}

/// Splits `length` into `parts` nearly equal spans, returning the `parts + 1` edges.
fn partition(length: u32, parts: u32) -> Vec<u32> {
    (0..=u64::from(parts))
        .map(|i| (i * u64::from(length) / u64::from(parts)) as u32)
        .collect()
}

/// Area-averages the window down to one working pixel per source span.
fn resample(
    image: &Image<Rgba<u8>>,
    window: Window,
    source_x: &[u32],
    source_y: &[u32],
) -> Result<Image<Rgba<u8>>, SmartCropError> {
    let work_width = (source_x.len() - 1) as u32;
    let work_height = (source_y.len() - 1) as u32;
    let mut working: Image<Rgba<u8>> =
        try_new_image(work_width, work_height).ok_or(SmartCropError::AllocationFailed {
            width: work_width,
            height: work_height,
        })?;

    for (wy, rows) in source_y.windows(2).enumerate() {
        for (wx, cols) in source_x.windows(2).enumerate() {
            let mut sum = [0u64; 4];
            for (sy, sx) in iproduct!(rows[0]..rows[1], cols[0]..cols[1]) {
                let pixel = image.get_pixel(window.x + sx, window.y + sy);
                for (total, &channel) in sum.iter_mut().zip(pixel.0.iter()) {
                    *total += u64::from(channel);
                }
            }
            let area = u64::from(rows[1] - rows[0]) * u64::from(cols[1] - cols[0]);
            let average = sum.map(|total| ((total + area / 2) / area) as u8);
            working.put_pixel(wx as u32, wy as u32, Rgba(average));
        }
    }

    Ok(working)
}

/// A `width x height` region centered on the window, shifted to stay inside `bounds`.
fn centered_region(
    window: Window,
    width: u32,
    height: u32,
    bounds: (u32, u32),
) -> PositionedRectangle {
    let (center_x, center_y) = window.centroid();
    let place = |center: f64, length: u32, limit: u32| {
        let start = (center - f64::from(length) / 2.0).round();
        start.clamp(0.0, f64::from(limit - length)) as u32
    };
    PositionedRectangle::from_region(
        place(center_x, width, bounds.0),
        place(center_y, height, bounds.1),
        width,
        height,
    )
}
