use image::Primitive;

/// Summed-area table over a row-major grid of values.
///
/// `sat(x, y)` holds the sum of every value in the rectangle from `(0, 0)` to
/// `(x, y)` inclusive, so any axis-aligned block sum costs four lookups.
#[derive(Debug, Clone, PartialEq)]
pub struct SummedAreaTable<T> {
    data: Vec<T>,
    width: u32,
    height: u32,
}

/// Position and sum of the best block found by [`SummedAreaTable::best_block`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockSum<T> {
    /// Column of the block's top-left cell
    pub x: u32,
    /// Row of the block's top-left cell
    pub y: u32,
    /// Sum over the block
    pub sum: T,
}

impl<T> SummedAreaTable<T>
where
    T: Primitive,
{
    /// Builds a summed-area table from row-major data.
    ///
    /// # Returns
    ///
    /// `None` if `data.len() != width * height`
    #[must_use]
    pub fn from_data(data: &[T], width: u32, height: u32) -> Option<Self> {
        if data.len() != width as usize * height as usize {
            return None;
        }

        let mut table = Vec::with_capacity(data.len());
        let stride = width as usize;

        for y in 0..height as usize {
            let mut row_sum = T::zero();
            for x in 0..stride {
                row_sum = row_sum + data[y * stride + x];
                // sat(x, y) = row prefix + sat(x, y - 1)
                let above = if y > 0 {
                    table[(y - 1) * stride + x]
                } else {
                    T::zero()
                };
                table.push(row_sum + above);
            }
        }

        Some(Self {
            data: table,
            width,
            height,
        })
    }

    /// Table value at `(x, y)`, or zero outside the table.
    #[must_use]
    pub fn get(&self, x: i64, y: i64) -> T {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            T::zero()
        } else {
            self.data[y as usize * self.width as usize + x as usize]
        }
    }

    /// Sum of the block with top-left `(x, y)` and the given size.
    ///
    /// The block is clipped to the table; an empty block sums to zero.
    #[must_use]
    pub fn block_sum(&self, x: u32, y: u32, width: u32, height: u32) -> T {
        if width == 0 || height == 0 {
            return T::zero();
        }
        let x1 = i64::from(x);
        let y1 = i64::from(y);
        let x2 = (x1 + i64::from(width) - 1).min(i64::from(self.width) - 1);
        let y2 = (y1 + i64::from(height) - 1).min(i64::from(self.height) - 1);
        if x1 > x2 || y1 > y2 {
            return T::zero();
        }

        // sum = sat(x2, y2) - sat(x1-1, y2) - sat(x2, y1-1) + sat(x1-1, y1-1)
        self.get(x2, y2) + self.get(x1 - 1, y1 - 1) - self.get(x1 - 1, y2) - self.get(x2, y1 - 1)
    }

    /// Finds the `width x height` block with the largest sum.
    ///
    /// Blocks are scanned in row-major order of their top-left cell and a
    /// later block only wins when its sum exceeds the current best by more
    /// than `tolerance`, so ties go to the first block found.
    ///
    /// # Returns
    ///
    /// `None` if the block is empty or larger than the table
    #[must_use]
    pub fn best_block(&self, width: u32, height: u32, tolerance: T) -> Option<BlockSum<T>> {
        if width == 0 || height == 0 || width > self.width || height > self.height {
            return None;
        }

        let mut best: Option<BlockSum<T>> = None;
        for y in 0..=self.height - height {
            for x in 0..=self.width - width {
                let sum = self.block_sum(x, y, width, height);
                let better = match best {
                    Some(current) => sum > current.sum + tolerance,
                    None => true,
                };
                if better {
                    best = Some(BlockSum { x, y, sum });
                }
            }
        }
        best
    }

    /// Number of columns
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Raw table data in row-major order
    #[must_use]
    pub fn data(&self) -> &[T] {
        &self.data
    }
}
