//! Rectangles with tracked corners, used to describe crop regions.
//!
//! A [`PositionedRectangle`] keeps its four corners in a fixed order
//! (top-left, top-right, bottom-right, bottom-left of the unrotated shape)
//! plus a basepoint. Rotation happens about the origin; afterwards the
//! rectangle is shifted so its bounding box starts at the origin again and
//! the applied shift is recorded as the rotation offset.

/// A point in image coordinates (x grows right, y grows down).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn translated(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Rotates about the origin, clockwise on screen for positive angles.
    fn rotated(self, sin: f64, cos: f64) -> Self {
        Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }
}

/// Corner of a [`PositionedRectangle`], named after its unrotated position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    /// All corners, in storage order.
    pub const ALL: [Self; 4] = [
        Self::TopLeft,
        Self::TopRight,
        Self::BottomRight,
        Self::BottomLeft,
    ];

    const fn index(self) -> usize {
        match self {
            Self::TopLeft => 0,
            Self::TopRight => 1,
            Self::BottomRight => 2,
            Self::BottomLeft => 3,
        }
    }
}

/// A rectangle that can be translated and rotated while keeping its corner order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionedRectangle {
    width: u32,
    height: u32,
    corners: [Point; 4],
    basepoint: Point,
    rotation_offset: Point,
    angle: f64,
}

impl PositionedRectangle {
    /// Creates an unrotated `width x height` rectangle with its top-left
    /// corner and basepoint at the origin.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let (w, h) = (f64::from(width), f64::from(height));
        Self {
            width,
            height,
            corners: [
                Point::new(0.0, 0.0),
                Point::new(w, 0.0),
                Point::new(w, h),
                Point::new(0.0, h),
            ],
            basepoint: Point::default(),
            rotation_offset: Point::default(),
            angle: 0.0,
        }
    }

    /// Creates an unrotated rectangle whose top-left corner is at `(x, y)`.
    #[must_use]
    pub fn from_region(x: u32, y: u32, width: u32, height: u32) -> Self {
        let mut rectangle = Self::new(width, height);
        rectangle.translate(f64::from(x), f64::from(y));
        rectangle
    }

    /// Moves every corner and the basepoint by `(dx, dy)`.
    pub fn translate(&mut self, dx: f64, dy: f64) -> &mut Self {
        for corner in &mut self.corners {
            *corner = corner.translated(dx, dy);
        }
        self.basepoint = self.basepoint.translated(dx, dy);
        self
    }

    /// Rotates the rectangle about the origin by `degrees` (clockwise on screen).
    ///
    /// After rotating, the rectangle is shifted so its bounding box starts at
    /// the origin; that shift is available from [`Self::rotation_offset`].
    pub fn rotate(&mut self, degrees: f64) -> &mut Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        for corner in &mut self.corners {
            *corner = corner.rotated(sin, cos);
        }
        self.basepoint = self.basepoint.rotated(sin, cos);
        self.angle = (self.angle + degrees) % 360.0;

        let (min, _) = self.bounding_box();
        self.rotation_offset = Point::new(-min.x, -min.y);
        self.translate(-min.x, -min.y)
    }

    /// Position of a corner.
    #[must_use]
    pub const fn corner(&self, corner: Corner) -> Point {
        self.corners[corner.index()]
    }

    /// All corners in `TopLeft, TopRight, BottomRight, BottomLeft` order.
    #[must_use]
    pub const fn corners(&self) -> [Point; 4] {
        self.corners
    }

    #[must_use]
    pub const fn basepoint(&self) -> Point {
        self.basepoint
    }

    /// Sets the reference point used to place the rectangle.
    pub fn set_basepoint(&mut self, basepoint: Point) -> &mut Self {
        self.basepoint = basepoint;
        self
    }

    /// Shift applied by the last [`Self::rotate`] to bring the bounding box back to the origin.
    #[must_use]
    pub const fn rotation_offset(&self) -> Point {
        self.rotation_offset
    }

    /// Accumulated rotation in degrees.
    #[must_use]
    pub const fn angle(&self) -> f64 {
        self.angle
    }

    /// Unrotated width.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Unrotated height.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Smallest and largest corner coordinates.
    #[must_use]
    pub fn bounding_box(&self) -> (Point, Point) {
        self.corners.iter().fold(
            (
                Point::new(f64::INFINITY, f64::INFINITY),
                Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
            ),
            |(min, max), corner| {
                (
                    Point::new(min.x.min(corner.x), min.y.min(corner.y)),
                    Point::new(max.x.max(corner.x), max.y.max(corner.y)),
                )
            },
        )
    }

    #[must_use]
    pub fn bounding_width(&self) -> f64 {
        let (min, max) = self.bounding_box();
        max.x - min.x
    }

    #[must_use]
    pub fn bounding_height(&self) -> f64 {
        let (min, max) = self.bounding_box();
        max.y - min.y
    }

    /// Integer `(x, y, width, height)` of the bounding box, rounded and
    /// clamped at zero. For unrotated crop regions this is exact.
    #[must_use]
    pub fn region(&self) -> (u32, u32, u32, u32) {
        let (min, max) = self.bounding_box();
        let to_u32 = |value: f64| value.round().clamp(0.0, f64::from(u32::MAX)) as u32;
        let (x, y) = (to_u32(min.x), to_u32(min.y));
        (x, y, to_u32(max.x).saturating_sub(x), to_u32(max.y).saturating_sub(y))
    }

    /// Whether the bounding box lies inside `[0, width] x [0, height]`.
    #[must_use]
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        let (min, max) = self.bounding_box();
        min.x >= 0.0 && min.y >= 0.0 && max.x <= f64::from(width) && max.y <= f64::from(height)
    }
}
