use crate::errors::ParticleNetError;

/// A 2D point. Immutable value type with no identity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: Point2) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// One of the four axis-aligned quarter-regions of a rectangle, split at
/// its midpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quadrant {
    Nw = 0,
    Ne = 1,
    Sw = 2,
    Se = 3,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [Quadrant::Nw, Quadrant::Ne, Quadrant::Sw, Quadrant::Se];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// An axis-aligned rectangle with a left/top origin.
///
/// Rectangles are created once per tree (or per rebuild) and never mutated.
/// All boundary predicates are inclusive: a point lying exactly on an edge
/// is contained, and two rectangles whose edges exactly touch intersect.
///
/// # Examples
///
/// ```
/// use particle_net::geometry::Rect;
///
/// let rect = Rect::new(0.0, 0.0, 100.0, 50.0).unwrap();
/// assert!(rect.contains(100.0, 50.0)); // edges are inclusive
/// assert!(!rect.contains(100.1, 50.0));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Creates a rectangle, validating that both extents are non-negative.
    ///
    /// # Errors
    /// Returns an error if `width` or `height` is negative or non-finite.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Result<Self, ParticleNetError> {
        if !(width >= 0.0 && height >= 0.0) || !width.is_finite() || !height.is_finite() {
            return Err(ParticleNetError::InvalidBounds);
        }
        Ok(Self { x, y, width, height })
    }

    /// Creates a rectangle from min/max corner coordinates.
    ///
    /// # Errors
    /// Returns an error if `max_x < min_x` or `max_y < min_y`.
    pub fn from_bounds(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<Self, ParticleNetError> {
        Self::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// Returns true if the point (px, py) lies inside this rectangle.
    /// All four edges are inclusive.
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }

    /// Returns true if this rectangle and `other` overlap.
    ///
    /// Exactly touching edges count as intersecting, matching the inclusive
    /// convention of [`Rect::contains`].
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x <= other.right()
            && self.right() >= other.x
            && self.y <= other.bottom()
            && self.bottom() >= other.y
    }

    /// Returns true if this rectangle and the circle centered at (cx, cy)
    /// with radius `r` overlap.
    ///
    /// Clamps the circle center to the rectangle to find the closest point,
    /// then compares squared distances so no square root is taken.
    pub fn intersects_circle(&self, cx: f64, cy: f64, r: f64) -> bool {
        let closest_x = cx.clamp(self.x, self.right());
        let closest_y = cy.clamp(self.y, self.bottom());
        let dx = cx - closest_x;
        let dy = cy - closest_y;
        dx * dx + dy * dy <= r * r
    }

    /// Classifies a point into one of the four quadrants of this rectangle.
    /// Ties go to the lower/left quadrant: a point exactly on the midline
    /// resolves west, and exactly on the horizontal midline resolves north.
    pub fn quadrant_of(&self, px: f64, py: f64) -> Quadrant {
        let west = px <= self.center_x();
        let north = py <= self.center_y();
        match (north, west) {
            (true, true) => Quadrant::Nw,
            (true, false) => Quadrant::Ne,
            (false, true) => Quadrant::Sw,
            (false, false) => Quadrant::Se,
        }
    }

    /// Returns the quartered boundary for one quadrant of this rectangle.
    pub fn child_rect(&self, quadrant: Quadrant) -> Rect {
        let hw = self.width / 2.0;
        let hh = self.height / 2.0;
        match quadrant {
            Quadrant::Nw => Rect { x: self.x, y: self.y, width: hw, height: hh },
            Quadrant::Ne => Rect { x: self.x + hw, y: self.y, width: hw, height: hh },
            Quadrant::Sw => Rect { x: self.x, y: self.y + hh, width: hw, height: hh },
            Quadrant::Se => Rect { x: self.x + hw, y: self.y + hh, width: hw, height: hh },
        }
    }
}
