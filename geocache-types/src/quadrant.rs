use crate::point::{IndexedPoint, gps_to_absolute};
use geo::Rect;
use serde::{Deserialize, Serialize};

/// Position of a child cell relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl Direction {
    /// Trial order used for both insertion and lookup. A point on a shared edge
    /// belongs to the first cell in this order that contains it.
    pub const ALL: [Direction; 4] = [
        Direction::NorthWest,
        Direction::NorthEast,
        Direction::SouthWest,
        Direction::SouthEast,
    ];

    /// Index of this direction within [`Direction::ALL`].
    pub const fn index(self) -> usize {
        match self {
            Direction::NorthWest => 0,
            Direction::NorthEast => 1,
            Direction::SouthWest => 2,
            Direction::SouthEast => 3,
        }
    }
}

/// An axis-aligned rectangular region with inclusive bounds on all four edges.
///
/// Adjacent quadrants share their edges, so membership is not disjoint; callers
/// resolve ties by trial order (see [`Direction::ALL`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quadrant {
    /// The underlying geometric rectangle
    pub rect: Rect,
}

impl Quadrant {
    /// Create a quadrant from absolute-space bounds.
    ///
    /// Swapped corners are normalized so that `min <= max` on both axes.
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self {
            rect: Rect::new(
                geo::coord! { x: x_min, y: y_min },
                geo::coord! { x: x_max, y: y_max },
            ),
        }
    }

    /// Create a quadrant from GPS bounds (longitude for x, latitude for y).
    ///
    /// # Examples
    ///
    /// ```
    /// use geocache_types::quadrant::Quadrant;
    ///
    /// let globe = Quadrant::from_gps(-180.0, -90.0, 180.0, 90.0);
    /// assert_eq!(globe.x_max(), 360.0);
    /// assert_eq!(globe.y_max(), 180.0);
    /// ```
    pub fn from_gps(long_min: f64, lat_min: f64, long_max: f64, lat_max: f64) -> Self {
        let (x_min, y_min) = gps_to_absolute(long_min, lat_min);
        let (x_max, y_max) = gps_to_absolute(long_max, lat_max);
        Self::new(x_min, y_min, x_max, y_max)
    }

    pub fn x_min(&self) -> f64 {
        self.rect.min().x
    }

    pub fn y_min(&self) -> f64 {
        self.rect.min().y
    }

    pub fn x_max(&self) -> f64 {
        self.rect.max().x
    }

    pub fn y_max(&self) -> f64 {
        self.rect.max().y
    }

    pub fn width(&self) -> f64 {
        self.x_max() - self.x_min()
    }

    pub fn height(&self) -> f64 {
        self.y_max() - self.y_min()
    }

    /// Midpoint on both axes, `(x, y)`.
    pub fn midpoint(&self) -> (f64, f64) {
        (
            self.x_min() + self.width() / 2.0,
            self.y_min() + self.height() / 2.0,
        )
    }

    /// Inclusive containment test. NaN coordinates are never contained.
    #[inline]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x_min() && x <= self.x_max() && y >= self.y_min() && y <= self.y_max()
    }

    #[inline]
    pub fn contains_point(&self, point: &IndexedPoint) -> bool {
        self.contains(point.x(), point.y())
    }

    /// The cell of this quadrant lying in `direction` after splitting at the midpoint.
    pub fn child(&self, direction: Direction) -> Quadrant {
        let (x_mid, y_mid) = self.midpoint();
        match direction {
            Direction::NorthWest => Quadrant::new(self.x_min(), y_mid, x_mid, self.y_max()),
            Direction::NorthEast => Quadrant::new(x_mid, y_mid, self.x_max(), self.y_max()),
            Direction::SouthWest => Quadrant::new(self.x_min(), self.y_min(), x_mid, y_mid),
            Direction::SouthEast => Quadrant::new(x_mid, self.y_min(), self.x_max(), y_mid),
        }
    }

    /// All four cells, in [`Direction::ALL`] order.
    pub fn subdivide(&self) -> [Quadrant; 4] {
        Direction::ALL.map(|d| self.child(d))
    }
}
