use geo::Point;
use serde::{Deserialize, Serialize};

/// Shift applied to longitudes so that `[-180, 180]` maps to `[0, 360]`.
pub const LONGITUDE_OFFSET: f64 = 180.0;

/// Shift applied to latitudes so that `[-90, 90]` maps to `[0, 180]`.
pub const LATITUDE_OFFSET: f64 = 90.0;

/// Translate GPS coordinates into the non-negative absolute space.
///
/// Returns `(x, y)` where `x` is derived from the longitude and `y` from the latitude.
///
/// # Examples
///
/// ```
/// use geocache_types::point::gps_to_absolute;
///
/// assert_eq!(gps_to_absolute(-150.0, 23.9), (30.0, 113.9));
/// ```
#[inline]
pub fn gps_to_absolute(long: f64, lat: f64) -> (f64, f64) {
    (long + LONGITUDE_OFFSET, lat + LATITUDE_OFFSET)
}

/// Inverse of [`gps_to_absolute`]; returns `(long, lat)`.
#[inline]
pub fn absolute_to_gps(x: f64, y: f64) -> (f64, f64) {
    (x - LONGITUDE_OFFSET, y - LATITUDE_OFFSET)
}

/// A point stored in the spatial index.
///
/// Coordinates are already translated into absolute space. The `id` is an opaque
/// correlation key back to whatever owns the point; the index never checks it for
/// uniqueness.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexedPoint {
    /// Absolute-space position (x from longitude, y from latitude)
    pub point: Point<f64>,
    /// Correlation key
    pub id: u64,
}

impl IndexedPoint {
    /// Create a point from coordinates that are already absolute.
    pub fn new(x: f64, y: f64, id: u64) -> Self {
        Self {
            point: Point::new(x, y),
            id,
        }
    }

    /// Create a point from GPS longitude/latitude, translating into absolute space.
    ///
    /// # Examples
    ///
    /// ```
    /// use geocache_types::point::IndexedPoint;
    ///
    /// let p = IndexedPoint::from_gps(-150.0, 23.9, 1);
    /// assert_eq!(p.x(), 30.0);
    /// assert_eq!(p.y(), 113.9);
    /// ```
    pub fn from_gps(long: f64, lat: f64, id: u64) -> Self {
        let (x, y) = gps_to_absolute(long, lat);
        Self::new(x, y, id)
    }

    pub fn x(&self) -> f64 {
        self.point.x()
    }

    pub fn y(&self) -> f64 {
        self.point.y()
    }

    /// Position translated back into GPS `(long, lat)`.
    pub fn to_gps(&self) -> (f64, f64) {
        absolute_to_gps(self.x(), self.y())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gps_to_absolute() {
        let (x, y) = gps_to_absolute(-150.0, 23.9);
        assert_eq!(x, 30.0);
        assert_eq!(y, 113.9);
    }

    #[test]
    fn test_globe_corners() {
        assert_eq!(gps_to_absolute(-180.0, -90.0), (0.0, 0.0));
        assert_eq!(gps_to_absolute(180.0, 90.0), (360.0, 180.0));
    }

    #[test]
    fn test_absolute_round_trip() {
        let p = IndexedPoint::from_gps(-114.5, 53.25, 7);
        assert_eq!(p.to_gps(), (-114.5, 53.25));
        assert_eq!(p.id, 7);
    }
}
