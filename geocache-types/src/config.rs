use crate::quadrant::Quadrant;
use serde::{Deserialize, Serialize};

/// How `update` treats the secondary indices of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UpdatePolicy {
    /// Re-synchronize the tag index and the spatial position on every update.
    #[default]
    Reindex,
    /// Change the record in place only. Old tag memberships and the old spatial
    /// position stay in their indices.
    PreserveStale,
}

/// Region covered by a spatial index, in GPS degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GpsBounds {
    pub long_min: f64,
    pub lat_min: f64,
    pub long_max: f64,
    pub lat_max: f64,
}

impl GpsBounds {
    pub const fn new(long_min: f64, lat_min: f64, long_max: f64, lat_max: f64) -> Self {
        Self {
            long_min,
            lat_min,
            long_max,
            lat_max,
        }
    }

    /// The whole globe, `[-180, -90]` to `[180, 90]`.
    pub const fn globe() -> Self {
        Self::new(-180.0, -90.0, 180.0, 90.0)
    }

    pub fn is_finite(&self) -> bool {
        self.long_min.is_finite()
            && self.lat_min.is_finite()
            && self.long_max.is_finite()
            && self.lat_max.is_finite()
    }

    pub fn is_ordered(&self) -> bool {
        self.long_min <= self.long_max && self.lat_min <= self.lat_max
    }

    /// Absolute-space quadrant covering these bounds.
    pub fn to_quadrant(&self) -> Quadrant {
        Quadrant::from_gps(self.long_min, self.lat_min, self.long_max, self.lat_max)
    }
}

impl Default for GpsBounds {
    fn default() -> Self {
        Self::globe()
    }
}
