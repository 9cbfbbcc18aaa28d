//! Planar neighborhood coordinates.
//!
//! Neighborhood locations are projected (e.g. UTM) easting/northing pairs in
//! metres, so plain Euclidean distance is the right metric.  Only distances
//! between neighborhoods are ever needed.

/// A projected coordinate in metres.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coords {
    pub x: f64,
    pub y: f64,
}

impl Coords {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn distance_m(self, other: Coords) -> f64 {
        self.distance_sq(other).sqrt()
    }

    /// Squared distance; cheaper when only ordering matters.
    #[inline]
    pub fn distance_sq(self, other: Coords) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }
}

impl std::fmt::Display for Coords {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}
