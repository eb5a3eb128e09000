//! Circular buffer around a planar point.
//!
//! The buffer is kept analytic (center + radius) instead of being
//! approximated by a polygon, so membership is exact: a geometry
//! intersects the disk iff its Euclidean distance to the center is at
//! most the radius. Touching the rim counts as intersecting.

use geo::{Coord, Distance, Euclidean, MultiPolygon, Point, Rect};

/// All points within `radius` of `center`, boundary included. Planar units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Disk {
    center: Point<f64>,
    radius: f64,
}

impl Disk {
    /// Buffers `center` by `radius`.
    #[must_use]
    pub const fn around(center: Point<f64>, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Axis-aligned square enclosing the disk.
    #[must_use]
    pub fn bounding_rect(&self) -> Rect<f64> {
        let Coord { x, y } = self.center.0;
        Rect::new(
            Coord {
                x: x - self.radius,
                y: y - self.radius,
            },
            Coord {
                x: x + self.radius,
                y: y + self.radius,
            },
        )
    }

    /// Whether any part of `geometry` lies within the disk.
    ///
    /// The distance is zero when the center is inside `geometry`. An empty
    /// multipolygon is infinitely far away.
    #[must_use]
    pub fn intersects(&self, geometry: &MultiPolygon<f64>) -> bool {
        Euclidean.distance(geometry, &self.center) <= self.radius
    }
}
