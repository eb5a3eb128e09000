//! Distance-from-point filtering in a planar CRS.
//!
//! The query point and the candidate parcels are both reprojected into a
//! projected CRS (UTM 16N unless configured otherwise), the point is
//! buffered by the radius in metres, and every parcel touching that buffer
//! is kept. Survivors are reprojected back to WGS84 before being returned,
//! so callers never see planar coordinates.

use geo::{BoundingRect, Coord, Point};
use parcel_map_parcel_models::{Crs, Dataset, ProximityQuery};
use rstar::{AABB, RTree, RTreeObject};
use serde::{Deserialize, Serialize};

use crate::SpatialError;
use crate::buffer::Disk;
use crate::projection::{Transformer, is_geographic, reproject};

/// Latitude/longitude envelope inside which proximity queries are
/// meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Southern edge, degrees.
    pub min_latitude: f64,
    /// Northern edge, degrees.
    pub max_latitude: f64,
    /// Western edge, degrees.
    pub min_longitude: f64,
    /// Eastern edge, degrees.
    pub max_longitude: f64,
}

impl Default for Region {
    /// Waukesha County and its surroundings.
    fn default() -> Self {
        Self {
            min_latitude: 42.0,
            max_latitude: 44.0,
            min_longitude: -89.0,
            max_longitude: -87.0,
        }
    }
}

impl Region {
    /// Whether the point lies inside the envelope, edges included.
    #[must_use]
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.min_latitude..=self.max_latitude).contains(&latitude)
            && (self.min_longitude..=self.max_longitude).contains(&longitude)
    }

    /// Whether both edges are ordered and finite.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        [
            self.min_latitude,
            self.max_latitude,
            self.min_longitude,
            self.max_longitude,
        ]
        .iter()
        .all(|v| v.is_finite())
            && self.min_latitude <= self.max_latitude
            && self.min_longitude <= self.max_longitude
    }
}

/// Envelope of one projected candidate, keyed by its position in the
/// candidate list.
struct CandidateEntry {
    index: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for CandidateEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Proximity filter bound to an operating region and a planar CRS.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityFilter {
    region: Region,
    planar: Crs,
}

impl ProximityFilter {
    /// Creates a filter that buffers in `planar`.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::UnsupportedCrs`] if `planar` has no
    /// projection definition and [`SpatialError::GeographicPlanarCrs`] if
    /// it measures in degrees.
    pub fn new(region: Region, planar: Crs) -> Result<Self, SpatialError> {
        if is_geographic(planar)? {
            return Err(SpatialError::GeographicPlanarCrs { crs: planar });
        }
        Ok(Self { region, planar })
    }

    /// Keeps the parcels of `subset` within `query.radius_miles` of the
    /// query point. Order is preserved and `subset` is not modified.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::OutOfRegion`] if the query point lies outside
    /// the operating region, and [`SpatialError::UnsupportedCrs`] or
    /// [`SpatialError::Projection`] if `subset` cannot be reprojected.
    pub fn apply(&self, subset: &Dataset, query: &ProximityQuery) -> Result<Dataset, SpatialError> {
        if !self.region.contains(query.latitude, query.longitude) {
            return Err(SpatialError::OutOfRegion {
                latitude: query.latitude,
                longitude: query.longitude,
            });
        }

        let center = Transformer::new(Crs::Wgs84, self.planar)?.coord(Coord {
            x: query.longitude,
            y: query.latitude,
        })?;
        let disk = Disk::around(Point(center), query.radius_meters());

        let projected = reproject(subset, self.planar)?;
        let retained = Self::intersecting(&projected, &disk);

        log::debug!(
            "Proximity filter kept {}/{} parcels within {} mi of ({}, {})",
            retained.len(),
            subset.len(),
            query.radius_miles,
            query.latitude,
            query.longitude,
        );

        let to_geographic = Transformer::new(self.planar, Crs::Wgs84)?;
        let parcels = retained
            .into_iter()
            .map(|i| {
                let parcel = &projected.parcels()[i];
                Ok(parcel.with_geometry(to_geographic.geometry(&parcel.geometry)?))
            })
            .collect::<Result<Vec<_>, SpatialError>>()?;

        Ok(Dataset::new(Crs::Wgs84, parcels))
    }

    /// Positions (ascending) of projected parcels touching `disk`.
    fn intersecting(projected: &Dataset, disk: &Disk) -> Vec<usize> {
        let entries: Vec<CandidateEntry> = projected
            .iter()
            .enumerate()
            .filter_map(|(index, parcel)| {
                let rect = parcel.geometry.bounding_rect()?;
                Some(CandidateEntry {
                    index,
                    envelope: AABB::from_corners(
                        [rect.min().x, rect.min().y],
                        [rect.max().x, rect.max().y],
                    ),
                })
            })
            .collect();
        let tree = RTree::bulk_load(entries);

        let search = disk.bounding_rect();
        let query_env = AABB::from_corners(
            [search.min().x, search.min().y],
            [search.max().x, search.max().y],
        );

        let mut hits: Vec<usize> = tree
            .locate_in_envelope_intersecting(&query_env)
            .map(|entry| entry.index)
            .filter(|&i| disk.intersects(&projected.parcels()[i].geometry))
            .collect();
        hits.sort_unstable();
        hits
    }
}
