#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Planar geometry for parcel queries.
//!
//! Provides the EPSG reprojection used to normalize source data and to
//! measure distances in metres, an exact circular buffer, the R-tree
//! backed proximity filter, and padded bounding boxes for result display.

pub mod bounds;
pub mod buffer;
pub mod projection;
pub mod proximity;

use parcel_map_parcel_models::Crs;
use thiserror::Error;

pub use bounds::{display_bounds, total_bounds};
pub use buffer::Disk;
pub use projection::{Transformer, is_geographic, reproject};
pub use proximity::{ProximityFilter, Region};

/// Errors from spatial filtering.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpatialError {
    /// The query point lies outside the supported region.
    #[error("Coordinates ({latitude}, {longitude}) are outside the supported region")]
    OutOfRegion {
        /// Query latitude.
        latitude: f64,
        /// Query longitude.
        longitude: f64,
    },

    /// The CRS has no built-in projection definition.
    #[error("{crs} is not a supported coordinate reference system")]
    UnsupportedCrs {
        /// The unknown CRS.
        crs: Crs,
    },

    /// A coordinate could not be transformed.
    #[error("Reprojection failed at {message}")]
    Projection {
        /// The failing input and the projection library's reason.
        message: String,
    },

    /// A geographic CRS was configured where a planar one is required.
    #[error("{crs} is geographic; proximity buffering needs a projected CRS")]
    GeographicPlanarCrs {
        /// The rejected CRS.
        crs: Crs,
    },
}
