//! Reprojection between EPSG coordinate reference systems.
//!
//! Transformations run through `proj4rs`. An EPSG code is usable only if
//! [`definition`] knows its PROJ.4 string; the table covers what county
//! parcel exports are typically published in, plus the UTM zones used for
//! metric buffering.

use geo::{Coord, MapCoords, MultiPolygon};
use parcel_map_parcel_models::{Crs, Dataset};
use proj4rs::Proj;

use crate::SpatialError;

const WGS84: &str = "+proj=longlat +datum=WGS84 +no_defs";
const NAD83: &str = "+proj=longlat +datum=NAD83 +no_defs";
const WEB_MERCATOR: &str = "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 \
                            +k=1 +units=m +nadgrids=@null +no_defs";
const WISCONSIN_TM: &str = "+proj=tmerc +lat_0=0 +lon_0=-90 +k=0.9996 +x_0=520000 \
                            +y_0=-4480000 +datum=NAD83 +units=m +no_defs";
const WISCONSIN_SOUTH: &str = "+proj=lcc +lat_0=42 +lon_0=-90 +lat_1=44.0666666666667 \
                               +lat_2=42.7333333333333 +x_0=600000 +y_0=0 +datum=NAD83";

/// The PROJ.4 definition of `crs`, or `None` if the code is not in the
/// built-in table.
#[must_use]
pub fn definition(crs: Crs) -> Option<String> {
    let code = crs.epsg();
    Some(match code {
        4326 => WGS84.to_string(),
        4269 => NAD83.to_string(),
        3857 | 900_913 => WEB_MERCATOR.to_string(),
        // NAD83 and NAD83(HARN) / Wisconsin Transverse Mercator.
        3070 | 3071 => WISCONSIN_TM.to_string(),
        // NAD83 / Wisconsin South, metres and US survey feet.
        32154 => format!("{WISCONSIN_SOUTH} +units=m +no_defs"),
        2289 => format!("{WISCONSIN_SOUTH} +units=us-ft +no_defs"),
        32601..=32660 => format!("+proj=utm +zone={} +datum=WGS84 +units=m +no_defs", code - 32600),
        32701..=32760 => format!(
            "+proj=utm +zone={} +south +datum=WGS84 +units=m +no_defs",
            code - 32700
        ),
        26901..=26923 => format!("+proj=utm +zone={} +datum=NAD83 +units=m +no_defs", code - 26900),
        _ => return None,
    })
}

fn resolve(crs: Crs) -> Result<Proj, SpatialError> {
    let definition = definition(crs).ok_or(SpatialError::UnsupportedCrs { crs })?;
    Proj::from_proj_string(&definition).map_err(|e| SpatialError::Projection {
        message: format!("{crs}: {e}"),
    })
}

/// Whether coordinates in `crs` are longitude/latitude degrees.
///
/// # Errors
///
/// Returns [`SpatialError::UnsupportedCrs`] if `crs` has no definition.
pub fn is_geographic(crs: Crs) -> Result<bool, SpatialError> {
    Ok(resolve(crs)?.is_latlong())
}

/// A resolved conversion from one CRS to another.
///
/// Geographic coordinates are degrees on both sides.
pub struct Transformer {
    source: Proj,
    target: Proj,
    identity: bool,
}

impl Transformer {
    /// Resolves both ends of the conversion.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::UnsupportedCrs`] if either CRS has no
    /// definition.
    pub fn new(from: Crs, to: Crs) -> Result<Self, SpatialError> {
        Ok(Self {
            source: resolve(from)?,
            target: resolve(to)?,
            identity: from == to,
        })
    }

    /// Converts a single coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::Projection`] if the coordinate cannot be
    /// represented in the target CRS.
    pub fn coord(&self, coord: Coord<f64>) -> Result<Coord<f64>, SpatialError> {
        if self.identity {
            return Ok(coord);
        }
        let mut point = if self.source.is_latlong() {
            (coord.x.to_radians(), coord.y.to_radians(), 0.0)
        } else {
            (coord.x, coord.y, 0.0)
        };
        proj4rs::transform::transform(&self.source, &self.target, &mut point).map_err(|e| {
            SpatialError::Projection {
                message: format!("({}, {}): {e}", coord.x, coord.y),
            }
        })?;
        Ok(if self.target.is_latlong() {
            Coord {
                x: point.0.to_degrees(),
                y: point.1.to_degrees(),
            }
        } else {
            Coord {
                x: point.0,
                y: point.1,
            }
        })
    }

    /// Returns a new geometry with every vertex converted.
    ///
    /// # Errors
    ///
    /// Fails on the first vertex [`Transformer::coord`] rejects.
    pub fn geometry(&self, geometry: &MultiPolygon<f64>) -> Result<MultiPolygon<f64>, SpatialError> {
        if self.identity {
            return Ok(geometry.clone());
        }
        geometry.try_map_coords(|coord| self.coord(coord))
    }
}

/// Reprojects every parcel of `dataset` into `target`.
///
/// The input is left untouched; the returned dataset owns new geometries.
///
/// # Errors
///
/// Returns [`SpatialError::UnsupportedCrs`] if either CRS has no
/// definition and [`SpatialError::Projection`] if a vertex cannot be
/// converted.
pub fn reproject(dataset: &Dataset, target: Crs) -> Result<Dataset, SpatialError> {
    let transformer = Transformer::new(dataset.crs(), target)?;
    let parcels = dataset
        .iter()
        .map(|parcel| Ok(parcel.with_geometry(transformer.geometry(&parcel.geometry)?)))
        .collect::<Result<Vec<_>, SpatialError>>()?;
    Ok(Dataset::new(target, parcels))
}
