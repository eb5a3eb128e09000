//! Source column names and per-row conversion into [`Parcel`].

use geo::{Area, Geometry, MultiPolygon};
use parcel_map_parcel_models::Parcel;

use crate::DatasetError;

/// Primary owner name.
pub const OWNER_NAME: &str = "OWNERNME1";
/// Municipality name.
pub const PLACE_NAME: &str = "PLACENAME";
/// Zip code.
pub const ZIP_CODE: &str = "ZIPCODE";
/// School district.
pub const SCHOOL_DISTRICT: &str = "SCHOOLDIST";
/// Estimated fair market value.
pub const MARKET_VALUE: &str = "ESTFMKVALU";
/// Owner mailing address.
pub const MAILING_ADDRESS: &str = "PSTLADRESS";
/// Site address.
pub const SITE_ADDRESS: &str = "SITEADRESS";
/// GIS acreage.
pub const ACRES: &str = "GISACRES";
/// Tax site link.
pub const URL: &str = "URL";
/// Default geometry column when the source does not name one.
pub const GEOMETRY: &str = "geometry";

/// Attribute values of one source row before validation.
#[derive(Debug, Default)]
pub struct RawRow {
    pub owner_name: Option<String>,
    pub place_name: Option<String>,
    pub zip_code: Option<String>,
    pub school_district: Option<String>,
    pub estimated_value: Option<f64>,
    pub mailing_address: Option<String>,
    pub site_address: Option<String>,
    pub acres: Option<f64>,
    pub url: Option<String>,
}

impl RawRow {
    /// Validates the row and attaches its geometry.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::DataCorrupt`] if acreage is missing or
    /// invalid, or the geometry is not a non-degenerate (multi)polygon.
    pub fn into_parcel(self, row: usize, geometry: Option<Geometry<f64>>) -> Result<Parcel, DatasetError> {
        let acres = self
            .acres
            .ok_or_else(|| DatasetError::corrupt(format!("row {row}: {ACRES} is null")))?;
        if !acres.is_finite() || acres < 0.0 {
            return Err(DatasetError::corrupt(format!(
                "row {row}: {ACRES} must be a non-negative number, got {acres}"
            )));
        }

        let geometry = geometry
            .ok_or_else(|| DatasetError::corrupt(format!("row {row}: geometry is null")))?;
        let geometry = into_multipolygon(geometry).ok_or_else(|| {
            DatasetError::corrupt(format!("row {row}: geometry is not a polygon or multipolygon"))
        })?;
        if geometry.0.is_empty() || geometry.unsigned_area() <= 0.0 {
            return Err(DatasetError::corrupt(format!("row {row}: geometry is empty or degenerate")));
        }

        Ok(Parcel {
            owner_name: non_empty(self.owner_name),
            place_name: non_empty(self.place_name),
            zip_code: non_empty(self.zip_code),
            school_district: non_empty(self.school_district),
            estimated_value: self.estimated_value.filter(|v| v.is_finite()),
            mailing_address: non_empty(self.mailing_address),
            site_address: non_empty(self.site_address),
            acres,
            url: non_empty(self.url),
            geometry,
        })
    }
}

/// Treats blank strings as missing.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Accepts `Polygon` and `MultiPolygon` geometries only.
fn into_multipolygon(geometry: Geometry<f64>) -> Option<MultiPolygon<f64>> {
    match geometry {
        Geometry::MultiPolygon(mp) => Some(mp),
        Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}
