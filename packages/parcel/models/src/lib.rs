#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Parcel record, filter criteria, and result value types.
//!
//! These types are shared by the dataset loader, the spatial filter, and
//! the query engine. None of them carry behavior beyond validation and
//! small geometric helpers; the filtering itself lives in
//! `parcel_map_engine`.

pub mod criteria;
pub mod crs;

use geo::{MultiPolygon, Rect};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use criteria::{CriteriaError, FilterCriteria, ProximityQuery, ValueRange};
pub use crs::Crs;

/// One land parcel.
///
/// Every parcel has a non-empty polygonal geometry and an acreage; all
/// other attributes may be missing in the source data.
#[derive(Debug, Clone, PartialEq)]
pub struct Parcel {
    /// Primary owner name (`OWNERNME1`).
    pub owner_name: Option<String>,
    /// Municipality name (`PLACENAME`).
    pub place_name: Option<String>,
    /// Zip code as text (`ZIPCODE`).
    pub zip_code: Option<String>,
    /// School district (`SCHOOLDIST`).
    pub school_district: Option<String>,
    /// Estimated fair market value in dollars (`ESTFMKVALU`).
    pub estimated_value: Option<f64>,
    /// Owner mailing address (`PSTLADRESS`).
    pub mailing_address: Option<String>,
    /// Parcel site address (`SITEADRESS`).
    pub site_address: Option<String>,
    /// GIS-computed acreage (`GISACRES`).
    pub acres: f64,
    /// Link to the county tax site (`URL`).
    pub url: Option<String>,
    /// Parcel outline in the owning dataset's CRS.
    pub geometry: MultiPolygon<f64>,
}

impl Parcel {
    /// Returns a copy of this parcel carrying a different geometry.
    #[must_use]
    pub fn with_geometry(&self, geometry: MultiPolygon<f64>) -> Self {
        Self {
            geometry,
            ..self.clone()
        }
    }
}

/// An ordered collection of parcels sharing one CRS.
///
/// The loader produces a WGS84 dataset; the proximity filter produces
/// transient planar ones. Contents cannot be modified once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    crs: Crs,
    parcels: Vec<Parcel>,
}

impl Dataset {
    /// Wraps `parcels`, whose geometries must already be in `crs`.
    #[must_use]
    pub const fn new(crs: Crs, parcels: Vec<Parcel>) -> Self {
        Self { crs, parcels }
    }

    /// The CRS every geometry is expressed in.
    #[must_use]
    pub const fn crs(&self) -> Crs {
        self.crs
    }

    /// Parcels in source order.
    #[must_use]
    pub fn parcels(&self) -> &[Parcel] {
        &self.parcels
    }

    /// Number of parcels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parcels.len()
    }

    /// Whether the dataset holds no parcels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parcels.is_empty()
    }

    /// Iterates parcels in source order.
    pub fn iter(&self) -> std::slice::Iter<'_, Parcel> {
        self.parcels.iter()
    }

    /// Consumes the dataset, yielding its parcels.
    #[must_use]
    pub fn into_parcels(self) -> Vec<Parcel> {
        self.parcels
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Parcel;
    type IntoIter = std::slice::Iter<'a, Parcel>;

    fn into_iter(self) -> Self::IntoIter {
        self.parcels.iter()
    }
}

/// Distinct values available to the filter form, computed once per
/// dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    /// Sorted distinct zip codes.
    pub zip_codes: Vec<String>,
    /// Sorted distinct place names.
    pub place_names: Vec<String>,
    /// Sorted distinct school districts.
    pub school_districts: Vec<String>,
    /// Lower market value bound (fixed, not data-derived).
    pub market_value_min: f64,
    /// Upper market value bound (fixed, not data-derived).
    pub market_value_max: f64,
}

/// Axis-aligned geographic rectangle in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Minimum longitude.
    pub west: f64,
    /// Minimum latitude.
    pub south: f64,
    /// Maximum longitude.
    pub east: f64,
    /// Maximum latitude.
    pub north: f64,
}

impl Bounds {
    /// Width in degrees of longitude.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Height in degrees of latitude.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Grows each side by `factor` times the extent on that axis.
    #[must_use]
    pub fn padded(&self, factor: f64) -> Self {
        let dx = self.width() * factor;
        let dy = self.height() * factor;
        Self {
            west: self.west - dx,
            south: self.south - dy,
            east: self.east + dx,
            north: self.north + dy,
        }
    }

    /// Leaflet-style `[[south, west], [north, east]]` corners.
    #[must_use]
    pub const fn corners(&self) -> [[f64; 2]; 2] {
        [[self.south, self.west], [self.north, self.east]]
    }
}

impl From<Rect<f64>> for Bounds {
    fn from(rect: Rect<f64>) -> Self {
        Self {
            west: rect.min().x,
            south: rect.min().y,
            east: rect.max().x,
            north: rect.max().y,
        }
    }
}

/// Fixed map view used when there is nothing to fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DefaultView {
    /// Center latitude.
    pub latitude: f64,
    /// Center longitude.
    pub longitude: f64,
    /// Web map zoom level.
    pub zoom: u8,
}

impl Default for DefaultView {
    fn default() -> Self {
        Self {
            latitude: 43.011_112_5,
            longitude: -88.227_507_7,
            zoom: 10,
        }
    }
}

/// What a map renderer should show for a result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MapView {
    /// Fit the viewport to these padded bounds.
    Fit {
        /// Padded result bounds.
        bounds: Bounds,
    },
    /// Nothing matched; show the fixed default view.
    Default {
        /// The configured fallback.
        view: DefaultView,
    },
}

/// Numeric attribute a distribution can be computed over.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Metric {
    /// GIS acreage.
    Acres,
    /// Estimated fair market value.
    MarketValue,
}

impl Metric {
    /// Axis label for charts.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Acres => "Acres",
            Self::MarketValue => "Market Value ($)",
        }
    }

    /// Reads this metric from a parcel; `None` if the value is missing.
    #[must_use]
    pub const fn value_of(self, parcel: &Parcel) -> Option<f64> {
        match self {
            Self::Acres => Some(parcel.acres),
            Self::MarketValue => parcel.estimated_value,
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Acres, Self::MarketValue]
    }
}
