#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Parcel dataset loading.
//!
//! Reads the parcel source file once, narrows it to the fixed attribute
//! set, and normalizes every geometry to geographic WGS84. Two source
//! formats are accepted:
//!
//! - **GeoParquet** (`.parquet`): read through an in-memory `DuckDB`
//!   connection, WKB geometries decoded with `geozero`.
//! - **`GeoJSON`** (`.geojson`, `.json`): a `FeatureCollection`.
//!
//! A load either yields the complete dataset or fails; no partial dataset
//! is ever returned.

pub mod columns;
pub mod geojson_source;
pub mod parquet;

use std::path::{Path, PathBuf};

use parcel_map_parcel_models::{Crs, Dataset};
use parcel_map_spatial::SpatialError;
use thiserror::Error;

/// File the viewer loads when no other path is given.
pub const DEFAULT_DATA_FILE: &str = "optimized.parquet";

/// Errors from loading the dataset. Both are terminal for the session.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The source file does not exist or cannot be opened.
    #[error("Parcel data file not found: {}", path.display())]
    DataUnavailable {
        /// Path that was tried.
        path: PathBuf,
    },

    /// The source exists but could not be parsed or failed validation.
    #[error("Error loading parcel data: {message}")]
    DataCorrupt {
        /// Description of what went wrong.
        message: String,
    },
}

impl DatasetError {
    /// Shorthand for [`DatasetError::DataCorrupt`].
    #[must_use]
    pub const fn corrupt(message: String) -> Self {
        Self::DataCorrupt { message }
    }

    /// Maps an I/O error on `path`: missing or unreadable files are
    /// unavailable, anything else is corrupt.
    #[must_use]
    pub fn from_io(path: &Path, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                Self::DataUnavailable {
                    path: path.to_path_buf(),
                }
            }
            _ => Self::corrupt(format!("{}: {error}", path.display())),
        }
    }
}

impl From<duckdb::Error> for DatasetError {
    fn from(e: duckdb::Error) -> Self {
        Self::corrupt(format!("parquet read failed: {e}"))
    }
}

impl From<serde_json::Error> for DatasetError {
    fn from(e: serde_json::Error) -> Self {
        Self::corrupt(format!("invalid JSON: {e}"))
    }
}

impl From<geojson::Error> for DatasetError {
    fn from(e: geojson::Error) -> Self {
        Self::corrupt(format!("invalid GeoJSON: {e}"))
    }
}

impl From<geozero::error::GeozeroError> for DatasetError {
    fn from(e: geozero::error::GeozeroError) -> Self {
        Self::corrupt(format!("invalid WKB geometry: {e}"))
    }
}

impl From<SpatialError> for DatasetError {
    fn from(e: SpatialError) -> Self {
        Self::corrupt(format!("cannot normalize to WGS84: {e}"))
    }
}

/// On-disk formats the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// GeoParquet with WKB geometries.
    GeoParquet,
    /// `GeoJSON` `FeatureCollection`.
    GeoJson,
}

impl SourceFormat {
    /// Picks a format from the file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "parquet" | "geoparquet" => Some(Self::GeoParquet),
            "geojson" | "json" => Some(Self::GeoJson),
            _ => None,
        }
    }
}

/// Loads the parcel dataset at `path` and normalizes it to WGS84.
///
/// # Errors
///
/// Returns [`DatasetError::DataUnavailable`] if the file does not exist, or
/// [`DatasetError::DataCorrupt`] for any parse or validation failure,
/// including a source CRS with no projection definition.
pub fn load(path: &Path) -> Result<Dataset, DatasetError> {
    if !path.is_file() {
        return Err(DatasetError::DataUnavailable {
            path: path.to_path_buf(),
        });
    }

    let format = SourceFormat::from_path(path).ok_or_else(|| {
        DatasetError::corrupt(format!("unrecognized data file extension: {}", path.display()))
    })?;

    let (crs, parcels) = match format {
        SourceFormat::GeoParquet => parquet::read(path)?,
        SourceFormat::GeoJson => geojson_source::read(path)?,
    };
    log::info!(
        "Loaded {} parcels from {} ({crs})",
        parcels.len(),
        path.display()
    );

    let dataset = Dataset::new(crs, parcels);
    if crs == Crs::Wgs84 {
        return Ok(dataset);
    }

    log::info!("Reprojecting parcels from {crs} to {}", Crs::Wgs84);
    Ok(parcel_map_spatial::reproject(&dataset, Crs::Wgs84)?)
}
