//! Engine configuration.
//!
//! Every field has a default matching the Waukesha County viewer, so an
//! empty TOML file (or no file at all) is a valid configuration:
//!
//! ```toml
//! render_cap = 1000
//! bbox_padding = 0.1
//! planar_epsg = 32616
//! marker_threshold = 200
//! market_value_ceiling = 1000000000.0
//!
//! [region]
//! min_latitude = 42.0
//! max_latitude = 44.0
//! min_longitude = -89.0
//! max_longitude = -87.0
//!
//! [default_view]
//! latitude = 43.0111125
//! longitude = -88.2275077
//! zoom = 10
//! ```

use std::path::{Path, PathBuf};

use parcel_map_parcel_models::criteria::{MARKET_VALUE_CEILING, MARKET_VALUE_FLOOR};
use parcel_map_parcel_models::crs::EPSG_UTM_16N;
use parcel_map_parcel_models::{Crs, DefaultView};
use parcel_map_spatial::Region;
use serde::Deserialize;
use thiserror::Error;

/// Errors from reading or validating an [`EngineConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config {}: {source}", path.display())]
    Io {
        /// Path that was tried.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of its allowed range.
    #[error("Invalid config: {message}")]
    Invalid {
        /// Which value and why.
        message: String,
    },
}

/// Tunables for the filtering engine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Maximum number of parcels forwarded to map/table rendering. This
    /// bounds rendering cost only; match counts are never capped.
    pub render_cap: usize,
    /// Fraction of the result extent added on every side of the bounds.
    pub bbox_padding: f64,
    /// Envelope proximity queries must fall inside.
    pub region: Region,
    /// EPSG code of the projected CRS used for distance buffering.
    pub planar_epsg: u32,
    /// Map view shown when a result is empty.
    pub default_view: DefaultView,
    /// Results smaller than this get per-parcel centroid markers.
    pub marker_threshold: usize,
    /// Upper bound reported for the market value filter.
    pub market_value_ceiling: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            render_cap: 1000,
            bbox_padding: 0.10,
            region: Region::default(),
            planar_epsg: EPSG_UTM_16N,
            default_view: DefaultView::default(),
            marker_threshold: 200,
            market_value_ceiling: MARKET_VALUE_CEILING,
        }
    }
}

impl EngineConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys,
    /// and [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::de::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise
    /// the same errors as [`EngineConfig::from_toml_str`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        log::debug!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    /// The planar CRS named by [`EngineConfig::planar_epsg`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] unless the code names a supported
    /// projected CRS.
    pub fn planar_crs(&self) -> Result<Crs, ConfigError> {
        let crs = Crs::from_epsg(self.planar_epsg);
        let message = match parcel_map_spatial::is_geographic(crs) {
            Ok(false) => return Ok(crs),
            Ok(true) => format!("planar_epsg {} is geographic, not projected", self.planar_epsg),
            Err(e) => format!("planar_epsg {}: {e}", self.planar_epsg),
        };
        Err(ConfigError::Invalid { message })
    }

    /// Checks every value for range and consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| Err(ConfigError::Invalid { message });

        if self.render_cap == 0 {
            return invalid("render_cap must be at least 1".to_string());
        }
        if !self.bbox_padding.is_finite() || self.bbox_padding < 0.0 {
            return invalid(format!(
                "bbox_padding must be a non-negative number, got {}",
                self.bbox_padding
            ));
        }
        if !self.region.is_valid() {
            return invalid(format!("region envelope is inverted or non-finite: {:?}", self.region));
        }
        if !self.market_value_ceiling.is_finite() || self.market_value_ceiling < MARKET_VALUE_FLOOR {
            return invalid(format!(
                "market_value_ceiling must be >= {MARKET_VALUE_FLOOR}, got {}",
                self.market_value_ceiling
            ));
        }
        self.planar_crs()?;
        Ok(())
    }
}
