#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Parcel filtering engine.
//!
//! [`ParcelEngine`] ties the pieces together. A caller loads the dataset
//! and computes the filter options once, then calls
//! [`ParcelEngine::filter`] for every change of the filter form:
//!
//! 1. criteria validation,
//! 2. attribute predicates ([`predicate::apply`]),
//! 3. the optional proximity buffer ([`ProximityFilter`]),
//! 4. bounds, truncation, and popup text ([`FilterResult::finalize`]).
//!
//! The engine holds no state between calls beyond its configuration.
//! Every call returns a fresh [`FilterResult`].

pub mod config;
pub mod export;
pub mod options;
pub mod predicate;
pub mod presentation;
pub mod result;
pub mod summary;

use std::path::Path;

use parcel_map_dataset::DatasetError;
use parcel_map_parcel_models::{CriteriaError, Dataset, FilterCriteria, FilterOptions};
use parcel_map_spatial::{ProximityFilter, SpatialError};
use thiserror::Error;

pub use config::{ConfigError, EngineConfig};
pub use result::{FilterResult, FilteredParcel, Marker, RenderSettings};
pub use summary::{DEFAULT_HISTOGRAM_BINS, Distribution, HistogramBin, Stats, Summary};

/// Errors from a single filter invocation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    /// The criteria were malformed and were rejected before filtering.
    #[error(transparent)]
    Criteria(#[from] CriteriaError),

    /// The proximity query could not be evaluated.
    #[error(transparent)]
    Spatial(#[from] SpatialError),
}

impl FilterError {
    /// Whether the caller may recover by showing an empty result.
    #[must_use]
    pub const fn is_out_of_region(&self) -> bool {
        matches!(self, Self::Spatial(SpatialError::OutOfRegion { .. }))
    }
}

/// The filtering engine.
#[derive(Debug, Clone)]
pub struct ParcelEngine {
    config: EngineConfig,
    proximity: ProximityFilter,
}

impl ParcelEngine {
    /// Creates an engine from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `config` fails validation.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let proximity = ProximityFilter::new(config.region, config.planar_crs()?).map_err(|e| {
            ConfigError::Invalid {
                message: e.to_string(),
            }
        })?;
        Ok(Self { config, proximity })
    }

    /// The configuration this engine runs with.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The render settings copied into every result.
    #[must_use]
    pub const fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            cap: self.config.render_cap,
            marker_threshold: self.config.marker_threshold,
            default_view: self.config.default_view,
        }
    }

    /// Loads and normalizes the parcel dataset at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::DataUnavailable`] if the file is missing and
    /// [`DatasetError::DataCorrupt`] if it cannot be parsed.
    pub fn load_dataset(path: &Path) -> Result<Dataset, DatasetError> {
        parcel_map_dataset::load(path)
    }

    /// Distinct values for the filter form.
    #[must_use]
    pub fn compute_filter_options(&self, dataset: &Dataset) -> FilterOptions {
        options::compute_filter_options(dataset, self.config.market_value_ceiling)
    }

    /// Applies `criteria` to `dataset`.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::Criteria`] for malformed criteria and
    /// [`FilterError::Spatial`] if the proximity point is outside the
    /// operating region. No partial result is produced on error.
    pub fn filter(
        &self,
        dataset: &Dataset,
        criteria: &FilterCriteria,
    ) -> Result<FilterResult, FilterError> {
        criteria.validate()?;

        let mut subset = predicate::apply(dataset, criteria);
        if let Some(query) = &criteria.proximity {
            subset = self.proximity.apply(&subset, query)?;
        }

        Ok(FilterResult::finalize(
            subset,
            self.config.bbox_padding,
            self.render_settings(),
        ))
    }

    /// An empty result, for callers recovering from
    /// [`FilterError::is_out_of_region`].
    #[must_use]
    pub const fn empty_result(&self) -> FilterResult {
        FilterResult::empty(self.render_settings())
    }
}
