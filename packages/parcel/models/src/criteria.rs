//! Filter criteria submitted by the caller for one filter invocation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Conversion factor used for proximity radii.
pub const METERS_PER_MILE: f64 = 1609.34;

/// Acreage slider stops offered by the filter form.
pub const ACRE_STOPS: &[f64] = &[0.0, 0.5, 1.0, 2.0, 3.0, 5.0, 10.0, 15.0, 20.0, 40.0, 1000.0];

/// Market value slider stops offered by the filter form.
pub const MARKET_VALUE_STOPS: &[f64] = &[
    0.0,
    50_000.0,
    100_000.0,
    200_000.0,
    300_000.0,
    400_000.0,
    500_000.0,
    600_000.0,
    800_000.0,
    900_000.0,
    1_000_000.0,
    1_500_000.0,
    2_000_000.0,
    1_000_000_000.0,
];

/// Fixed lower bound of the market value filter.
pub const MARKET_VALUE_FLOOR: f64 = 0.0;

/// Fixed upper bound of the market value filter. Not derived from data so
/// the value slider stays the same across datasets.
pub const MARKET_VALUE_CEILING: f64 = 1_000_000_000.0;

/// Smallest proximity radius offered by the filter form, in miles.
pub const MIN_RADIUS_MILES: f64 = 0.1;

/// Largest proximity radius offered by the filter form, in miles.
pub const MAX_RADIUS_MILES: f64 = 20.0;

/// Proximity radius preselected by the filter form, in miles.
pub const DEFAULT_RADIUS_MILES: f64 = 3.0;

/// Errors in caller-supplied criteria. These are rejected before any
/// filtering happens; the engine never repairs them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CriteriaError {
    /// A range whose minimum exceeds its maximum.
    #[error("Inverted {field} range: min {min} > max {max}")]
    InvertedRange {
        /// Which range was inverted.
        field: &'static str,
        /// Supplied minimum.
        min: f64,
        /// Supplied maximum.
        max: f64,
    },

    /// A NaN or infinite numeric input.
    #[error("Non-finite value for {field}")]
    NonFinite {
        /// Which field held the value.
        field: &'static str,
    },

    /// A proximity radius that is zero or negative.
    #[error("Proximity radius must be positive, got {radius_miles} miles")]
    InvalidRadius {
        /// Supplied radius.
        radius_miles: f64,
    },
}

/// Closed numeric interval `[min, max]`, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    /// Inclusive lower bound.
    pub min: f64,
    /// Inclusive upper bound.
    pub max: f64,
}

impl ValueRange {
    /// Creates a range without validating it; see [`ValueRange::validate`].
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Whether `value` lies within the range, bounds included.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    /// Checks that both bounds are finite and `min <= max`.
    ///
    /// # Errors
    ///
    /// Returns [`CriteriaError`] naming `field` if the range is unusable.
    pub fn validate(&self, field: &'static str) -> Result<(), CriteriaError> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(CriteriaError::NonFinite { field });
        }
        if self.min > self.max {
            return Err(CriteriaError::InvertedRange {
                field,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// "Parcels within `radius_miles` of this point".
///
/// The three fields are held together so a partially specified proximity
/// query cannot be expressed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProximityQuery {
    /// Query point latitude, degrees.
    pub latitude: f64,
    /// Query point longitude, degrees.
    pub longitude: f64,
    /// Search radius in statute miles.
    pub radius_miles: f64,
}

impl ProximityQuery {
    /// Radius converted to metres.
    #[must_use]
    pub fn radius_meters(&self) -> f64 {
        self.radius_miles * METERS_PER_MILE
    }

    /// Checks that coordinates are finite and the radius is positive.
    ///
    /// Region containment is checked separately by the proximity filter.
    ///
    /// # Errors
    ///
    /// Returns [`CriteriaError`] for non-finite inputs or a non-positive
    /// radius.
    pub fn validate(&self) -> Result<(), CriteriaError> {
        if !self.latitude.is_finite() {
            return Err(CriteriaError::NonFinite { field: "latitude" });
        }
        if !self.longitude.is_finite() {
            return Err(CriteriaError::NonFinite { field: "longitude" });
        }
        if !self.radius_miles.is_finite() {
            return Err(CriteriaError::NonFinite {
                field: "radius_miles",
            });
        }
        if self.radius_miles <= 0.0 {
            return Err(CriteriaError::InvalidRadius {
                radius_miles: self.radius_miles,
            });
        }
        Ok(())
    }
}

/// One complete set of filter predicates.
///
/// Empty sets and `None` impose no restriction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterCriteria {
    /// Acreage interval.
    pub acres: ValueRange,
    /// Case-insensitive substring of the owner name.
    pub owner_name: Option<String>,
    /// Allowed place names.
    pub place_names: BTreeSet<String>,
    /// Allowed zip codes.
    pub zip_codes: BTreeSet<String>,
    /// Allowed school districts.
    pub school_districts: BTreeSet<String>,
    /// Estimated market value interval.
    pub market_value: ValueRange,
    /// Optional distance-from-point restriction.
    pub proximity: Option<ProximityQuery>,
}

impl Default for FilterCriteria {
    /// The unrestricted form: full slider ranges, nothing else selected.
    fn default() -> Self {
        Self {
            acres: ValueRange::new(ACRE_STOPS[0], ACRE_STOPS[ACRE_STOPS.len() - 1]),
            owner_name: None,
            place_names: BTreeSet::new(),
            zip_codes: BTreeSet::new(),
            school_districts: BTreeSet::new(),
            market_value: ValueRange::new(MARKET_VALUE_FLOOR, MARKET_VALUE_CEILING),
            proximity: None,
        }
    }
}

impl FilterCriteria {
    /// The owner substring, if one was given and it is not blank.
    #[must_use]
    pub fn owner_needle(&self) -> Option<&str> {
        self.owner_name.as_deref().filter(|s| !s.is_empty())
    }

    /// Rejects malformed criteria before filtering.
    ///
    /// # Errors
    ///
    /// Returns [`CriteriaError`] for inverted or non-finite ranges and for
    /// an unusable proximity query.
    pub fn validate(&self) -> Result<(), CriteriaError> {
        self.acres.validate("acres")?;
        self.market_value.validate("market_value")?;
        if let Some(proximity) = &self.proximity {
            proximity.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_is_inclusive() {
        let range = ValueRange::new(1.0, 5.0);
        assert!(range.contains(1.0));
        assert!(range.contains(5.0));
        assert!(!range.contains(1.0 - f64::EPSILON));
        assert!(!range.contains(5.0 + 1e-9));
        assert!(!range.contains(f64::NAN));
    }

    #[test]
    fn inverted_range_rejected() {
        let criteria = FilterCriteria {
            acres: ValueRange::new(10.0, 2.0),
            ..FilterCriteria::default()
        };
        assert_eq!(
            criteria.validate(),
            Err(CriteriaError::InvertedRange {
                field: "acres",
                min: 10.0,
                max: 2.0
            })
        );
    }

    #[test]
    fn degenerate_range_is_valid() {
        assert!(ValueRange::new(3.0, 3.0).validate("acres").is_ok());
    }

    #[test]
    fn proximity_radius_must_be_positive() {
        let criteria = FilterCriteria {
            proximity: Some(ProximityQuery {
                latitude: 43.0,
                longitude: -88.2,
                radius_miles: 0.0,
            }),
            ..FilterCriteria::default()
        };
        assert!(matches!(
            criteria.validate(),
            Err(CriteriaError::InvalidRadius { .. })
        ));
    }

    #[test]
    fn nan_latitude_rejected() {
        let query = ProximityQuery {
            latitude: f64::NAN,
            longitude: -88.2,
            radius_miles: 1.0,
        };
        assert_eq!(
            query.validate(),
            Err(CriteriaError::NonFinite { field: "latitude" })
        );
    }

    #[test]
    fn default_is_unrestricted_form() {
        let criteria = FilterCriteria::default();
        assert!(criteria.validate().is_ok());
        assert_eq!(criteria.acres, ValueRange::new(0.0, 1000.0));
        assert_eq!(
            criteria.market_value,
            ValueRange::new(MARKET_VALUE_FLOOR, MARKET_VALUE_CEILING)
        );
        assert!(criteria.owner_needle().is_none());
    }

    #[test]
    fn blank_owner_is_no_restriction() {
        let criteria = FilterCriteria {
            owner_name: Some(String::new()),
            ..FilterCriteria::default()
        };
        assert!(criteria.owner_needle().is_none());
    }

    #[test]
    fn radius_in_meters() {
        let query = ProximityQuery {
            latitude: 43.0,
            longitude: -88.0,
            radius_miles: 2.0,
        };
        assert!((query.radius_meters() - 3218.68).abs() < 1e-9);
    }

    #[test]
    fn criteria_deserialize_with_defaults() {
        let criteria: FilterCriteria =
            serde_json::from_str(r#"{"zipCodes":["53186"],"ownerName":"smith"}"#).unwrap();
        assert_eq!(criteria.acres, ValueRange::new(0.0, 1000.0));
        assert!(criteria.zip_codes.contains("53186"));
        assert_eq!(criteria.owner_needle(), Some("smith"));
        assert!(criteria.proximity.is_none());
    }
}
