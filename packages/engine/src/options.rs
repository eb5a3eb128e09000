//! Distinct values for populating and validating filter predicates.

use std::collections::BTreeSet;

use parcel_map_parcel_models::criteria::MARKET_VALUE_FLOOR;
use parcel_map_parcel_models::{Dataset, FilterOptions, Parcel};

/// Computes the sorted distinct zip codes, place names, and school
/// districts of `dataset`. Missing values are skipped.
///
/// The market value bounds are the fixed floor and `market_value_ceiling`
/// rather than the data's own extremes, so the value slider is identical
/// across datasets.
#[must_use]
pub fn compute_filter_options(dataset: &Dataset, market_value_ceiling: f64) -> FilterOptions {
    let options = FilterOptions {
        zip_codes: distinct(dataset, |p| p.zip_code.as_deref()),
        place_names: distinct(dataset, |p| p.place_name.as_deref()),
        school_districts: distinct(dataset, |p| p.school_district.as_deref()),
        market_value_min: MARKET_VALUE_FLOOR,
        market_value_max: market_value_ceiling,
    };
    log::debug!(
        "Filter options: {} zip codes, {} places, {} school districts",
        options.zip_codes.len(),
        options.place_names.len(),
        options.school_districts.len(),
    );
    options
}

fn distinct(dataset: &Dataset, field: impl Fn(&Parcel) -> Option<&str>) -> Vec<String> {
    dataset
        .iter()
        .filter_map(field)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::parcel;
    use parcel_map_parcel_models::Crs;

    #[test]
    fn sorted_distinct_non_null_values() {
        let mut a = parcel("A", 1.0, Some(100.0));
        a.zip_code = Some("53189".to_string());
        a.place_name = Some("TOWN OF GENESEE".to_string());
        let mut b = parcel("B", 1.0, Some(100.0));
        b.zip_code = Some("53072".to_string());
        b.place_name = Some("CITY OF WAUKESHA".to_string());
        b.school_district = Some("WAUKESHA".to_string());
        let mut c = parcel("C", 1.0, Some(100.0));
        c.zip_code = Some("53189".to_string());

        let options = compute_filter_options(&Dataset::new(Crs::Wgs84, vec![a, b, c]), 1e9);
        assert_eq!(options.zip_codes, ["53072", "53189"]);
        assert_eq!(options.place_names, ["CITY OF WAUKESHA", "TOWN OF GENESEE"]);
        assert_eq!(options.school_districts, ["WAUKESHA"]);
    }

    #[test]
    fn market_value_bounds_are_fixed() {
        let options = compute_filter_options(
            &Dataset::new(Crs::Wgs84, vec![parcel("A", 1.0, Some(5_000_000_000.0))]),
            1e9,
        );
        assert!((options.market_value_min - 0.0).abs() < f64::EPSILON);
        assert!((options.market_value_max - 1e9).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_dataset_yields_empty_options() {
        let options = compute_filter_options(&Dataset::new(Crs::Wgs84, vec![]), 1e9);
        assert!(options.zip_codes.is_empty());
        assert!(options.place_names.is_empty());
        assert!(options.school_districts.is_empty());
    }
}
