//! Attribute predicate filtering.

use parcel_map_parcel_models::{Dataset, FilterCriteria, Parcel};

/// `criteria` with its owner needle lowercased once up front.
struct Predicate<'a> {
    criteria: &'a FilterCriteria,
    owner_needle: Option<String>,
}

impl<'a> Predicate<'a> {
    fn new(criteria: &'a FilterCriteria) -> Self {
        Self {
            criteria,
            owner_needle: criteria.owner_needle().map(str::to_lowercase),
        }
    }

    /// Conjunction of every active clause. Inactive clauses (no owner
    /// needle, empty sets) always pass.
    fn matches(&self, parcel: &Parcel) -> bool {
        let c = self.criteria;

        c.acres.contains(parcel.acres)
            && self.owner_needle.as_deref().is_none_or(|needle| {
                parcel
                    .owner_name
                    .as_deref()
                    .is_some_and(|owner| owner.to_lowercase().contains(needle))
            })
            && member(&c.place_names, parcel.place_name.as_deref())
            && member(&c.zip_codes, parcel.zip_code.as_deref())
            && member(&c.school_districts, parcel.school_district.as_deref())
            && parcel
                .estimated_value
                .is_some_and(|value| c.market_value.contains(value))
    }
}

/// Empty `allowed` means no restriction; otherwise a missing value never
/// matches.
fn member(allowed: &std::collections::BTreeSet<String>, value: Option<&str>) -> bool {
    allowed.is_empty() || value.is_some_and(|v| allowed.contains(v))
}

/// Keeps the parcels of `dataset` satisfying every active clause of
/// `criteria`, in source order.
///
/// Criteria are assumed valid; see [`FilterCriteria::validate`].
#[must_use]
pub fn apply(dataset: &Dataset, criteria: &FilterCriteria) -> Dataset {
    let predicate = Predicate::new(criteria);
    let parcels: Vec<Parcel> = dataset
        .iter()
        .filter(|parcel| predicate.matches(parcel))
        .cloned()
        .collect();

    log::debug!(
        "Predicate filter kept {}/{} parcels",
        parcels.len(),
        dataset.len()
    );

    Dataset::new(dataset.crs(), parcels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{owners, parcel};
    use parcel_map_parcel_models::{Crs, ValueRange};

    fn sample() -> Dataset {
        let mut a = parcel("Smith John", 0.5, Some(150_000.0));
        a.place_name = Some("CITY OF WAUKESHA".to_string());
        a.zip_code = Some("53186".to_string());
        a.school_district = Some("WAUKESHA".to_string());

        let mut b = parcel("JOHNSON FARMS LLC", 40.0, Some(900_000.0));
        b.place_name = Some("TOWN OF GENESEE".to_string());
        b.zip_code = Some("53189".to_string());
        b.school_district = Some("KETTLE MORAINE".to_string());

        let mut c = parcel("DOE JANE", 2.0, None);
        c.place_name = Some("CITY OF WAUKESHA".to_string());
        c.zip_code = Some("53188".to_string());

        let mut d = parcel("x", 3.0, Some(300_000.0));
        d.owner_name = None;
        d.zip_code = Some("53186".to_string());

        Dataset::new(Crs::Wgs84, vec![a, b, c, d])
    }

    #[test]
    fn unrestricted_criteria_keep_everything_with_a_value() {
        let result = apply(&sample(), &FilterCriteria::default());
        assert_eq!(owners(&result), ["Smith John", "JOHNSON FARMS LLC", "<none>"]);
    }

    #[test]
    fn acreage_bounds_are_inclusive() {
        let mut criteria = FilterCriteria::default();
        criteria.acres = ValueRange::new(0.5, 40.0);
        assert_eq!(apply(&sample(), &criteria).len(), 3);

        criteria.acres = ValueRange::new(0.5 + 1e-9, 40.0 - 1e-9);
        assert_eq!(owners(&apply(&sample(), &criteria)), ["<none>"]);
    }

    #[test]
    fn owner_match_is_case_insensitive_substring() {
        let criteria = FilterCriteria {
            owner_name: Some("john".to_string()),
            ..FilterCriteria::default()
        };
        assert_eq!(
            owners(&apply(&sample(), &criteria)),
            ["Smith John", "JOHNSON FARMS LLC"]
        );
    }

    #[test]
    fn null_owner_never_matches_a_needle() {
        let criteria = FilterCriteria {
            owner_name: Some("x".to_string()),
            ..FilterCriteria::default()
        };
        assert!(apply(&sample(), &criteria).is_empty());
    }

    #[test]
    fn set_membership_filters() {
        let criteria = FilterCriteria {
            zip_codes: ["53186".to_string()].into(),
            ..FilterCriteria::default()
        };
        assert_eq!(owners(&apply(&sample(), &criteria)), ["Smith John", "<none>"]);

        let criteria = FilterCriteria {
            place_names: ["CITY OF WAUKESHA".to_string()].into(),
            school_districts: ["WAUKESHA".to_string()].into(),
            ..FilterCriteria::default()
        };
        assert_eq!(owners(&apply(&sample(), &criteria)), ["Smith John"]);
    }

    #[test]
    fn market_value_bounds_are_inclusive() {
        let criteria = FilterCriteria {
            market_value: ValueRange::new(150_000.0, 300_000.0),
            ..FilterCriteria::default()
        };
        assert_eq!(owners(&apply(&sample(), &criteria)), ["Smith John", "<none>"]);
    }

    #[test]
    fn adding_a_clause_never_grows_the_result() {
        let base = FilterCriteria::default();
        let narrowed = FilterCriteria {
            owner_name: Some("j".to_string()),
            ..base.clone()
        };
        let narrower = FilterCriteria {
            zip_codes: ["53189".to_string()].into(),
            ..narrowed.clone()
        };

        let d = sample();
        let r1 = apply(&d, &base);
        let r2 = apply(&d, &narrowed);
        let r3 = apply(&d, &narrower);
        assert!(r2.iter().all(|p| r1.parcels().contains(p)));
        assert!(r3.iter().all(|p| r2.parcels().contains(p)));
        assert!(r3.len() <= r2.len() && r2.len() <= r1.len());
    }

    #[test]
    fn input_is_not_modified() {
        let d = sample();
        let before = d.clone();
        let _ = apply(
            &d,
            &FilterCriteria {
                owner_name: Some("doe".to_string()),
                ..FilterCriteria::default()
            },
        );
        assert_eq!(d, before);
    }
}
