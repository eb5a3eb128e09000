//! Filter results: the matching parcels plus everything a map or table
//! renderer needs to display them.
//!
//! The render cap only limits what is handed to renderers through
//! [`FilterResult::rendered`]. Counts and summaries always cover the full
//! match set.

use geo::Centroid;
use parcel_map_parcel_models::{Bounds, Dataset, DefaultView, MapView, Metric, Parcel};
use serde::Serialize;

use crate::presentation::popup_content;
use crate::summary::{Distribution, HistogramBin, Summary, histogram};

/// Display limits copied into each result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSettings {
    /// Maximum parcels handed to renderers.
    pub cap: usize,
    /// Results smaller than this get centroid markers.
    pub marker_threshold: usize,
    /// Map view for empty results.
    pub default_view: DefaultView,
}

/// A matching parcel with its popup text.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredParcel {
    /// The parcel, geometry in WGS84.
    pub parcel: Parcel,
    /// Popup HTML built by [`popup_content`].
    pub popup_content: String,
}

/// A point marker at a parcel's centroid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    /// Centroid latitude.
    pub latitude: f64,
    /// Centroid longitude.
    pub longitude: f64,
    /// Popup HTML for the parcel.
    pub popup_content: String,
}

/// The outcome of one filter invocation.
///
/// Results are immutable snapshots; a new invocation produces a new
/// result rather than updating an old one.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterResult {
    parcels: Vec<FilteredParcel>,
    bounds: Option<Bounds>,
    truncated: bool,
    settings: RenderSettings,
}

impl FilterResult {
    /// Builds the result for `subset`: popup text for every parcel, padded
    /// display bounds, and the truncation flag.
    #[must_use]
    pub fn finalize(subset: Dataset, padding: f64, settings: RenderSettings) -> Self {
        let bounds = parcel_map_spatial::display_bounds(&subset, padding);
        let truncated = subset.len() > settings.cap;
        if truncated {
            log::warn!(
                "{} parcels matched; only the first {} will be rendered",
                subset.len(),
                settings.cap
            );
        }

        let parcels = subset
            .into_parcels()
            .into_iter()
            .map(|parcel| FilteredParcel {
                popup_content: popup_content(&parcel),
                parcel,
            })
            .collect();

        Self {
            parcels,
            bounds,
            truncated,
            settings,
        }
    }

    /// A result with no matches, for callers recovering from a rejected
    /// query.
    #[must_use]
    pub const fn empty(settings: RenderSettings) -> Self {
        Self {
            parcels: Vec::new(),
            bounds: None,
            truncated: false,
            settings,
        }
    }

    /// Number of matching parcels. Not affected by the render cap.
    #[must_use]
    pub fn count(&self) -> usize {
        self.parcels.len()
    }

    /// Whether nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parcels.is_empty()
    }

    /// Whether [`FilterResult::rendered`] holds fewer parcels than matched.
    #[must_use]
    pub const fn truncated(&self) -> bool {
        self.truncated
    }

    /// The render cap this result was built with.
    #[must_use]
    pub const fn render_cap(&self) -> usize {
        self.settings.cap
    }

    /// Padded bounds of every match, or `None` when nothing matched.
    #[must_use]
    pub const fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    /// Every matching parcel in order.
    #[must_use]
    pub fn parcels(&self) -> &[FilteredParcel] {
        &self.parcels
    }

    /// The first `render_cap` matches, for maps and tables.
    #[must_use]
    pub fn rendered(&self) -> &[FilteredParcel] {
        &self.parcels[..self.parcels.len().min(self.settings.cap)]
    }

    /// Fit to the bounds, or fall back to the default view when empty.
    #[must_use]
    pub const fn map_view(&self) -> MapView {
        match self.bounds {
            Some(bounds) => MapView::Fit { bounds },
            None => MapView::Default {
                view: self.settings.default_view,
            },
        }
    }

    /// Centroid markers for small results; empty once the match count
    /// reaches the marker threshold.
    #[must_use]
    pub fn markers(&self) -> Vec<Marker> {
        if self.count() >= self.settings.marker_threshold {
            return Vec::new();
        }
        self.parcels
            .iter()
            .filter_map(|fp| {
                let centroid = fp.parcel.geometry.centroid()?;
                Some(Marker {
                    latitude: centroid.y(),
                    longitude: centroid.x(),
                    popup_content: fp.popup_content.clone(),
                })
            })
            .collect()
    }

    /// Aggregate figures over every match.
    #[must_use]
    pub fn summary(&self) -> Summary {
        Summary::of(self.parcels.iter().map(|fp| &fp.parcel))
    }

    /// Distribution of `metric` over every match.
    #[must_use]
    pub fn histogram(&self, metric: Metric, bins: usize) -> Vec<HistogramBin> {
        histogram(self.parcels.iter().map(|fp| &fp.parcel), metric, bins)
    }

    /// One labelled [`FilterResult::histogram`] per entry of `metrics`.
    #[must_use]
    pub fn distributions(&self, metrics: &[Metric], bins: usize) -> Vec<Distribution> {
        metrics
            .iter()
            .map(|&metric| Distribution {
                metric,
                label: metric.label(),
                bins: self.histogram(metric, bins),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::DEFAULT_HISTOGRAM_BINS;
    use crate::test_support::{parcel, parcel_at};
    use parcel_map_parcel_models::Crs;

    fn settings(cap: usize) -> RenderSettings {
        RenderSettings {
            cap,
            marker_threshold: 200,
            default_view: DefaultView::default(),
        }
    }

    fn dataset(n: usize) -> Dataset {
        Dataset::new(
            Crs::Wgs84,
            (0..n).map(|i| parcel(&format!("owner {i}"), 1.0, Some(1.0))).collect(),
        )
    }

    #[test]
    fn over_cap_is_truncated_but_fully_counted() {
        let result = FilterResult::finalize(dataset(1001), 0.1, settings(1000));
        assert!(result.truncated());
        assert_eq!(result.count(), 1001);
        assert_eq!(result.rendered().len(), 1000);
        assert_eq!(result.summary().count, 1001);
        assert_eq!(
            result.rendered()[999].parcel.owner_name.as_deref(),
            Some("owner 999")
        );
    }

    #[test]
    fn exactly_at_cap_is_not_truncated() {
        let result = FilterResult::finalize(dataset(1000), 0.1, settings(1000));
        assert!(!result.truncated());
        assert_eq!(result.rendered().len(), 1000);
    }

    #[test]
    fn empty_result_falls_back_to_default_view() {
        let result = FilterResult::finalize(dataset(0), 0.1, settings(1000));
        assert_eq!(result.bounds(), None);
        assert_eq!(
            result.map_view(),
            MapView::Default {
                view: DefaultView::default()
            }
        );
        assert!(result.markers().is_empty());
        assert!(result.rendered().is_empty());
    }

    #[test]
    fn bounds_are_padded() {
        let subset = Dataset::new(
            Crs::Wgs84,
            vec![parcel_at(-88.3, 43.0, 0.01), parcel_at(-88.1, 43.19, 0.01)],
        );
        let result = FilterResult::finalize(subset, 0.1, settings(1000));
        let bounds = result.bounds().unwrap();
        // Raw extent: lon -88.3..-88.09 (0.21), lat 43.0..43.2 (0.2).
        assert!((bounds.west - (-88.3 - 0.021)).abs() < 1e-9);
        assert!((bounds.east - (-88.09 + 0.021)).abs() < 1e-9);
        assert!((bounds.south - (43.0 - 0.02)).abs() < 1e-9);
        assert!((bounds.north - (43.2 + 0.02)).abs() < 1e-9);
        assert!(matches!(result.map_view(), MapView::Fit { .. }));
    }

    #[test]
    fn every_parcel_gets_popup_text() {
        let result = FilterResult::finalize(dataset(3), 0.1, settings(1000));
        assert!(
            result
                .parcels()
                .iter()
                .all(|fp| fp.popup_content.starts_with("Owner: owner "))
        );
    }

    #[test]
    fn markers_only_below_threshold() {
        let small = FilterResult::finalize(dataset(199), 0.1, settings(1000));
        assert_eq!(small.markers().len(), 199);

        let large = FilterResult::finalize(dataset(200), 0.1, settings(1000));
        assert!(large.markers().is_empty());
    }

    #[test]
    fn histogram_covers_truncated_matches() {
        let subset = Dataset::new(
            Crs::Wgs84,
            (0..1500u32)
                .map(|i| parcel(&format!("owner {i}"), f64::from(i), Some(100.0)))
                .collect(),
        );
        let result = FilterResult::finalize(subset, 0.1, settings(1000));
        assert!(result.truncated());

        let acres = result.histogram(Metric::Acres, DEFAULT_HISTOGRAM_BINS);
        assert_eq!(acres.len(), DEFAULT_HISTOGRAM_BINS);
        assert_eq!(acres.iter().map(|b| b.count).sum::<usize>(), 1500);
        assert!((acres[DEFAULT_HISTOGRAM_BINS - 1].upper - 1499.0).abs() < 1e-9);

        let distributions = result.distributions(Metric::all(), DEFAULT_HISTOGRAM_BINS);
        let labels: Vec<_> = distributions.iter().map(|d| d.label).collect();
        assert_eq!(labels, ["Acres", "Market Value ($)"]);
        assert_eq!(distributions[0].bins, acres);
        assert_eq!(distributions[1].bins.len(), 1);
        assert_eq!(distributions[1].bins[0].count, 1500);
    }

    #[test]
    fn distributions_skip_missing_values() {
        let subset = Dataset::new(
            Crs::Wgs84,
            vec![parcel("a", 1.0, None), parcel("b", 3.0, Some(10.0))],
        );
        let result = FilterResult::finalize(subset, 0.1, settings(1000));
        let distributions = result.distributions(&[Metric::MarketValue], 4);
        assert_eq!(distributions.len(), 1);
        assert_eq!(distributions[0].metric, Metric::MarketValue);
        assert_eq!(distributions[0].bins.iter().map(|b| b.count).sum::<usize>(), 1);
        assert!(result.distributions(&[Metric::Acres], 0)[0].bins.is_empty());
    }

    #[test]
    fn marker_sits_at_centroid() {
        let subset = Dataset::new(Crs::Wgs84, vec![parcel_at(-88.2, 43.0, 0.02)]);
        let markers = FilterResult::finalize(subset, 0.1, settings(1000)).markers();
        assert!((markers[0].longitude - -88.19).abs() < 1e-9);
        assert!((markers[0].latitude - 43.01).abs() < 1e-9);
    }
}
