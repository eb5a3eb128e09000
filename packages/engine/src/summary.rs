//! Summary statistics and value distributions over a filtered set.

use parcel_map_parcel_models::{Metric, Parcel};
use serde::Serialize;

/// Default number of histogram bins.
pub const DEFAULT_HISTOGRAM_BINS: usize = 50;

/// Min/max/mean of one numeric attribute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// Number of parcels with a value.
    pub count: usize,
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
    /// Arithmetic mean.
    pub mean: f64,
}

impl Stats {
    /// Computes stats over `values`; `None` if there are none.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut count = 0usize;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for v in values {
            count += 1;
            min = min.min(v);
            max = max.max(v);
            sum += v;
        }
        (count > 0).then(|| Self {
            count,
            min,
            max,
            mean: sum / count as f64,
        })
    }
}

/// Aggregate figures for a filtered set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Number of matching parcels (never truncated).
    pub count: usize,
    /// Sum of acreage.
    pub total_acres: f64,
    /// Acreage statistics.
    pub acres: Option<Stats>,
    /// Market value statistics over parcels that have a value.
    pub market_value: Option<Stats>,
}

impl Summary {
    /// Summarizes `parcels`.
    #[must_use]
    pub fn of<'a>(parcels: impl Iterator<Item = &'a Parcel> + Clone) -> Self {
        Self {
            count: parcels.clone().count(),
            total_acres: parcels.clone().map(|p| p.acres).sum(),
            acres: Stats::from_values(parcels.clone().filter_map(|p| Metric::Acres.value_of(p))),
            market_value: Stats::from_values(parcels.filter_map(|p| Metric::MarketValue.value_of(p))),
        }
    }
}

/// One equal-width histogram bucket `[lower, upper)`; the last bucket also
/// includes its upper edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    /// Inclusive lower edge.
    pub lower: f64,
    /// Upper edge.
    pub upper: f64,
    /// Parcels falling in the bucket.
    pub count: usize,
}

/// The histogram of one metric, labelled for charting.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    /// Which attribute was bucketed.
    pub metric: Metric,
    /// Axis label, from [`Metric::label`].
    pub label: &'static str,
    /// The buckets, possibly empty.
    pub bins: Vec<HistogramBin>,
}

/// Buckets `metric` over `parcels` into `bins` equal-width bins spanning
/// the observed range. Parcels without a value are skipped. Returns no
/// bins when `bins` is zero or nothing has a value; a single bin when
/// every value is identical.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn histogram<'a>(
    parcels: impl Iterator<Item = &'a Parcel>,
    metric: Metric,
    bins: usize,
) -> Vec<HistogramBin> {
    let values: Vec<f64> = parcels.filter_map(|p| metric.value_of(p)).collect();
    let Some(stats) = Stats::from_values(values.iter().copied()) else {
        return Vec::new();
    };
    if bins == 0 {
        return Vec::new();
    }

    let span = stats.max - stats.min;
    if span <= 0.0 {
        return vec![HistogramBin {
            lower: stats.min,
            upper: stats.max,
            count: values.len(),
        }];
    }

    let width = span / bins as f64;
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: (i as f64).mul_add(width, stats.min),
            upper: if i + 1 == bins {
                stats.max
            } else {
                ((i + 1) as f64).mul_add(width, stats.min)
            },
            count: 0,
        })
        .collect();

    for v in values {
        let index = (((v - stats.min) / width) as usize).min(bins - 1);
        out[index].count += 1;
    }
    out
}
