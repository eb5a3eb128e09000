//! Bounding boxes over parcel collections.

use geo::{BoundingRect, Rect};
use parcel_map_parcel_models::{Bounds, Dataset};

/// Minimal axis-aligned rectangle enclosing every geometry, or `None` if
/// there are no geometries.
#[must_use]
pub fn total_bounds(dataset: &Dataset) -> Option<Rect<f64>> {
    dataset
        .iter()
        .filter_map(|parcel| parcel.geometry.bounding_rect())
        .reduce(|acc, rect| {
            Rect::new(
                geo::coord! {
                    x: acc.min().x.min(rect.min().x),
                    y: acc.min().y.min(rect.min().y),
                },
                geo::coord! {
                    x: acc.max().x.max(rect.max().x),
                    y: acc.max().y.max(rect.max().y),
                },
            )
        })
}

/// Total bounds grown by `padding` times the width on the left and right
/// and `padding` times the height on the top and bottom.
#[must_use]
pub fn display_bounds(dataset: &Dataset, padding: f64) -> Option<Bounds> {
    total_bounds(dataset).map(|rect| Bounds::from(rect).padded(padding))
}
