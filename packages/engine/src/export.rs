//! `GeoJSON` export of the rendered subset.

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue};
use parcel_map_dataset::columns;

use crate::result::{FilterResult, FilteredParcel};

/// Property key holding the popup HTML.
pub const POPUP_PROPERTY: &str = "popup_content";

fn optional_text(value: Option<&str>) -> JsonValue {
    value.map_or(JsonValue::Null, |v| JsonValue::String(v.to_string()))
}

fn feature(fp: &FilteredParcel) -> Feature {
    let p = &fp.parcel;
    let mut properties = JsonObject::new();
    properties.insert(columns::OWNER_NAME.to_string(), optional_text(p.owner_name.as_deref()));
    properties.insert(columns::PLACE_NAME.to_string(), optional_text(p.place_name.as_deref()));
    properties.insert(columns::ZIP_CODE.to_string(), optional_text(p.zip_code.as_deref()));
    properties.insert(
        columns::SCHOOL_DISTRICT.to_string(),
        optional_text(p.school_district.as_deref()),
    );
    properties.insert(
        columns::MARKET_VALUE.to_string(),
        p.estimated_value.map_or(JsonValue::Null, JsonValue::from),
    );
    properties.insert(
        columns::MAILING_ADDRESS.to_string(),
        optional_text(p.mailing_address.as_deref()),
    );
    properties.insert(columns::SITE_ADDRESS.to_string(), optional_text(p.site_address.as_deref()));
    properties.insert(columns::ACRES.to_string(), JsonValue::from(p.acres));
    properties.insert(columns::URL.to_string(), optional_text(p.url.as_deref()));
    properties.insert(
        POPUP_PROPERTY.to_string(),
        JsonValue::String(fp.popup_content.clone()),
    );

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geojson::Value::from(&p.geometry))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

impl FilterResult {
    /// The rendered parcels as a WGS84 `FeatureCollection`, one feature
    /// per parcel with the source attribute names as properties.
    #[must_use]
    pub fn to_feature_collection(&self) -> FeatureCollection {
        FeatureCollection {
            bbox: None,
            features: self.rendered().iter().map(feature).collect(),
            foreign_members: None,
        }
    }
}
