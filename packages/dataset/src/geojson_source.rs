//! `GeoJSON` `FeatureCollection` reader.
//!
//! RFC 7946 data is always WGS84, but older exports still carry a
//! top-level `crs` member naming a projected CRS; that member is honored
//! when present.

use std::path::Path;

use geojson::{Feature, GeoJson, JsonObject};
use parcel_map_parcel_models::{Crs, Parcel};

use crate::DatasetError;
use crate::columns::{self, RawRow};

/// Reads a `FeatureCollection`, returning parcels in the file's native CRS.
///
/// # Errors
///
/// Returns [`DatasetError::DataCorrupt`] if the file is not a valid
/// `FeatureCollection`, names an unsupported CRS, or contains an invalid
/// feature.
pub fn read(path: &Path) -> Result<(Crs, Vec<Parcel>), DatasetError> {
    let text = std::fs::read_to_string(path).map_err(|e| DatasetError::from_io(path, e))?;
    parse(&text)
}

/// Parses `GeoJSON` text; see [`read`].
///
/// # Errors
///
/// Same as [`read`].
pub fn parse(text: &str) -> Result<(Crs, Vec<Parcel>), DatasetError> {
    let GeoJson::FeatureCollection(collection) = text.parse::<GeoJson>()? else {
        return Err(DatasetError::corrupt(
            "GeoJSON root is not a FeatureCollection".to_string(),
        ));
    };

    let crs = match collection
        .foreign_members
        .as_ref()
        .and_then(|members| members.get("crs"))
    {
        None | Some(serde_json::Value::Null) => Crs::Wgs84,
        Some(member) => legacy_crs(member)?,
    };

    let parcels = collection
        .features
        .into_iter()
        .enumerate()
        .map(|(i, feature)| feature_to_parcel(i, feature))
        .collect::<Result<Vec<_>, _>>()?;

    Ok((crs, parcels))
}

/// Resolves `{"type": "name", "properties": {"name": "EPSG:32616"}}`.
fn legacy_crs(member: &serde_json::Value) -> Result<Crs, DatasetError> {
    member
        .get("properties")
        .and_then(|p| p.get("name"))
        .and_then(serde_json::Value::as_str)
        .and_then(Crs::from_identifier)
        .ok_or_else(|| DatasetError::corrupt(format!("unsupported GeoJSON crs member: {member}")))
}

fn feature_to_parcel(index: usize, feature: Feature) -> Result<Parcel, DatasetError> {
    let empty = JsonObject::new();
    let props = feature.properties.as_ref().unwrap_or(&empty);

    let raw = RawRow {
        owner_name: text(props, columns::OWNER_NAME),
        place_name: text(props, columns::PLACE_NAME),
        zip_code: text(props, columns::ZIP_CODE),
        school_district: text(props, columns::SCHOOL_DISTRICT),
        estimated_value: number(index, props, columns::MARKET_VALUE)?,
        mailing_address: text(props, columns::MAILING_ADDRESS),
        site_address: text(props, columns::SITE_ADDRESS),
        acres: number(index, props, columns::ACRES)?,
        url: text(props, columns::URL),
    };

    let geometry = feature
        .geometry
        .map(geo::Geometry::<f64>::try_from)
        .transpose()?;

    raw.into_parcel(index, geometry)
}

/// Reads a property as text. Non-string values (zip codes are often
/// numeric) keep their JSON spelling.
fn text(props: &JsonObject, key: &str) -> Option<String> {
    match props.get(key)? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn number(index: usize, props: &JsonObject, key: &str) -> Result<Option<f64>, DatasetError> {
    match props.get(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => Ok(n.as_f64()),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().map(Some).map_err(|_| {
            DatasetError::corrupt(format!("row {index}: {key} is not numeric: {s:?}"))
        }),
        Some(other) => Err(DatasetError::corrupt(format!(
            "row {index}: {key} is not numeric: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {
                    "OWNERNME1": "SMITH JOHN",
                    "PLACENAME": "CITY OF WAUKESHA",
                    "ZIPCODE": 53186,
                    "SCHOOLDIST": "WAUKESHA",
                    "ESTFMKVALU": "250000",
                    "GISACRES": 0.25,
                    "URL": null
                },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[-88.23, 43.01], [-88.22, 43.01], [-88.22, 43.02], [-88.23, 43.01]]]
                }
            }
        ]
    }"#;

    #[test]
    fn parses_feature_collection() {
        let (crs, parcels) = parse(SAMPLE).unwrap();
        assert_eq!(crs, Crs::Wgs84);
        assert_eq!(parcels.len(), 1);
        let parcel = &parcels[0];
        assert_eq!(parcel.zip_code.as_deref(), Some("53186"));
        assert_eq!(parcel.estimated_value, Some(250_000.0));
        assert_eq!(parcel.url, None);
        assert_eq!(parcel.mailing_address, None);
    }

    #[test]
    fn honors_legacy_crs_member() {
        let text = SAMPLE.replacen(
            "\"type\": \"FeatureCollection\",",
            "\"type\": \"FeatureCollection\", \"crs\": {\"type\": \"name\", \"properties\": {\"name\": \"urn:ogc:def:crs:EPSG::32616\"}},",
            1,
        );
        let (crs, _) = parse(&text).unwrap();
        assert_eq!(crs.epsg(), 32616);
    }

    #[test]
    fn unknown_crs_authority_is_corrupt() {
        let text = SAMPLE.replacen(
            "\"type\": \"FeatureCollection\",",
            "\"type\": \"FeatureCollection\", \"crs\": {\"type\": \"name\", \"properties\": {\"name\": \"ESRI:102100\"}},",
            1,
        );
        assert!(matches!(parse(&text), Err(DatasetError::DataCorrupt { .. })));
    }

    #[test]
    fn non_numeric_acreage_is_corrupt() {
        let text = SAMPLE.replace("\"GISACRES\": 0.25", "\"GISACRES\": \"lots\"");
        let err = parse(&text).unwrap_err();
        assert!(err.to_string().contains("GISACRES"));
    }

    #[test]
    fn single_feature_root_is_corrupt() {
        let text = r#"{"type": "Feature", "properties": {}, "geometry": null}"#;
        assert!(matches!(parse(text), Err(DatasetError::DataCorrupt { .. })));
    }
}
