//! GeoParquet reader backed by an in-memory `DuckDB` connection.
//!
//! Attribute columns are read with `read_parquet`, the geometry column is
//! read as raw WKB and decoded with `geozero`. The CRS comes from the
//! file's `geo` key-value metadata.

use std::collections::BTreeMap;
use std::path::Path;

use duckdb::Connection;
use geozero::ToGeo;
use geozero::wkb::Wkb;
use parcel_map_parcel_models::{Crs, Parcel};
use serde::Deserialize;

use crate::DatasetError;
use crate::columns::{self, RawRow};

/// The subset of the GeoParquet `geo` metadata this reader needs.
#[derive(Debug, Deserialize)]
struct GeoMetadata {
    primary_column: String,
    columns: BTreeMap<String, GeoColumn>,
}

#[derive(Debug, Deserialize)]
struct GeoColumn {
    encoding: String,
    /// PROJJSON. Absent or null means `OGC:CRS84`.
    #[serde(default)]
    crs: Option<serde_json::Value>,
}

/// Reads every row of a GeoParquet file, returning parcels in the file's
/// native CRS.
///
/// # Errors
///
/// Returns [`DatasetError::DataCorrupt`] if the file cannot be parsed, has
/// no GeoParquet metadata, lacks a required column, uses an unsupported
/// CRS or encoding, or contains an invalid row.
pub fn read(path: &Path) -> Result<(Crs, Vec<Parcel>), DatasetError> {
    let conn = Connection::open_in_memory()?;
    let source = sql_string_literal(path)?;

    let metadata = read_geo_metadata(&conn, &source)?;
    let column = metadata.columns.get(&metadata.primary_column).ok_or_else(|| {
        DatasetError::corrupt(format!(
            "GeoParquet primary column '{}' has no column metadata",
            metadata.primary_column
        ))
    })?;
    if !column.encoding.eq_ignore_ascii_case("WKB") {
        return Err(DatasetError::corrupt(format!(
            "unsupported geometry encoding '{}'",
            column.encoding
        )));
    }
    let crs = match &column.crs {
        None => Crs::Wgs84,
        Some(projjson) => crs_from_projjson(projjson)?,
    };

    let query = format!(
        "SELECT \
            CAST({owner} AS VARCHAR), \
            CAST({place} AS VARCHAR), \
            CAST({zip} AS VARCHAR), \
            CAST({school} AS VARCHAR), \
            CAST({value} AS DOUBLE), \
            CAST({mailing} AS VARCHAR), \
            CAST({site} AS VARCHAR), \
            CAST({acres} AS DOUBLE), \
            CAST({url} AS VARCHAR), \
            {geometry} \
         FROM read_parquet({source})",
        owner = quote_ident(columns::OWNER_NAME),
        place = quote_ident(columns::PLACE_NAME),
        zip = quote_ident(columns::ZIP_CODE),
        school = quote_ident(columns::SCHOOL_DISTRICT),
        value = quote_ident(columns::MARKET_VALUE),
        mailing = quote_ident(columns::MAILING_ADDRESS),
        site = quote_ident(columns::SITE_ADDRESS),
        acres = quote_ident(columns::ACRES),
        url = quote_ident(columns::URL),
        geometry = quote_ident(&metadata.primary_column),
    );

    let mut stmt = conn.prepare(&query)?;
    let mut rows = stmt.query([])?;
    let mut parcels = Vec::new();

    while let Some(row) = rows.next()? {
        let raw = RawRow {
            owner_name: row.get(0)?,
            place_name: row.get(1)?,
            zip_code: row.get(2)?,
            school_district: row.get(3)?,
            estimated_value: row.get(4)?,
            mailing_address: row.get(5)?,
            site_address: row.get(6)?,
            acres: row.get(7)?,
            url: row.get(8)?,
        };
        let wkb: Option<Vec<u8>> = row.get(9)?;
        let geometry = wkb.map(|bytes| Wkb(bytes).to_geo()).transpose()?;

        parcels.push(raw.into_parcel(parcels.len(), geometry)?);
    }

    Ok((crs, parcels))
}

fn read_geo_metadata(conn: &Connection, source: &str) -> Result<GeoMetadata, DatasetError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT value FROM parquet_kv_metadata({source}) WHERE CAST(key AS VARCHAR) = 'geo'"
    ))?;
    let mut rows = stmt.query([])?;
    let Some(row) = rows.next()? else {
        return Err(DatasetError::corrupt(
            "file has no GeoParquet 'geo' metadata".to_string(),
        ));
    };
    let value: Vec<u8> = row.get(0)?;
    Ok(serde_json::from_slice(&value)?)
}

/// Resolves a PROJJSON object (or a bare `AUTHORITY:CODE` string) to a
/// CRS identifier. Whether the CRS can be reprojected is checked later,
/// when the dataset is normalized.
fn crs_from_projjson(projjson: &serde_json::Value) -> Result<Crs, DatasetError> {
    let unsupported = || DatasetError::corrupt(format!("unsupported source CRS: {projjson}"));

    if let Some(identifier) = projjson.as_str() {
        return Crs::from_identifier(identifier).ok_or_else(unsupported);
    }

    let id = projjson
        .get("id")
        .or_else(|| projjson.get("ids").and_then(|ids| ids.get(0)))
        .ok_or_else(unsupported)?;
    let authority = id.get("authority").and_then(serde_json::Value::as_str).ok_or_else(unsupported)?;
    let code = match id.get("code") {
        Some(serde_json::Value::Number(n)) => n.to_string(),
        Some(serde_json::Value::String(s)) => s.clone(),
        _ => return Err(unsupported()),
    };

    Crs::from_identifier(&format!("{authority}:{code}")).ok_or_else(unsupported)
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn sql_string_literal(path: &Path) -> Result<String, DatasetError> {
    let path = path
        .to_str()
        .ok_or_else(|| DatasetError::corrupt(format!("path is not valid UTF-8: {}", path.display())))?;
    Ok(format!("'{}'", path.replace('\'', "''")))
}


#[cfg(test)]
mod tests {
    use super::fixtures::{
        GEOGRAPHIC_RECTANGLES, WGS84_METADATA, metadata_with_crs, write_fixture,
    };
    use super::*;

    #[test]
    fn reads_geoparquet_rows_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parcels.parquet");
        write_fixture(&path, Some(WGS84_METADATA), GEOGRAPHIC_RECTANGLES);

        let (crs, parcels) = read(&path).unwrap();
        assert_eq!(crs, Crs::Wgs84);
        assert_eq!(parcels.len(), 2);
        assert_eq!(parcels[0].owner_name.as_deref(), Some("SMITH JOHN"));
        assert_eq!(parcels[0].zip_code.as_deref(), Some("53186"));
        assert_eq!(parcels[0].estimated_value, Some(250_000.0));
        assert_eq!(parcels[1].estimated_value, None);
        assert_eq!(parcels[1].url, None);
        assert!((parcels[1].acres - 3.5).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_geo_metadata_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.parquet");
        write_fixture(&path, None, GEOGRAPHIC_RECTANGLES);

        let err = read(&path).unwrap_err();
        assert!(err.to_string().contains("no GeoParquet 'geo' metadata"), "{err}");
    }

    #[test]
    fn projjson_crs_is_reported_natively() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("projected.parquet");
        let metadata = metadata_with_crs(r#"{"id":{"authority":"EPSG","code":32616}}"#);
        write_fixture(
            &path,
            Some(&metadata),
            [[500_000.0, 4_760_000.0, 500_100.0, 4_760_100.0]; 2],
        );

        let (crs, parcels) = read(&path).unwrap();
        assert_eq!(crs, Crs::from_epsg(32616));
        assert!((parcels[0].geometry.0[0].exterior().0[0].x - 500_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn projjson_ids_resolve() {
        let utm = serde_json::json!({"id": {"authority": "EPSG", "code": 32616}});
        assert_eq!(crs_from_projjson(&utm).unwrap().epsg(), 32616);

        let crs84 = serde_json::json!({"id": {"authority": "OGC", "code": "CRS84"}});
        assert_eq!(crs_from_projjson(&crs84).unwrap(), Crs::Wgs84);

        let mercator = serde_json::json!({"ids": [{"authority": "EPSG", "code": "3857"}]});
        assert_eq!(crs_from_projjson(&mercator).unwrap(), Crs::from_epsg(3857));

        let esri = serde_json::json!({"id": {"authority": "ESRI", "code": 102_100}});
        assert!(crs_from_projjson(&esri).is_err());

        let anonymous = serde_json::json!({"type": "ProjectedCRS", "name": "custom"});
        assert!(crs_from_projjson(&anonymous).is_err());
    }

    #[test]
    fn quotes_are_escaped() {
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
        assert_eq!(
            sql_string_literal(Path::new("/tmp/o'brien.parquet")).unwrap(),
            "'/tmp/o''brien.parquet'"
        );
    }
}
