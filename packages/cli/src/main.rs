#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the parcel filtering engine.
//!
//! ```text
//! parcel_map options [--data optimized.parquet]
//! parcel_map filter [--data optimized.parquet] [--acres-min 1 --acres-max 5]
//!     [--owner smith] [--place "CITY OF WAUKESHA"]... [--zip 53186]...
//!     [--school-district WAUKESHA]... [--value-min 0 --value-max 500000]
//!     [--lat 43.01 --lon -88.23 [--radius-miles 3]] [--geojson out.geojson]
//!     [--histogram acres]... [--bins 50]
//! ```
//!
//! Both subcommands print JSON to stdout. `--config` points at an engine
//! TOML file; without it the built-in defaults apply.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use parcel_map_dataset::DEFAULT_DATA_FILE;
use parcel_map_engine::{
    DEFAULT_HISTOGRAM_BINS, Distribution, EngineConfig, FilterResult, Marker, ParcelEngine, Summary,
};
use parcel_map_parcel_models::criteria::DEFAULT_RADIUS_MILES;
use parcel_map_parcel_models::{FilterCriteria, MapView, Metric, ProximityQuery, ValueRange};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "parcel_map", about = "Query the county parcel dataset")]
struct Cli {
    /// Engine configuration TOML file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the distinct values available to each filter
    Options {
        /// Parcel data file (GeoParquet or GeoJSON)
        #[arg(long, default_value = DEFAULT_DATA_FILE)]
        data: PathBuf,
    },
    /// Filter parcels and print a result report
    Filter {
        /// Parcel data file (GeoParquet or GeoJSON)
        #[arg(long, default_value = DEFAULT_DATA_FILE)]
        data: PathBuf,

        /// Minimum acreage
        #[arg(long)]
        acres_min: Option<f64>,
        /// Maximum acreage
        #[arg(long)]
        acres_max: Option<f64>,

        /// Case-insensitive owner name substring
        #[arg(long)]
        owner: Option<String>,

        /// Allowed place names (repeatable)
        #[arg(long = "place")]
        places: Vec<String>,
        /// Allowed zip codes (repeatable)
        #[arg(long = "zip")]
        zips: Vec<String>,
        /// Allowed school districts (repeatable)
        #[arg(long = "school-district")]
        school_districts: Vec<String>,

        /// Minimum market value in dollars
        #[arg(long)]
        value_min: Option<f64>,
        /// Maximum market value in dollars
        #[arg(long)]
        value_max: Option<f64>,

        /// Latitude of the proximity search center
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,
        /// Longitude of the proximity search center
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
        /// Proximity search radius in miles
        #[arg(long, default_value_t = DEFAULT_RADIUS_MILES)]
        radius_miles: f64,

        /// Write the rendered parcels to this `GeoJSON` file
        #[arg(long)]
        geojson: Option<PathBuf>,

        /// Report the distribution of this metric (repeatable; default all)
        #[arg(long = "histogram")]
        histograms: Vec<Metric>,
        /// Histogram bins per metric
        #[arg(long, default_value_t = DEFAULT_HISTOGRAM_BINS)]
        bins: usize,
    },
}

/// JSON report printed by `filter`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FilterReport {
    count: usize,
    truncated: bool,
    render_cap: usize,
    rendered: usize,
    map_view: MapView,
    summary: Summary,
    markers: Vec<Marker>,
    distributions: Vec<Distribution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl FilterReport {
    fn new(result: &FilterResult, distributions: Vec<Distribution>, message: Option<String>) -> Self {
        Self {
            count: result.count(),
            truncated: result.truncated(),
            render_cap: result.render_cap(),
            rendered: result.rendered().len(),
            map_view: result.map_view(),
            summary: result.summary(),
            markers: result.markers(),
            distributions,
            message,
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    Ok(match path {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let engine = ParcelEngine::new(load_config(cli.config.as_deref())?)?;

    match cli.command {
        Commands::Options { data } => {
            let dataset = ParcelEngine::load_dataset(&data)?;
            let options = engine.compute_filter_options(&dataset);
            println!("{}", serde_json::to_string_pretty(&options)?);
        }
        Commands::Filter {
            data,
            acres_min,
            acres_max,
            owner,
            places,
            zips,
            school_districts,
            value_min,
            value_max,
            lat,
            lon,
            radius_miles,
            geojson,
            histograms,
            bins,
        } => {
            let defaults = FilterCriteria::default();
            let criteria = FilterCriteria {
                acres: ValueRange::new(
                    acres_min.unwrap_or(defaults.acres.min),
                    acres_max.unwrap_or(defaults.acres.max),
                ),
                owner_name: owner,
                place_names: places.into_iter().collect(),
                zip_codes: zips.into_iter().collect(),
                school_districts: school_districts.into_iter().collect(),
                market_value: ValueRange::new(
                    value_min.unwrap_or(defaults.market_value.min),
                    value_max.unwrap_or(defaults.market_value.max),
                ),
                proximity: lat.zip(lon).map(|(latitude, longitude)| ProximityQuery {
                    latitude,
                    longitude,
                    radius_miles,
                }),
            };

            let dataset = ParcelEngine::load_dataset(&data)?;
            let (result, message) = match engine.filter(&dataset, &criteria) {
                Ok(result) => (result, None),
                Err(e) if e.is_out_of_region() => {
                    eprintln!("{e}");
                    (engine.empty_result(), Some(e.to_string()))
                }
                Err(e) => return Err(e.into()),
            };

            if let Some(path) = geojson {
                let collection = result.to_feature_collection();
                std::fs::write(&path, serde_json::to_string_pretty(&collection)?)?;
                log::info!(
                    "Wrote {} features to {}",
                    collection.features.len(),
                    path.display()
                );
            }

            let metrics = if histograms.is_empty() {
                Metric::all()
            } else {
                histograms.as_slice()
            };
            let report = FilterReport::new(&result, result.distributions(metrics, bins), message);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
