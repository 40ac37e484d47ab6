//! Output formatting and persistence for station fractions.
//!
//! Supports pretty-printing, JSON logging, a CSV table and a GeoJSON layer of
//! station markers.

use csv::WriterBuilder;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde::Serialize;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

use crate::error::Result;
use crate::render::color::percent_label;
use crate::season::Season;
use crate::station::{Mode, Station};

/// One station's row in the summary table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationRecord {
    pub station: String,
    pub lon: f64,
    pub lat: f64,
    pub mode: Mode,
    pub total: usize,
    pub foggy: usize,
    pub fraction: Option<f64>,
    pub percent: String,
}

impl From<&Station> for StationRecord {
    fn from(s: &Station) -> Self {
        Self {
            station: s.id.clone(),
            lon: s.lon,
            lat: s.lat,
            mode: s.mode,
            total: s.total,
            foggy: s.foggy,
            fraction: s.val,
            percent: percent_label(s.val),
        }
    }
}

/// Everything shown on the map after one recompute.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub season: Season,
    pub dense: bool,
    pub threshold: i32,
    pub qualifying_days: usize,
    pub stations: Vec<StationRecord>,
}

/// Logs the report using Rust's debug pretty-print format.
pub fn print_pretty(report: &SummaryReport) {
    debug!("{:#?}", report);
}

/// Logs the report as pretty-printed JSON.
pub fn print_json(report: &SummaryReport) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Writes one CSV row per station, replacing any existing file.
pub fn write_summary(path: impl AsRef<Path>, stations: &[Station]) -> Result<()> {
    let path = path.as_ref();
    debug!(path = %path.display(), rows = stations.len(), "Writing CSV summary");

    let file = File::create(path)?;
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);

    for station in stations {
        writer.serialize(StationRecord::from(station))?;
    }
    writer.flush()?;

    Ok(())
}

/// Station markers as GeoJSON points carrying their mode and fraction.
pub fn to_feature_collection(stations: &[Station]) -> FeatureCollection {
    let features = stations
        .iter()
        .map(|s| {
            let mut properties = JsonObject::new();
            properties.insert("station".to_string(), s.id.clone().into());
            properties.insert("mode".to_string(), s.mode.as_str().into());
            properties.insert("total".to_string(), s.total.into());
            properties.insert("foggy".to_string(), s.foggy.into());
            properties.insert(
                "fraction".to_string(),
                s.val.map_or(serde_json::Value::Null, Into::into),
            );
            properties.insert("label".to_string(), percent_label(s.val).into());

            Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Point(vec![s.lon, s.lat]))),
                id: Some(geojson::feature::Id::String(s.id.clone())),
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Writes the station layer as a GeoJSON file.
pub fn write_geojson(path: impl AsRef<Path>, stations: &[Station]) -> Result<()> {
    let collection = to_feature_collection(stations);
    std::fs::write(path, collection.to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> std::path::PathBuf {
        env::temp_dir().join(name)
    }

    fn stations() -> Vec<Station> {
        let mut a = Station::new("KAUS", -97.67, 30.19);
        a.mode = Mode::Dense;
        a.total = 4;
        a.foggy = 1;
        a.val = Some(0.25);
        vec![a, Station::new("KSAT", -98.47, 29.53)]
    }

    fn report() -> SummaryReport {
        SummaryReport {
            season: Season::Winter,
            dense: false,
            threshold: 3,
            qualifying_days: 4,
            stations: stations().iter().map(StationRecord::from).collect(),
        }
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&report());
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&report()).unwrap();
    }

    #[test]
    fn test_write_summary_rows() {
        let path = temp_path("fogmap_test_summary.csv");
        let _ = fs::remove_file(&path);

        write_summary(&path, &stations()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("station,lon,lat,mode,total,foggy,fraction,percent"));
        assert!(lines[1].contains("KAUS"));
        assert!(lines[1].contains("dense"));
        assert!(lines[1].contains("25%"));
        assert!(lines[2].contains("n/a"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_summary_overwrites() {
        let path = temp_path("fogmap_test_summary_overwrite.csv");
        let _ = fs::remove_file(&path);

        write_summary(&path, &stations()).unwrap();
        write_summary(&path, &stations()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 3);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_feature_collection() {
        let fc = to_feature_collection(&stations());
        assert_eq!(fc.features.len(), 2);

        let first = &fc.features[0];
        assert_eq!(first.property("mode").and_then(|v| v.as_str()), Some("dense"));
        assert_eq!(first.property("fraction").and_then(|v| v.as_f64()), Some(0.25));
        assert!(fc.features[1].property("fraction").unwrap().is_null());
    }

    #[test]
    fn test_write_geojson_is_valid_json() {
        let path = temp_path("fogmap_test_stations.geojson");
        write_geojson(&path, &stations()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let parsed: geojson::GeoJson = content.parse().unwrap();
        assert!(matches!(parsed, geojson::GeoJson::FeatureCollection(_)));

        fs::remove_file(&path).unwrap();
    }
}
