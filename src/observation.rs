//! Daily station observations loaded from CSV.
//!
//! Rows that fail to parse are dropped and counted rather than aborting the
//! load; the count is surfaced to the operator through [`LoadReport`].

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::io::Read;
use tracing::{debug, warn};

use crate::error::Result;

/// One row per station per day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub station: String,
    #[serde(deserialize_with = "deserialize_day")]
    pub date: NaiveDate,
    pub lon: f64,
    pub lat: f64,
    pub peakfog: i32,
}

/// Result of parsing an observation table.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub observations: Vec<Observation>,
    pub dropped: usize,
}

/// Accepts `YYYY-MM-DD` as well as full ISO 8601 timestamps, keyed by their
/// first ten characters.
fn deserialize_day<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let day = raw.get(..10).unwrap_or(&raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(serde::de::Error::custom)
}

/// Parses a `station,date,lon,lat,peakfog` table from any reader.
///
/// # Errors
///
/// Only fails when the header row itself cannot be read. Malformed data rows
/// are skipped and counted in [`LoadReport::dropped`].
pub fn parse_observations<R: Read>(reader: R) -> Result<LoadReport> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    // Surface a broken header as a hard error instead of dropping every row.
    rdr.headers()?;

    let mut report = LoadReport::default();

    for result in rdr.deserialize::<Observation>() {
        match result {
            Ok(obs) if obs.lon.is_finite() && obs.lat.is_finite() => {
                report.observations.push(obs);
            }
            Ok(obs) => {
                warn!(station = %obs.station, date = %obs.date, "Dropping row with non-finite location");
                report.dropped += 1;
            }
            Err(e) => {
                let line = e.position().map(|p| p.line());
                warn!(line, error = %e, "Dropping malformed observation row");
                report.dropped += 1;
            }
        }
    }

    debug!(
        rows = report.observations.len(),
        dropped = report.dropped,
        "Observation table parsed"
    );

    Ok(report)
}

/// Parses observations from raw bytes (file contents or an HTTP body).
pub fn parse_observation_bytes(bytes: &[u8]) -> Result<LoadReport> {
    parse_observations(bytes)
}

/// Every distinct date present in the observations.
pub fn all_dates(observations: &[Observation]) -> BTreeSet<NaiveDate> {
    observations.iter().map(|o| o.date).collect()
}

/// Observations belonging to a single station.
pub fn station_subset<'a>(
    observations: &'a [Observation],
    station: &'a str,
) -> impl Iterator<Item = &'a Observation> + 'a {
    observations.iter().filter(move |o| o.station == station)
}
