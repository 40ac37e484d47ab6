//! Station registry and per-station classification mode.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::error::{FogError, Result};
use crate::observation::Observation;

/// Peak fog intensity that counts as fog.
pub const FOG_CUTOFF: i32 = 3;
/// Peak fog intensity that counts as dense fog.
pub const DENSE_CUTOFF: i32 = 5;

/// Classification a user assigns to a station by clicking its marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    None,
    Fog,
    Dense,
}

impl Mode {
    /// Next mode in the `none -> fog -> dense -> none` cycle.
    pub fn next(self) -> Self {
        match self {
            Mode::None => Mode::Fog,
            Mode::Fog => Mode::Dense,
            Mode::Dense => Mode::None,
        }
    }

    /// Intensity cutoff this station imposes on date qualification.
    ///
    /// Independent of the global dense toggle.
    pub fn cutoff(self) -> Option<i32> {
        match self {
            Mode::None => None,
            Mode::Fog => Some(FOG_CUTOFF),
            Mode::Dense => Some(DENSE_CUTOFF),
        }
    }

    pub fn is_active(self) -> bool {
        self.cutoff().is_some()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::None => "none",
            Mode::Fog => "fog",
            Mode::Dense => "dense",
        }
    }

    /// Marker class name, e.g. `site-fog`.
    pub fn class(self) -> String {
        format!("site-{}", self.as_str())
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = FogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().trim_start_matches("site-") {
            "none" => Ok(Mode::None),
            "fog" => Ok(Mode::Fog),
            "dense" => Ok(Mode::Dense),
            _ => Err(FogError::InvalidMode {
                value: s.to_string(),
            }),
        }
    }
}

/// A fixed-location fog observation site.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Station {
    pub id: String,
    pub lon: f64,
    pub lat: f64,
    pub mode: Mode,
    /// Fraction of qualifying days with fog; `None` when no day qualified.
    pub val: Option<f64>,
    pub total: usize,
    pub foggy: usize,
}

impl Station {
    pub fn new(id: impl Into<String>, lon: f64, lat: f64) -> Self {
        Self {
            id: id.into(),
            lon,
            lat,
            mode: Mode::None,
            val: None,
            total: 0,
            foggy: 0,
        }
    }

    pub fn cycle_mode(&mut self) {
        self.mode = self.mode.next();
    }
}

/// Derives the distinct stations, in first-appearance order, locating each
/// from a representative observation.
///
/// # Errors
///
/// [`FogError::MissingRepresentative`] if a derived id has no observation,
/// which means the observation table changed underneath us.
pub fn build_stations(observations: &[Observation]) -> Result<Vec<Station>> {
    let mut seen = HashSet::new();
    let ids: Vec<&str> = observations
        .iter()
        .map(|o| o.station.as_str())
        .filter(|id| seen.insert(*id))
        .collect();

    let mut stations = Vec::with_capacity(ids.len());

    for id in ids {
        let rep = observations
            .iter()
            .find(|o| o.station == id)
            .ok_or_else(|| FogError::MissingRepresentative {
                station: id.to_string(),
            })?;

        debug!(station = id, lon = rep.lon, lat = rep.lat, "Station registered");
        stations.push(Station::new(id, rep.lon, rep.lat));
    }

    Ok(stations)
}

/// Looks up a station by id.
pub fn find_station_mut<'a>(stations: &'a mut [Station], id: &str) -> Result<&'a mut Station> {
    stations
        .iter_mut()
        .find(|s| s.id == id)
        .ok_or_else(|| FogError::UnknownStation {
            station: id.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn obs(station: &str, date: &str, lon: f64, lat: f64, peakfog: i32) -> Observation {
        Observation {
            station: station.to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            lon,
            lat,
            peakfog,
        }
    }

    #[test]
    fn test_mode_cycle_is_three_periodic() {
        for mode in [Mode::None, Mode::Fog, Mode::Dense] {
            assert_eq!(mode.next().next().next(), mode);
            assert_ne!(mode.next(), mode);
        }
    }

    #[test]
    fn test_mode_cycle_order() {
        assert_eq!(Mode::None.next(), Mode::Fog);
        assert_eq!(Mode::Fog.next(), Mode::Dense);
        assert_eq!(Mode::Dense.next(), Mode::None);
    }

    #[test]
    fn test_mode_cutoffs() {
        assert_eq!(Mode::None.cutoff(), None);
        assert_eq!(Mode::Fog.cutoff(), Some(3));
        assert_eq!(Mode::Dense.cutoff(), Some(5));
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("fog".parse::<Mode>().unwrap(), Mode::Fog);
        assert_eq!("DENSE".parse::<Mode>().unwrap(), Mode::Dense);
        assert_eq!("site-none".parse::<Mode>().unwrap(), Mode::None);
        assert!("haze".parse::<Mode>().is_err());
        assert_eq!(Mode::Dense.class(), "site-dense");
    }

    #[test]
    fn test_build_stations_distinct_and_ordered() {
        let data = vec![
            obs("KSAT", "2020-01-01", -98.47, 29.53, 0),
            obs("KAUS", "2020-01-01", -97.67, 30.19, 0),
            obs("KSAT", "2020-01-02", -98.47, 29.53, 3),
        ];
        let stations = build_stations(&data).unwrap();

        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].id, "KSAT");
        assert_eq!(stations[1].id, "KAUS");
        assert_eq!(stations[1].lon, -97.67);
        assert_eq!(stations[1].lat, 30.19);
        assert!(stations.iter().all(|s| s.mode == Mode::None && s.val.is_none()));
    }

    #[test]
    fn test_build_stations_empty() {
        assert!(build_stations(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_find_station_mut_unknown() {
        let mut stations = vec![Station::new("KAUS", 0.0, 0.0)];
        assert!(find_station_mut(&mut stations, "KAUS").is_ok());
        assert!(matches!(
            find_station_mut(&mut stations, "KXYZ"),
            Err(FogError::UnknownStation { .. })
        ));
    }
}
