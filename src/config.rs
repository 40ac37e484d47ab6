//! Map configuration.
//!
//! Defaults reproduce the standard map. A JSON file may override any subset
//! of fields:
//! ```json
//! {
//!   "width": 1200,
//!   "state_fips": "06",
//!   "counties": ["06001", "06013"]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;
use crate::geography::fips::{DEFAULT_COUNTIES, DEFAULT_STATE};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 10,
            right: 30,
            bottom: 50,
            left: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Full SVG width in pixels.
    pub width: u32,
    /// Full SVG height in pixels.
    pub height: u32,
    pub margin: Margin,
    pub state_fips: String,
    pub counties: Vec<String>,
    pub states_object: String,
    pub counties_object: String,
    /// Fractions at or above this value get the darkest color.
    pub color_domain_max: f64,
    pub marker_radius: u32,
    pub label_offset: i32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 850,
            height: 600,
            margin: Margin::default(),
            state_fips: DEFAULT_STATE.to_string(),
            counties: DEFAULT_COUNTIES.iter().map(|c| c.to_string()).collect(),
            states_object: "states".to_string(),
            counties_object: "counties".to_string(),
            color_domain_max: 0.6,
            marker_radius: 8,
            label_offset: 8,
        }
    }
}

impl MapConfig {
    /// Loads the config from a JSON file at `path`; missing fields keep
    /// their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Drawing box inside the margins, where the projection is fitted.
    pub fn inner_size(&self) -> (f64, f64) {
        let m = &self.margin;
        (
            self.width.saturating_sub(m.left + m.right) as f64,
            self.height.saturating_sub(m.top + m.bottom) as f64,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    #[test]
    fn test_default_inner_size() {
        assert_eq!(MapConfig::default().inner_size(), (760.0, 540.0));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let cfg: MapConfig =
            serde_json::from_str(r#"{"width": 1000, "state_fips": "06"}"#).unwrap();
        assert_eq!(cfg.width, 1000);
        assert_eq!(cfg.height, 600);
        assert_eq!(cfg.state_fips, "06");
        assert_eq!(cfg.counties.len(), DEFAULT_COUNTIES.len());
        assert_eq!(cfg.color_domain_max, 0.6);
    }

    #[test]
    fn test_load_from_file() {
        let path = env::temp_dir().join("fogmap_test_config.json");
        fs::write(&path, r#"{"counties": ["48453"], "marker_radius": 6}"#).unwrap();

        let cfg = MapConfig::load(&path).unwrap();
        assert_eq!(cfg.counties, vec!["48453"]);
        assert_eq!(cfg.marker_radius, 6);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_missing_file_is_error() {
        assert!(MapConfig::load("/nonexistent/fogmap.json").is_err());
    }
}
