//! Season selector values and the months they cover.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Season filter applied to qualifying dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    #[default]
    All,
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    /// Zero-based month ordinals (January = 0).
    pub fn months(self) -> &'static [u32] {
        match self {
            Season::All => &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
            Season::Winter => &[11, 0, 1],
            Season::Spring => &[2, 3, 4],
            Season::Summer => &[5, 6, 7],
            Season::Fall => &[8, 9, 10],
        }
    }

    pub fn contains_month0(self, month0: u32) -> bool {
        self.months().contains(&month0)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Season::All => "all",
            Season::Winter => "winter",
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Fall => "fall",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Never fails: unrecognised selector values fall through to [`Season::All`].
impl FromStr for Season {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let season = match s.trim().to_ascii_lowercase().as_str() {
            "winter" | "djf" | "sel-djf" => Season::Winter,
            "spring" | "mam" | "sel-mam" => Season::Spring,
            "summer" | "jja" | "sel-jja" => Season::Summer,
            "fall" | "autumn" | "son" | "sel-son" => Season::Fall,
            _ => Season::All,
        };
        Ok(season)
    }
}
