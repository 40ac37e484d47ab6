//! Per-station fog-occurrence fractions over the qualifying dates.

use tracing::debug;

use crate::dates::DateSet;
use crate::observation::{Observation, station_subset};
use crate::station::{DENSE_CUTOFF, FOG_CUTOFF, Station};

/// Global intensity threshold chosen by the dense toggle.
pub fn fog_threshold(dense: bool) -> i32 {
    if dense { DENSE_CUTOFF } else { FOG_CUTOFF }
}

/// `part / total`, or `None` when nothing was counted.
pub fn ratio(part: usize, total: usize) -> Option<f64> {
    if total == 0 {
        None
    } else {
        Some(part as f64 / total as f64)
    }
}

/// Recomputes `val`, `total` and `foggy` for every station in place.
#[tracing::instrument(skip_all, fields(qualifying = qualifying.len(), threshold = threshold))]
pub fn compute_fractions(
    stations: &mut [Station],
    observations: &[Observation],
    qualifying: &DateSet,
    threshold: i32,
) {
    for station in stations.iter_mut() {
        let (total, foggy) = station_subset(observations, &station.id)
            .filter(|o| qualifying.contains(&o.date))
            .fold((0usize, 0usize), |(total, foggy), o| {
                (total + 1, foggy + usize::from(o.peakfog >= threshold))
            });

        station.total = total;
        station.foggy = foggy;
        station.val = ratio(foggy, total);

        debug!(station = %station.id, total, foggy, val = ?station.val, "Fraction computed");
    }
}
