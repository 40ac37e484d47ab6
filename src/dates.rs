//! Composition of the set of dates to composite fog statistics over.
//!
//! Every station with an active [`Mode`] contributes the set of days on which
//! it reached its own cutoff. Those sets are intersected; with no active
//! station every observed day is used. The result is then restricted to the
//! selected season.

use chrono::{Datelike, NaiveDate};
use std::collections::BTreeSet;
use tracing::debug;

use crate::observation::{Observation, all_dates, station_subset};
use crate::season::Season;
use crate::station::Station;

pub type DateSet = BTreeSet<NaiveDate>;

/// Intersection of every set yielded by `sets`, or `None` if there were none.
pub fn intersect_all<I>(sets: I) -> Option<DateSet>
where
    I: IntoIterator<Item = DateSet>,
{
    sets.into_iter()
        .reduce(|acc, next| acc.intersection(&next).copied().collect())
}

/// Days on which a station's peak fog met `cutoff`.
pub fn station_dates(observations: &[Observation], station: &str, cutoff: i32) -> DateSet {
    station_subset(observations, station)
        .filter(|o| o.peakfog >= cutoff)
        .map(|o| o.date)
        .collect()
}

/// Per-station date sets for every active station, in station order.
pub fn active_date_sets(stations: &[Station], observations: &[Observation]) -> Vec<DateSet> {
    stations
        .iter()
        .filter_map(|s| {
            s.mode
                .cutoff()
                .map(|cutoff| station_dates(observations, &s.id, cutoff))
        })
        .collect()
}

/// Restricts `dates` to those falling in `season`.
pub fn filter_season(dates: DateSet, season: Season) -> DateSet {
    dates
        .into_iter()
        .filter(|d| season.contains_month0(d.month0()))
        .collect()
}

/// Computes the qualifying date set for the current station modes.
///
/// The global dense toggle plays no part here: each active station's own
/// mode picks its cutoff.
#[tracing::instrument(skip_all, fields(season = %season))]
pub fn qualifying_dates(
    stations: &[Station],
    observations: &[Observation],
    season: Season,
) -> DateSet {
    let sets = active_date_sets(stations, observations);
    let active = sets.len();

    let dates = intersect_all(sets).unwrap_or_else(|| all_dates(observations));
    let dates = filter_season(dates, season);

    debug!(active, qualifying = dates.len(), "Qualifying dates composed");
    dates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::station::Mode;
    use proptest::prelude::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn obs(station: &str, date: &str, peakfog: i32) -> Observation {
        Observation {
            station: station.to_string(),
            date: day(date),
            lon: -97.0,
            lat: 30.0,
            peakfog,
        }
    }

    fn station(id: &str, mode: Mode) -> Station {
        let mut s = Station::new(id, -97.0, 30.0);
        s.mode = mode;
        s
    }

    fn set(days: &[&str]) -> DateSet {
        days.iter().map(|d| day(d)).collect()
    }

    #[test]
    fn test_intersect_all_empty_is_none() {
        assert_eq!(intersect_all(Vec::<DateSet>::new()), None);
    }

    #[test]
    fn test_intersect_all_three_sets() {
        let a = set(&["2020-01-01", "2020-01-02", "2020-01-03"]);
        let b = set(&["2020-01-02", "2020-01-03"]);
        let c = set(&["2020-01-03", "2020-01-04"]);
        assert_eq!(intersect_all([a, b, c]), Some(set(&["2020-01-03"])));
    }

    #[test]
    fn test_no_active_station_uses_all_dates() {
        let data = vec![
            obs("S1", "2020-01-05", 4),
            obs("S1", "2020-06-10", 1),
            obs("S2", "2020-03-01", 0),
        ];
        let stations = vec![station("S1", Mode::None), station("S2", Mode::None)];

        let dates = qualifying_dates(&stations, &data, Season::All);
        assert_eq!(dates, all_dates(&data));
    }

    #[test]
    fn test_single_active_station_uses_its_own_cutoff() {
        let data = vec![
            obs("S1", "2020-01-05", 4),
            obs("S1", "2020-01-06", 5),
            obs("S1", "2020-06-10", 1),
        ];

        let fog = qualifying_dates(&[station("S1", Mode::Fog)], &data, Season::All);
        assert_eq!(fog, set(&["2020-01-05", "2020-01-06"]));

        let dense = qualifying_dates(&[station("S1", Mode::Dense)], &data, Season::All);
        assert_eq!(dense, set(&["2020-01-06"]));
    }

    #[test]
    fn test_two_active_stations_intersect() {
        let data = vec![
            obs("S1", "2020-01-05", 3),
            obs("S1", "2020-01-06", 4),
            obs("S2", "2020-01-05", 4),
            obs("S2", "2020-01-06", 5),
        ];
        let stations = vec![station("S1", Mode::Fog), station("S2", Mode::Dense)];

        let dates = qualifying_dates(&stations, &data, Season::All);
        assert_eq!(dates, set(&["2020-01-06"]));
    }

    #[test]
    fn test_active_station_without_fog_empties_the_set() {
        let data = vec![obs("S1", "2020-01-05", 4), obs("S2", "2020-01-05", 0)];
        let stations = vec![station("S1", Mode::Fog), station("S2", Mode::Fog)];

        assert!(qualifying_dates(&stations, &data, Season::All).is_empty());
    }

    #[test]
    fn test_season_filter() {
        let dates = set(&["2020-01-05", "2020-06-10", "2020-12-31", "2020-08-31"]);
        assert_eq!(
            filter_season(dates.clone(), Season::Summer),
            set(&["2020-06-10", "2020-08-31"])
        );
        assert_eq!(
            filter_season(dates.clone(), Season::Winter),
            set(&["2020-01-05", "2020-12-31"])
        );
        assert_eq!(filter_season(dates.clone(), Season::All), dates);
    }

    #[test]
    fn test_month_filter_uses_calendar_month() {
        // First and last days of a month stay in that month.
        let dates = set(&["2020-03-01", "2020-02-29", "2020-05-31", "2020-06-01"]);
        assert_eq!(
            filter_season(dates, Season::Spring),
            set(&["2020-03-01", "2020-05-31"])
        );
    }

    fn date_set() -> impl Strategy<Value = DateSet> {
        prop::collection::btree_set(0i64..60, 0..20).prop_map(|offsets| {
            offsets
                .into_iter()
                .map(|o| day("2020-01-01") + chrono::Duration::days(o))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_intersection_commutative(a in date_set(), b in date_set()) {
            prop_assert_eq!(
                intersect_all([a.clone(), b.clone()]),
                intersect_all([b, a])
            );
        }

        #[test]
        fn prop_intersection_associative(a in date_set(), b in date_set(), c in date_set()) {
            let left = intersect_all([intersect_all([a.clone(), b.clone()]).unwrap(), c.clone()]);
            let right = intersect_all([a, intersect_all([b, c]).unwrap()]);
            prop_assert_eq!(left, right);
        }

        #[test]
        fn prop_intersection_idempotent(a in date_set()) {
            prop_assert_eq!(intersect_all([a.clone(), a.clone()]), Some(a));
        }

        #[test]
        fn prop_qualifying_is_subset_of_all_dates(
            peaks in prop::collection::vec((0usize..3, 0i64..40, 0i32..7), 1..60),
            modes in prop::collection::vec(0usize..3, 3),
        ) {
            let ids = ["S1", "S2", "S3"];
            let data: Vec<Observation> = peaks
                .iter()
                .map(|(s, d, p)| Observation {
                    station: ids[*s].to_string(),
                    date: day("2020-01-01") + chrono::Duration::days(*d),
                    lon: 0.0,
                    lat: 0.0,
                    peakfog: *p,
                })
                .collect();
            let stations: Vec<Station> = ids
                .iter()
                .zip(&modes)
                .map(|(id, m)| station(id, [Mode::None, Mode::Fog, Mode::Dense][*m]))
                .collect();

            let all = all_dates(&data);
            let qualifying = qualifying_dates(&stations, &data, Season::All);
            prop_assert!(qualifying.is_subset(&all));
        }
    }
}
