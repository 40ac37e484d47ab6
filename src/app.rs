//! Application state and the single-threaded event loop.
//!
//! All mutable state lives in [`AppState`]. Each [`Event`] is applied by the
//! pure [`apply`] function and followed by a full recompute of qualifying
//! dates and fractions; the [`Controller`] runs one event to completion
//! before accepting the next.

use anyhow::Context;
use std::str::FromStr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};

use crate::config::MapConfig;
use crate::dates::{DateSet, qualifying_dates};
use crate::error::{FogError, Result};
use crate::fetch::{HttpClient, load_source};
use crate::fraction::{compute_fractions, fog_threshold};
use crate::geography::{Geography, Topology};
use crate::observation::{Observation, parse_observation_bytes};
use crate::output::{StationRecord, SummaryReport};
use crate::render::render_svg;
use crate::season::Season;
use crate::station::{Mode, Station, build_stations, find_station_mut};

/// The closed set of UI events.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    SeasonChanged(Season),
    ThresholdToggled(bool),
    StationModeCycled(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub stations: Vec<Station>,
    pub season: Season,
    /// Dense toggle; raises the fraction threshold from 3 to 5.
    pub dense: bool,
}

impl AppState {
    pub fn new(stations: Vec<Station>) -> Self {
        Self {
            stations,
            season: Season::All,
            dense: false,
        }
    }

    pub fn threshold(&self) -> i32 {
        fog_threshold(self.dense)
    }
}

/// Applies one event, returning the next state.
///
/// # Errors
///
/// [`FogError::UnknownStation`] if a cycled station does not exist; the
/// input state is consumed either way, so callers that need to keep it on
/// failure should pass a clone.
pub fn apply(mut state: AppState, event: &Event) -> Result<AppState> {
    match event {
        Event::SeasonChanged(season) => state.season = *season,
        Event::ThresholdToggled(dense) => state.dense = *dense,
        Event::StationModeCycled(id) => find_station_mut(&mut state.stations, id)?.cycle_mode(),
    }
    Ok(state)
}

/// Result of recomputing the map for a state.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub qualifying: DateSet,
    pub threshold: i32,
    pub season: Season,
}

/// Recomputes qualifying dates and every station's fraction.
pub fn recompute(state: &mut AppState, observations: &[Observation]) -> Snapshot {
    let qualifying = qualifying_dates(&state.stations, observations, state.season);
    let threshold = state.threshold();
    compute_fractions(&mut state.stations, observations, &qualifying, threshold);

    Snapshot {
        qualifying,
        threshold,
        season: state.season,
    }
}

/// Owns the observations, geometry and state for one session.
pub struct Controller {
    observations: Vec<Observation>,
    geography: Geography,
    config: MapConfig,
    state: AppState,
    snapshot: Snapshot,
}

impl Controller {
    /// Builds the station registry and performs the initial recompute.
    pub fn new(
        observations: Vec<Observation>,
        geography: Geography,
        config: MapConfig,
    ) -> Result<Self> {
        let stations = build_stations(&observations)?;
        let mut state = AppState::new(stations);
        let snapshot = recompute(&mut state, &observations);

        Ok(Self {
            observations,
            geography,
            config,
            state,
            snapshot,
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn stations(&self) -> &[Station] {
        &self.state.stations
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Applies an event and recomputes. On error the state is unchanged.
    #[tracing::instrument(skip(self))]
    pub fn dispatch(&mut self, event: Event) -> Result<&Snapshot> {
        let mut next = apply(self.state.clone(), &event)?;
        self.snapshot = recompute(&mut next, &self.observations);
        self.state = next;

        info!(
            season = %self.snapshot.season,
            threshold = self.snapshot.threshold,
            qualifying_days = self.snapshot.qualifying.len(),
            "State recomputed"
        );
        Ok(&self.snapshot)
    }

    /// Cycles a station until it reaches `mode`.
    pub fn set_mode(&mut self, station: &str, mode: Mode) -> Result<&Snapshot> {
        let current = self
            .state
            .stations
            .iter()
            .find(|s| s.id == station)
            .map(|s| s.mode)
            .ok_or_else(|| FogError::UnknownStation {
                station: station.to_string(),
            })?;

        let mut m = current;
        while m != mode {
            self.dispatch(Event::StationModeCycled(station.to_string()))?;
            m = m.next();
        }
        Ok(&self.snapshot)
    }

    pub fn render(&self) -> Result<String> {
        render_svg(
            &self.geography,
            &self.state.stations,
            self.snapshot.qualifying.len(),
            &self.config,
        )
    }

    pub fn report(&self) -> SummaryReport {
        SummaryReport {
            season: self.state.season,
            dense: self.state.dense,
            threshold: self.snapshot.threshold,
            qualifying_days: self.snapshot.qualifying.len(),
            stations: self.state.stations.iter().map(StationRecord::from).collect(),
        }
    }
}

/// A line of input to the interactive loop.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Apply(Event),
    SetMode(String, Mode),
    Show,
    Quit,
}

impl Command {
    /// Parses a command, resolving `dense toggle` against the current state.
    pub fn parse(line: &str, state: &AppState) -> std::result::Result<Self, String> {
        let mut words = line.split_whitespace();
        let verb = words.next().unwrap_or_default().to_ascii_lowercase();
        let args: Vec<&str> = words.collect();

        match (verb.as_str(), args.as_slice()) {
            ("season", [name]) => Ok(Command::Apply(Event::SeasonChanged(
                Season::from_str(name).unwrap_or_default(),
            ))),
            ("dense", [flag]) => {
                let dense = match flag.to_ascii_lowercase().as_str() {
                    "on" | "true" | "1" => true,
                    "off" | "false" | "0" => false,
                    "toggle" => !state.dense,
                    other => return Err(format!("expected on, off or toggle, got '{other}'")),
                };
                Ok(Command::Apply(Event::ThresholdToggled(dense)))
            }
            ("click", [station]) => Ok(Command::Apply(Event::StationModeCycled(
                station.to_string(),
            ))),
            ("mode", [station, mode]) => mode
                .parse::<Mode>()
                .map(|m| Command::SetMode(station.to_string(), m))
                .map_err(|e| e.to_string()),
            ("show", []) => Ok(Command::Show),
            ("quit" | "exit", []) => Ok(Command::Quit),
            _ => Err(format!("unrecognised command '{}'", line.trim())),
        }
    }
}

/// Reads commands line by line, applying each to completion before reading
/// the next. `on_update` runs after every applied event and on `show`.
///
/// Bad commands and unknown stations are logged and skipped. Returns the
/// number of events applied.
pub async fn run_event_loop<R, F>(
    controller: &mut Controller,
    reader: R,
    mut on_update: F,
) -> anyhow::Result<usize>
where
    R: AsyncBufRead + Unpin,
    F: FnMut(&Controller) -> anyhow::Result<()>,
{
    let mut lines = reader.lines();
    let mut applied = 0;

    while let Some(line) = lines.next_line().await.context("failed to read command")? {
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }

        let command = match Command::parse(&line, controller.state()) {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Ignoring command");
                continue;
            }
        };

        let outcome = match command {
            Command::Quit => break,
            Command::Show => {
                on_update(controller)?;
                continue;
            }
            Command::Apply(event) => controller.dispatch(event).map(|_| ()),
            Command::SetMode(station, mode) => controller.set_mode(&station, mode).map(|_| ()),
        };

        match outcome {
            Ok(()) => {
                applied += 1;
                on_update(controller)?;
            }
            Err(e) => warn!(error = %e, "Event rejected"),
        }
    }

    info!(applied, "Event loop finished");
    Ok(applied)
}

/// Loads observations and topology concurrently, then builds the session.
///
/// Nothing is built until both loads have succeeded. Returns the controller
/// and the number of malformed observation rows that were dropped.
pub async fn start<C: HttpClient>(
    client: &C,
    data_source: &str,
    topology_source: &str,
    config: MapConfig,
) -> anyhow::Result<(Controller, usize)> {
    let (data, topo) = tokio::try_join!(
        load_source(client, data_source),
        load_source(client, topology_source)
    )?;

    let report = parse_observation_bytes(&data)
        .with_context(|| format!("failed to parse observations from {data_source}"))?;
    if report.dropped > 0 {
        warn!(dropped = report.dropped, "Malformed observation rows dropped");
    }

    let topology = Topology::from_slice(&topo)
        .with_context(|| format!("failed to parse topology from {topology_source}"))?;
    let geography = Geography::from_topology(&topology, &config)?;

    let controller = Controller::new(report.observations, geography, config)?;
    info!(
        observations = controller.observations().len(),
        stations = controller.stations().len(),
        dropped = report.dropped,
        "Session started"
    );

    Ok((controller, report.dropped))
}
