//! CLI entry point for fogmap.
//!
//! Renders fog-occurrence fractions for weather stations onto a county map,
//! either once from command-line selections or interactively from commands
//! read on stdin.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use fogmap::app::{Controller, Event, run_event_loop, start};
use fogmap::config::MapConfig;
use fogmap::fetch::{BasicClient, load_source};
use fogmap::observation::parse_observation_bytes;
use fogmap::output::{print_json, print_pretty, write_geojson, write_summary};
use fogmap::season::Season;
use fogmap::station::{Mode, build_stations};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::Directive,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "fogmap")]
#[command(about = "Map fog-occurrence statistics for weather stations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Inputs {
    /// Daily observation CSV (path or URL)
    #[arg(short, long, env = "FOGMAP_DATA", default_value = "ewx_fog_daily.csv")]
    data: String,

    /// TopoJSON with state and county boundaries (path or URL)
    #[arg(short, long, env = "FOGMAP_TOPOLOGY", default_value = "counties-10m.json")]
    topology: String,

    /// Optional JSON map configuration
    #[arg(short, long, env = "FOGMAP_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct Outputs {
    /// SVG file to write the map to
    #[arg(short, long, default_value = "fogmap.svg")]
    out: PathBuf,

    /// Optional CSV file for per-station fractions
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Optional GeoJSON file for the station layer
    #[arg(long)]
    geojson: Option<PathBuf>,

    /// Log the station summary as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the map once for the given selections
    Render {
        #[command(flatten)]
        inputs: Inputs,

        #[command(flatten)]
        outputs: Outputs,

        /// Season filter: all, winter, spring, summer or fall
        #[arg(short, long, default_value = "all")]
        season: String,

        /// Count only dense fog (peak intensity 5+) in fractions
        #[arg(long, default_value_t = false)]
        dense: bool,

        /// Station classification, e.g. KAUS=fog (repeatable)
        #[arg(short, long = "mode", value_name = "STATION=MODE")]
        modes: Vec<String>,
    },
    /// Read commands from stdin and re-render after each one
    Interactive {
        #[command(flatten)]
        inputs: Inputs,

        #[command(flatten)]
        outputs: Outputs,
    },
    /// List the stations found in an observation table
    Stations {
        /// Daily observation CSV (path or URL)
        #[arg(short, long, env = "FOGMAP_DATA", default_value = "ewx_fog_daily.csv")]
        data: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/fogmap.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("fogmap.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse::<Directive>()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse::<Directive>()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let client = BasicClient::new()?;

    match cli.command {
        Commands::Render {
            inputs,
            outputs,
            season,
            dense,
            modes,
        } => {
            let (mut controller, _dropped) = open_session(&client, &inputs).await?;

            for arg in &modes {
                let (station, mode) = parse_mode_arg(arg)?;
                controller.set_mode(station, mode)?;
            }
            let season: Season = season.parse().unwrap_or_default();
            controller.dispatch(Event::SeasonChanged(season))?;
            controller.dispatch(Event::ThresholdToggled(dense))?;

            write_outputs(&controller, &outputs)?;
        }
        Commands::Interactive { inputs, outputs } => {
            let (mut controller, _dropped) = open_session(&client, &inputs).await?;
            write_outputs(&controller, &outputs)?;

            info!("Reading commands: season <name>, dense on|off|toggle, click <station>, mode <station> <mode>, show, quit");
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            run_event_loop(&mut controller, stdin, |c| write_outputs(c, &outputs)).await?;
        }
        Commands::Stations { data } => {
            let bytes = load_source(&client, &data).await?;
            let report = parse_observation_bytes(&bytes)?;
            if report.dropped > 0 {
                warn!(dropped = report.dropped, "Malformed observation rows dropped");
            }
            let stations = build_stations(&report.observations)?;

            for station in &stations {
                let days = report
                    .observations
                    .iter()
                    .filter(|o| o.station == station.id)
                    .count();
                info!(
                    station = %station.id,
                    lon = station.lon,
                    lat = station.lat,
                    days,
                    "Station"
                );
            }
            info!(
                stations = stations.len(),
                observations = report.observations.len(),
                dropped = report.dropped,
                "Station list summary"
            );
        }
    }

    Ok(())
}

/// Loads both inputs and applies the optional map configuration.
async fn open_session(client: &BasicClient, inputs: &Inputs) -> Result<(Controller, usize)> {
    let config = match &inputs.config {
        Some(path) => MapConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => MapConfig::default(),
    };
    start(client, &inputs.data, &inputs.topology, config).await
}

/// Splits `STATION=MODE`.
fn parse_mode_arg(arg: &str) -> Result<(&str, Mode)> {
    let (station, mode) = arg
        .split_once('=')
        .with_context(|| format!("expected STATION=MODE, got '{arg}'"))?;
    Ok((station.trim(), mode.parse::<Mode>()?))
}

/// Writes the map and any requested summaries for the current state.
fn write_outputs(controller: &Controller, outputs: &Outputs) -> Result<()> {
    let svg = controller.render()?;
    std::fs::write(&outputs.out, svg)
        .with_context(|| format!("failed to write {}", outputs.out.display()))?;

    if let Some(path) = &outputs.summary {
        write_summary(path, controller.stations())?;
    }
    if let Some(path) = &outputs.geojson {
        write_geojson(path, controller.stations())?;
    }

    let report = controller.report();
    print_pretty(&report);
    if outputs.json {
        print_json(&report)?;
    }

    info!(
        out = %outputs.out.display(),
        season = %report.season,
        dense = report.dense,
        qualifying_days = report.qualifying_days,
        "Map written"
    );
    Ok(())
}
