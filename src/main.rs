use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use taxitime::messages::InitializeGraph;
use taxitime::osm::{self, Around};
use taxitime::{Dispatcher, TaxiConfig};

#[derive(Parser, Debug)]
#[command(name = "taxitime")]
#[command(about = "Taxi-time worker: reads JSON requests from stdin, one per line, and answers on stdout.", long_about = None)]
struct Cli {
    /// JSON file overriding estimator defaults
    #[arg(short, long)]
    config: Option<String>,

    /// Preload an airport graph from this .osm.pbf file (requires --airport)
    #[arg(long, requires = "airport")]
    osm: Option<String>,

    /// Airport code for the preloaded graph
    #[arg(long)]
    airport: Option<String>,

    /// Only import aeroways near this point, as "lat,lon"
    #[arg(long, value_parser = parse_point)]
    around: Option<(f64, f64)>,
}

fn parse_point(s: &str) -> Result<(f64, f64), String> {
    let (lat, lon) = s
        .split_once(',')
        .ok_or_else(|| format!("expected \"lat,lon\", got {:?}", s))?;
    let lat = lat.trim().parse::<f64>().map_err(|e| e.to_string())?;
    let lon = lon.trim().parse::<f64>().map_err(|e| e.to_string())?;
    Ok((lat, lon))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => TaxiConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path))?,
        None => TaxiConfig::default(),
    };
    let mut dispatcher = Dispatcher::new(config);

    if let (Some(pbf), Some(airport)) = (&cli.osm, &cli.airport) {
        let around = cli.around.map(|(lat, lon)| Around::new(lat, lon));
        let geometry = osm::read_airport_geometry(pbf, around)
            .with_context(|| format!("reading {}", pbf))?;
        let (airport, node_count) = dispatcher.initialize_graph(InitializeGraph {
            airport_code: airport.clone(),
            taxiway_segments: geometry.taxiway_segments,
            runway_endpoints: geometry.runway_endpoints,
        });
        info!("preloaded {} with {} nodes", airport, node_count);
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    dispatcher
        .serve(stdin.lock(), stdout.lock())
        .context("serving requests")?;

    Ok(())
}
