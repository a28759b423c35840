use std::fs::File;
use std::io;

use anyhow::{Context, Result};
use clap::Parser;

use taxitime::messages::{CalculateBatch, InitializeGraph};
use taxitime::{replay, Dispatcher, TaxiConfig};

#[derive(Parser, Debug)]
#[command(name = "taxitime-csv")]
#[command(about = "Replay one batch of flights from CSV against an airport's taxiway geometry.", long_about = None)]
struct Cli {
    /// Airport code the geometry belongs to
    #[arg(short, long)]
    airport: String,

    /// Taxiway segments CSV (lat1,lon1,lat2,lon2)
    #[arg(short, long)]
    taxiways: String,

    /// Runway endpoints CSV (lat,lon,designator)
    #[arg(short, long)]
    runways: String,

    /// Flights CSV (flight_id,departure,lat,lon,heading,ground_speed)
    #[arg(short, long)]
    flights: String,

    /// Active runway designators for the airport, comma separated
    #[arg(long, value_delimiter = ',')]
    active: Vec<String>,

    /// JSON file overriding estimator defaults
    #[arg(short, long)]
    config: Option<String>,

    /// Output CSV (flight_id,time_s,distance_m,runway). If omitted, prints a summary to stdout.
    #[arg(short, long)]
    out: Option<String>,
}

fn open(path: &str) -> Result<File> {
    File::open(path).with_context(|| format!("opening {}", path))
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

    let taxiway_segments = replay::read_taxiways(open(&cli.taxiways)?)
        .with_context(|| format!("parsing {}", &cli.taxiways))?;
    let runway_endpoints = replay::read_runways(open(&cli.runways)?)
        .with_context(|| format!("parsing {}", &cli.runways))?;
    let flights = replay::read_flights(open(&cli.flights)?)
        .with_context(|| format!("parsing {}", &cli.flights))?;

    let (airport, node_count) = dispatcher.initialize_graph(InitializeGraph {
        airport_code: cli.airport.clone(),
        taxiway_segments,
        runway_endpoints,
    });
    println!("Graph {}: {} nodes", airport, node_count);

    let mut batch = CalculateBatch {
        flights,
        ..CalculateBatch::default()
    };
    if !cli.active.is_empty() {
        batch
            .active_runways_by_airport
            .insert(cli.airport.clone(), cli.active.clone());
    }

    use std::time::Instant;
    let now = Instant::now();
    let estimates = dispatcher.calculate_batch(&batch);
    println!("{:.3} ms", now.elapsed().as_secs_f64() * 1000.0);

    if let Some(out_path) = cli.out {
        let file = File::create(&out_path).with_context(|| format!("creating CSV {}", &out_path))?;
        replay::write_estimates(file, &estimates)?;
        println!(
            "Wrote estimates for {} of {} flights to {}",
            estimates.len(),
            batch.flights.len(),
            out_path
        );
    } else {
        println!("Flights: {}", batch.flights.len());
        println!("Estimated: {}", estimates.len());
        if !estimates.is_empty() {
            let mut times: Vec<u32> = estimates.values().map(|e| e.time_seconds).collect();
            times.sort_unstable();
            println!("Median taxi time (s): {}", times[times.len() / 2]);
            println!("Max taxi time (s): {}", times[times.len() - 1]);
        }
        replay::write_estimates(io::stdout().lock(), &estimates)?;
    }

    Ok(())
}
