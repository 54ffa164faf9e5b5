//! corridorfit CLI - Debug tool for corridor extraction
//!
//! Usage:
//!   corridorfit-cli corridors <log.csv> --airport <CODE> --airports <table.json> [--output <file>]
//!   corridorfit-cli validate <log.csv> --airport <CODE> --airports <table.json> <lat,lng>...
//!
//! Reads an acquisition track log (CSV with columns timestamp, flight_icao,
//! lat, lng, alt, dep_iata, arr_iata, status), extracts the airport's
//! corridors and prints fitted curves, planned place searches, or candidate
//! metrics as JSON.

use clap::{Parser, Subcommand};
use corridorfit::{
    AirportCorridors, AirportLookup, AirportTable, CorridorError, PipelineConfig, TrackPoint,
    TrackWindow, process_airport,
};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "corridorfit-cli")]
#[command(about = "Debug tool for flight corridor extraction", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose debug output
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Inputs shared by every subcommand.
#[derive(clap::Args)]
struct RunArgs {
    /// CSV track log
    log: PathBuf,

    /// Airport code (e.g. "BOS")
    #[arg(short, long)]
    airport: String,

    /// JSON airport reference table
    #[arg(long)]
    airports: PathBuf,

    /// JSON pipeline configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Search interval in miles (overrides the configuration)
    #[arg(long)]
    interval_miles: Option<f64>,

    /// Apply the default acquisition window before clustering
    #[arg(long)]
    window: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract corridors, fit curves and plan place searches
    Corridors {
        #[command(flatten)]
        run: RunArgs,

        /// Output file for the JSON report (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate candidate locations against the fitted corridors
    Validate {
        #[command(flatten)]
        run: RunArgs,

        /// Candidate coordinates as "lat,lng"
        #[arg(required = true)]
        points: Vec<String>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CorridorReport {
    airport: String,
    curves: Vec<corridorfit::CurveRecord>,
    search_plans: Vec<corridorfit::pipeline::CorridorSearchPlan>,
    failures: Vec<FailureReport>,
}

#[derive(Serialize)]
struct FailureReport {
    label: i32,
    error: String,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    let result = match cli.command {
        Commands::Corridors { run, output } => run_corridors(&run, output.as_deref()),
        Commands::Validate { run, points } => run_validate(&run, &points),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Load a CSV track log, skipping rows that fail to parse
fn load_track_log(path: &Path) -> corridorfit::Result<Vec<TrackPoint>> {
    println!("\n{}", "=".repeat(60));
    println!("Loading track log: {}", path.display());
    println!("{}", "=".repeat(60));

    let mut reader = csv::Reader::from_path(path)?;
    let mut points = Vec::new();
    let mut skipped = 0;
    for record in reader.deserialize::<TrackPoint>() {
        match record {
            Ok(point) => points.push(point),
            Err(e) => {
                skipped += 1;
                log::debug!("skipped row: {}", e);
            }
        }
    }

    println!("  Loaded {} points ({} rows skipped)", points.len(), skipped);
    Ok(points)
}

/// Resolve inputs and run the airport pipeline
fn run_pipeline(run: &RunArgs) -> corridorfit::Result<(AirportCorridors, PipelineConfig)> {
    let mut config = match &run.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(interval) = run.interval_miles {
        config.search.interval_miles = interval;
    }
    if run.window && config.window.is_none() {
        config.window = Some(TrackWindow::default());
    }

    let table = AirportTable::from_json_file(&run.airports)?;
    let airport = table.resolve(&run.airport)?;
    let log = load_track_log(&run.log)?;

    println!("\n{}", "=".repeat(60));
    println!("CORRIDOR EXTRACTION: {}", airport.code);
    println!("{}", "=".repeat(60));

    let result = process_airport(&log, &airport, &config)?;

    for curve in &result.curves {
        let bounds = curve.bounds();
        println!(
            "  [OK] corridor {:?} ({:?}): {} points, lng [{:.4}, {:.4}], lat [{:.4}, {:.4}]",
            curve.label(),
            curve.direction(),
            curve.source.as_ref().map_or(0, |c| c.size()),
            bounds.min_lng,
            bounds.max_lng,
            bounds.min_lat,
            bounds.max_lat
        );
    }
    for failure in &result.failures {
        println!("  [ERR] corridor {}: {}", failure.label, failure.error);
    }

    Ok((result, config))
}

/// Run corridor extraction and write the JSON report
fn run_corridors(run: &RunArgs, output: Option<&Path>) -> corridorfit::Result<()> {
    let (result, config) = run_pipeline(run)?;

    let report = CorridorReport {
        airport: result.airport.code.clone(),
        curves: result.curves.iter().map(|c| c.to_record()).collect(),
        search_plans: result.search_plans(config.search.interval_miles),
        failures: result
            .failures
            .iter()
            .map(|f| FailureReport {
                label: f.label,
                error: f.error.to_string(),
            })
            .collect(),
    };

    let total_requests: usize = report.search_plans.iter().map(|p| p.requests.len()).sum();
    println!(
        "\n  {} curves, {} search requests",
        report.curves.len(),
        total_requests
    );

    match output {
        Some(path) => {
            let writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(writer, &report)?;
            println!("  Report written to {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

/// Validate candidate points against every fitted corridor
fn run_validate(run: &RunArgs, points: &[String]) -> corridorfit::Result<()> {
    let (result, config) = run_pipeline(run)?;

    println!("\n{}", "=".repeat(60));
    println!("CANDIDATE VALIDATION");
    println!("{}", "=".repeat(60));

    for raw in points {
        let Some((lat, lng)) = parse_coordinate(raw) else {
            eprintln!("  [ERR] not a lat,lng pair: {}", raw);
            continue;
        };

        match result.validate(lat, lng, config.search.interval_miles) {
            Ok(accepted) if accepted.is_empty() => {
                println!("  [--] {}: not near any corridor", raw);
            }
            Ok(accepted) => {
                for (label, candidate) in accepted {
                    println!(
                        "  [OK] {} corridor {}: {}",
                        raw,
                        label,
                        serde_json::to_string(&candidate)?
                    );
                }
            }
            Err(e @ CorridorError::OptimizationDidNotConverge { .. }) => {
                eprintln!("  [ERR] {}: {}", raw, e);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

fn parse_coordinate(raw: &str) -> Option<(f64, f64)> {
    let (lat, lng) = raw.split_once(',')?;
    Some((lat.trim().parse().ok()?, lng.trim().parse().ok()?))
}
