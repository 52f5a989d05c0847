use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use bunontherun::config::FileConfig;
use bunontherun::osm::Locale;
use bunontherun::{SearchError, SearchOrchestrator, SearchResult};

/// Find bakeries near an address using OpenStreetMap data
///
/// Examples:
///   # Bakeries around Khreshchatyk, Kyiv
///   bunontherun -c "Kyiv" -a "Khreshchatyk"
///
///   # Wider radius, English day names, JSON output
///   bunontherun -c "Lviv" -a "Rynok Square" -r 2000 --locale en --json
///
///   # Use a config file
///   bunontherun --config my-settings.toml -c "Kyiv" -a "Khreshchatyk"
#[derive(Parser, Debug)]
#[command(name = "bunontherun")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to config file (optional, auto-searches bunontherun.toml if not provided)
    #[arg(long)]
    config: Option<PathBuf>,

    /// City name
    #[arg(short = 'c', long)]
    city: String,

    /// Street address within the city
    #[arg(short = 'a', long)]
    address: String,

    /// Search radius in meters (defaults to the config value, 1500)
    #[arg(short = 'r', long)]
    radius: Option<f64>,

    /// Language for names and opening hours
    #[arg(long, value_enum)]
    locale: Option<Locale>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<ExitCode> {
    let mut config = match args.config {
        Some(ref path) => FileConfig::from_path(path)?,
        None => FileConfig::load().unwrap_or_default(),
    };

    if let Some(radius) = args.radius {
        config.overpass.radius_m = radius;
    }
    if let Some(locale) = args.locale {
        config.locale = locale;
    }
    config.validate().context("Invalid configuration")?;

    tracing::debug!(
        geocoder = %config.geocoder.url,
        overpass = %config.overpass.url,
        radius_m = config.overpass.radius_m,
        locale = ?config.locale,
        "configuration loaded"
    );

    let orchestrator = SearchOrchestrator::from_config(&config)?;

    let spinner = create_spinner("Searching for bakeries...");
    let start = Instant::now();
    let outcome = orchestrator.search(&args.city, &args.address);
    spinner.finish_and_clear();

    let result = match outcome {
        Ok(result) => result,
        Err(e @ SearchError::Validation { .. }) => {
            eprintln!("City and address are required: {}", e);
            return Ok(ExitCode::from(2));
        }
        Err(SearchError::NotFound { query }) => {
            eprintln!("Could not find \"{}\" on the map", query);
            return Ok(ExitCode::from(3));
        }
        Err(e @ SearchError::ProviderFault { .. }) => {
            eprintln!("Search failed: {}", e);
            return Ok(ExitCode::from(4));
        }
    };

    if args.json {
        let json = serde_json::to_string_pretty(result.as_ref())
            .context("Failed to serialize search result")?;
        println!("{}", json);
    } else {
        print_result(&result);
        println!();
        println!("Done in {:.1}s", start.elapsed().as_secs_f32());
    }

    Ok(ExitCode::SUCCESS)
}

fn print_result(result: &SearchResult) {
    let center = result.search_center;
    println!(
        "Bakeries near {} ({:.4}, {:.4}): {}",
        result.source_label,
        center.lat,
        center.lon,
        result.bakeries.len()
    );

    for (i, bakery) in result.bakeries.iter().enumerate() {
        println!();
        println!(
            "{:>3}. {} ({:.0} m)",
            i + 1,
            bakery.name,
            bakery.distance_meters.round()
        );
        if let Some(ref address) = bakery.address {
            println!("     {}", address);
        }
        if let Some(ref hours) = bakery.opening_hours {
            for part in hours.split(';') {
                println!("     {}", part.trim());
            }
        }
    }
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
        pb.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}
