use anyhow::{Context, Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::info;

use safexit::api::{OsrmClient, VenueSource};
use safexit::config::FileConfig;
use safexit::domain::Point;
use safexit::feed::parse_venue;
use safexit::render::{ConsoleRenderer, GeoJsonRenderer};
use safexit::reroute::geolocation::spawn_track;
use safexit::reroute::{
    FixedPosition, GeolocationOptions, HazardSubscription, NoGeolocation, RerouteController,
    locate_event,
};

/// Find the safest exit at an event venue and route to it
///
/// Examples:
///   # Route from a known position
///   safexit --venue venue.json --lat 51.5002 --lon -0.1201
///
///   # No position: route from the venue marker
///   safexit --venue venue.json -o route.geojson
///
///   # Replay a walk and keep hazards fresh from the event server
///   safexit --venue https://example.org/event/4/venue.json --track walk.json --watch
#[derive(Parser, Debug)]
#[command(name = "safexit")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to config file (optional, auto-searches safexit.toml if not provided)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Venue snapshot: JSON file or http(s) URL
    #[arg(short = 'V', long)]
    venue: Option<String>,

    /// Current latitude (use with --lon)
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Current longitude (use with --lat)
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,

    /// JSON array of position fixes to replay; null entries mean no fix
    #[arg(long, conflicts_with = "lat")]
    track: Option<PathBuf>,

    /// Delay between replayed fixes in milliseconds
    #[arg(long, default_value = "2000")]
    track_interval_ms: u64,

    /// Keep polling the venue URL for hazard updates until Ctrl-C
    #[arg(short = 'w', long)]
    watch: bool,

    /// Write the current exit and route as GeoJSON
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// OSRM routing profile (driving, foot, bike)
    #[arg(long)]
    profile: Option<String>,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let file_config = if let Some(ref config_path) = args.config {
        if config_path.exists() {
            let contents = std::fs::read_to_string(config_path)
                .context(format!("Failed to read config file: {:?}", config_path))?;
            Some(toml::from_str(&contents).context("Failed to parse config file")?)
        } else {
            bail!("Config file not found: {:?}", config_path);
        }
    } else {
        FileConfig::load()
    };

    let verbose = args.verbose || file_config.as_ref().map(|c| c.verbose).unwrap_or(false);
    init_logging(verbose);

    let venue_location = args
        .venue
        .clone()
        .or_else(|| file_config.as_ref().and_then(|c| c.venue.clone()));
    let lat = args
        .lat
        .or_else(|| file_config.as_ref().and_then(|c| c.lat));
    let lon = args
        .lon
        .or_else(|| file_config.as_ref().and_then(|c| c.lon));
    let output = args
        .output
        .clone()
        .or_else(|| file_config.as_ref().and_then(|c| c.output.clone()));

    let scoring = file_config
        .as_ref()
        .and_then(|c| c.scoring.clone())
        .unwrap_or_default();
    scoring.validate()?;
    let mut routing = file_config
        .as_ref()
        .and_then(|c| c.routing.clone())
        .unwrap_or_default();
    if let Some(profile) = args.profile.clone() {
        routing.profile = profile;
    }
    let geolocation = file_config
        .as_ref()
        .and_then(|c| c.geolocation.clone())
        .unwrap_or_default();
    let watch = file_config
        .as_ref()
        .and_then(|c| c.watch.clone())
        .unwrap_or_default();

    let Some(venue_location) = venue_location else {
        bail!("Must provide --venue or set `venue` in safexit.toml");
    };
    let source = VenueSource::parse(&venue_location);
    if args.watch && !source.is_remote() {
        bail!("--watch requires an http(s) venue URL");
    }
    if lat.is_some() != lon.is_some() {
        bail!("Latitude and longitude must be given together");
    }

    println!("safexit - Evacuation Exit Finder");
    println!("================================");
    println!();

    let spinner = create_spinner(&format!("Loading venue from {}...", source));
    let start = Instant::now();
    let snapshot = source.load().await.context("Failed to load venue data")?;
    let venue = parse_venue(&snapshot);
    spinner.finish_with_message(format!(
        "Loaded {}: {} exits, {} restricted areas, {} active incidents [{:.1}s]",
        venue.name,
        venue.exits.len(),
        venue.restricted.len(),
        venue.incidents.len(),
        start.elapsed().as_secs_f32()
    ));

    if verbose {
        println!("Configuration:");
        println!(
            "  Venue anchor: ({:.5}, {:.5})",
            venue.anchor.lat, venue.anchor.lng
        );
        if let (Some(lt), Some(ln)) = (lat, lon) {
            println!("  Position: ({:.5}, {:.5})", lt, ln);
        }
        println!("  Routing profile: {}", routing.profile);
        println!("  Routing servers: {}", routing.urls.len());
        println!("  Restricted penalty: {}", scoring.restricted_penalty);
        println!("  Geolocation timeout: {}ms", geolocation.timeout_ms);
        if let Some(ref path) = output {
            println!("  Output: {}", path.display());
        }
        println!();
    }

    let router = OsrmClient::new(routing.clone()).context("Failed to create routing client")?;
    let renderer = (
        ConsoleRenderer::new(verbose),
        output.as_ref().map(GeoJsonRenderer::new),
    );
    let controller = RerouteController::new(router, renderer, venue, scoring)
        .with_simplify_tolerance(routing.simplify_tolerance);

    let (events_tx, events_rx) = mpsc::channel(32);
    let options = GeolocationOptions::from(&geolocation);

    let _track = if let Some(ref path) = args.track {
        let track = load_track(path)?;
        println!("Replaying {} position fixes", track.len());
        Some(spawn_track(
            track,
            Duration::from_millis(args.track_interval_ms),
            events_tx.clone(),
        ))
    } else {
        let event = match (lat, lon) {
            (Some(lt), Some(ln)) => {
                locate_event(&FixedPosition(Point::new(lt, ln)), &options).await
            }
            _ => locate_event(&NoGeolocation, &options).await,
        };
        events_tx
            .send(event)
            .await
            .context("Routing stopped before the first position")?;
        None
    };

    let subscription = if args.watch {
        println!(
            "Watching {} for hazard updates every {}s (Ctrl-C to stop)",
            source, watch.interval_secs
        );
        Some(HazardSubscription::subscribe(
            source.clone(),
            Duration::from_secs(watch.interval_secs),
            events_tx.clone(),
        ))
    } else {
        None
    };
    drop(events_tx);

    tokio::select! {
        result = controller.run(events_rx) => {
            result.context("Evacuation routing failed")?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, shutting down");
        }
    }

    if let Some(subscription) = subscription {
        subscription.unsubscribe();
    }

    if let Some(ref path) = output {
        println!();
        println!("Output: {}", path.display());
    }

    Ok(())
}

fn log_level(verbose: bool) -> tracing::Level {
    if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    }
}

fn init_logging(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(log_level(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn load_track(path: &Path) -> Result<Vec<Option<Point>>> {
    let contents = std::fs::read_to_string(path)
        .context(format!("Failed to read track file: {:?}", path))?;
    serde_json::from_str(&contents).context("Failed to parse track file")
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level() {
        assert_eq!(log_level(true), tracing::Level::DEBUG);
        assert_eq!(log_level(false), tracing::Level::INFO);
    }
}
