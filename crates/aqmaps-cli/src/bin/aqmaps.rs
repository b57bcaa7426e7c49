//! Plan one day's air-quality survey flight.
//!
//! Fetches the day's sensors and the no-fly buildings, plans the flight and
//! writes the move log and readings map.

use anyhow::Context;
use aqmaps_cli::{output, Config};
use aqmaps_client::DataServiceClient;
use aqmaps_core::{Coordinate, FlightPlanner, NoFlyRegistry};
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Plan a sensor survey flight for one day
#[derive(Parser, Debug)]
#[command(author, version, about, allow_negative_numbers = true)]
struct Args {
    /// Day of month (DD)
    day: u32,

    /// Month (MM)
    month: u32,

    /// Year (YYYY)
    year: i32,

    /// Launch latitude
    latitude: f64,

    /// Launch longitude
    longitude: f64,

    /// Accepted for compatibility; planning is deterministic
    seed: u64,

    /// Data service port
    port: u16,

    /// Directory for the output files (default: AQMAPS_OUTPUT_DIR or .)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Data service host (default: AQMAPS_HOST or http://localhost)
    #[arg(long)]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("aqmaps=info".parse()?))
        .init();

    let args = Args::parse();
    if let Err(err) = run(args).await {
        tracing::error!("{err:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = Config::from_env();

    let date = NaiveDate::from_ymd_opt(args.year, args.month, args.day).with_context(|| {
        format!(
            "{:02}-{:02}-{:04} is not a calendar date",
            args.day, args.month, args.year
        )
    })?;
    let launch = Coordinate::checked(args.longitude, args.latitude)
        .context("Invalid launch position")?;
    tracing::debug!(seed = args.seed, "Seed ignored; planning is deterministic");

    let host = args.host.unwrap_or_else(|| config.host.clone());
    let output_dir = args.output_dir.unwrap_or_else(|| config.output_dir.clone());
    let base_url = format!("{}:{}", host.trim_end_matches('/'), args.port);

    tracing::info!(%base_url, %date, "Fetching flight data");
    let client = DataServiceClient::new(base_url, config.http_timeout)?;
    let sensors = client.fetch_sensors(date).await?;
    let buildings = client.fetch_no_fly_zones().await?;

    let registry = NoFlyRegistry::new(buildings).context("Invalid no-fly zones")?;
    let planner = FlightPlanner::new(registry, config.flight_rules())?;
    let record = planner.plan(launch, sensors);

    let paths = output::write_outputs(&output_dir, date, &record).await?;

    println!(
        "{}: {} moves, {}/{} sensors visited, {:?}",
        date.format("%d-%m-%Y"),
        record.moves_made(),
        record.visited_sensors().count(),
        record.sensors.len(),
        record.termination
    );
    println!("  {}", paths.move_log.display());
    println!("  {}", paths.readings_map.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positional_arguments_with_negative_longitude() {
        let args = Args::try_parse_from([
            "aqmaps", "15", "06", "2021", "55.9444", "-3.1878", "5678", "9898",
        ])
        .unwrap();
        assert_eq!((args.day, args.month, args.year), (15, 6, 2021));
        assert_eq!(args.longitude, -3.1878);
        assert_eq!(args.port, 9898);
        assert!(args.output_dir.is_none());
    }

    #[test]
    fn rejects_missing_port() {
        assert!(Args::try_parse_from(["aqmaps", "15", "06", "2021", "55.9444", "-3.1878", "5678"])
            .is_err());
    }
}
