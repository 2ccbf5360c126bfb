//! ThekaWatch CLI - Database migrations and operator tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! tw-cli migrate
//!
//! # Fetch and store shops around a point
//! tw-cli discover --lat 28.6139 --lon 77.2090 --radius 3000
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `discover` - Run one Overpass discovery pass and upsert the results

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use thekawatch_api::services::discovery::{DEFAULT_RADIUS_M, MAX_RADIUS_M};

mod commands;

#[derive(Parser)]
#[command(name = "tw-cli")]
#[command(author, version, about = "ThekaWatch CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Fetch shops around a point from Overpass and store them
    Discover {
        /// Latitude in decimal degrees
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// Search radius in metres
        #[arg(
            short,
            long,
            default_value_t = DEFAULT_RADIUS_M,
            value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_RADIUS_M)),
        )]
        radius: u32,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Discover { lat, lon, radius } => {
            commands::discover::run(lat, lon, radius).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_discover_defaults_radius() {
        let cli = Cli::try_parse_from(["tw-cli", "discover", "--lat", "-33.86", "--lon", "151.2"])
            .unwrap();
        match cli.command {
            Commands::Discover { lat, lon, radius } => {
                assert!((lat + 33.86).abs() < f64::EPSILON);
                assert!((lon - 151.2).abs() < f64::EPSILON);
                assert_eq!(radius, 3000);
            }
            Commands::Migrate => panic!("expected discover"),
        }
    }

    #[test]
    fn test_discover_rejects_oversized_radius() {
        let result = Cli::try_parse_from([
            "tw-cli", "discover", "--lat", "1", "--lon", "1", "--radius", "60000",
        ]);
        assert!(result.is_err());
    }
}
