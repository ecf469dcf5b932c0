use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use wpan_station::common::debug;
use wpan_station::sim::SimStation;

/// Control-plane station for an 802.15.4 / Thread-style mesh, run against
/// simulated radio collaborators.
#[derive(Parser)]
#[command(name = "wpan-station", version)]
struct Args {
    /// Path to the station TOML configuration
    #[arg(short, long)]
    config: PathBuf,

    /// Simulated run time, seconds
    #[arg(long, default_value_t = 14_400)]
    duration_s: u64,

    /// Simulation tick, milliseconds
    #[arg(long, default_value_t = 100)]
    tick_ms: u64,

    /// Seed for the simulation's random sources
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Request an explicit migration to this channel at startup
    #[arg(long)]
    request_channel: Option<u8>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match wpan_config::from_file(&args.config) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to load configuration: {}", err);
            return ExitCode::FAILURE;
        }
    };

    debug::setup_logging(config.config().debug_log.as_deref());

    let mut station = match SimStation::new(config, args.seed) {
        Ok(station) => station,
        Err(err) => {
            eprintln!("Failed to bring up the station: {}", err);
            return ExitCode::FAILURE;
        }
    };

    if let Some(channel) = args.request_channel {
        station.request_channel_change(channel);
    }

    station.run(args.duration_s * 1_000, args.tick_ms);

    ExitCode::SUCCESS
}
