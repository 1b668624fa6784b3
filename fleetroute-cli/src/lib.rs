//! Command-line interface for fleetroute route planning.
//!
//! `fleetroute optimize <request.json>` reads an
//! [`OptimizeRequest`](fleetroute_core::OptimizeRequest), plans it with the
//! savings optimizer and prints the response as pretty JSON on stdout.
//! Options layer command-line flags over `FLEETROUTE_*` environment
//! variables over configuration files.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;

mod error;
mod fs;
mod optimize;

pub use error::CliError;
use optimize::{OptimizeArgs, run_optimize};

const ARG_OPTIMIZE_REQUEST: &str = "request";
const ARG_OPTIMIZE_OSRM_BASE_URL: &str = "osrm-base-url";
const ARG_OPTIMIZE_OFFLINE: &str = "offline";
const ARG_OPTIMIZE_TIMEOUT_SECS: &str = "timeout-secs";
const ARG_OPTIMIZE_DEPOT_LATITUDE: &str = "depot-latitude";
const ARG_OPTIMIZE_DEPOT_LONGITUDE: &str = "depot-longitude";
const ARG_OPTIMIZE_MIN_DELIVERIES: &str = "min-deliveries";
const ARG_OPTIMIZE_CAPACITY_OVERRIDE: &str = "capacity-override";
const ARG_OPTIMIZE_ADVANCE_POLICY: &str = "advance-policy";
const ARG_OPTIMIZE_AVERAGE_SPEED: &str = "average-speed-kmh";
const ARG_OPTIMIZE_CACHE_CAPACITY: &str = "cache-capacity";
const ENV_OPTIMIZE_REQUEST: &str = "FLEETROUTE_CMDS_OPTIMIZE_REQUEST_PATH";

/// Run the fleetroute CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when arguments or configuration are invalid, the
/// request cannot be read, or the optimizer rejects it.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    init_logging(cli.verbose);
    match cli.command {
        Command::Optimize(args) => run_optimize(args),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    // The fmt subscriber also bridges `log` records from the library crates.
    if let Err(err) = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init()
    {
        log::warn!("keeping the existing log subscriber: {err}");
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "fleetroute",
    about = "Plan multi-vehicle pickup and delivery routes",
    version
)]
struct Cli {
    /// Log debug detail to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Plan routes for a day's orders and vehicles.
    Optimize(OptimizeArgs),
}

#[cfg(test)]
mod tests;
