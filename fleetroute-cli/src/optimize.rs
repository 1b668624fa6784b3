//! Optimize command implementation for the fleetroute CLI.

use std::io::{BufReader, Write};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use fleetroute_core::{
    Coordinate, DistanceCache, DistanceProvider, HaversineDistanceSource, OptimizeRequest,
    OptimizeResponse, RouteOptimizer,
};
use fleetroute_data::routing::{DEFAULT_BASE_URL, OsrmDistanceSource, OsrmDistanceSourceConfig};
use fleetroute_solver_savings::{
    DEFAULT_AVERAGE_SPEED_KMH, DEFAULT_DEPOT, DEFAULT_MIN_DELIVERIES_PER_VEHICLE,
    SavingsOptimizer, SavingsOptimizerConfig, VehicleAdvancePolicy,
};
use log::{debug, info};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::fs::{file_is_file, open_utf8_file};
use crate::{
    ARG_OPTIMIZE_ADVANCE_POLICY, ARG_OPTIMIZE_AVERAGE_SPEED, ARG_OPTIMIZE_CACHE_CAPACITY,
    ARG_OPTIMIZE_CAPACITY_OVERRIDE, ARG_OPTIMIZE_DEPOT_LATITUDE, ARG_OPTIMIZE_DEPOT_LONGITUDE,
    ARG_OPTIMIZE_MIN_DELIVERIES, ARG_OPTIMIZE_OFFLINE, ARG_OPTIMIZE_OSRM_BASE_URL,
    ARG_OPTIMIZE_REQUEST, ARG_OPTIMIZE_TIMEOUT_SECS, CliError, ENV_OPTIMIZE_REQUEST,
};

/// Distance cache entries kept per run unless configured otherwise.
pub(crate) const DEFAULT_CACHE_CAPACITY: usize = 100_000;

/// Per-request OSRM timeout unless configured otherwise.
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// CLI arguments for the `optimize` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Plan pickup and delivery routes for one day. The request is \
                 a JSON-encoded OptimizeRequest holding the planning date, \
                 the orders and the fleet. Road distances come from an OSRM \
                 service unless --offline is set; failed lookups fall back \
                 to great-circle distances.",
    about = "Plan routes for a day's orders"
)]
#[ortho_config(prefix = "FLEETROUTE")]
pub(crate) struct OptimizeArgs {
    /// Path to a JSON file containing an OptimizeRequest.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
    /// Base URL for the OSRM server (e.g. "http://localhost:5000").
    #[arg(long = ARG_OPTIMIZE_OSRM_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) osrm_base_url: Option<String>,
    /// Use great-circle distances only and never contact a routing service.
    #[arg(
        long = ARG_OPTIMIZE_OFFLINE,
        value_name = "bool",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    #[serde(default)]
    pub(crate) offline: Option<bool>,
    /// Timeout for each routing request, in seconds.
    #[arg(long = ARG_OPTIMIZE_TIMEOUT_SECS, value_name = "secs")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
    /// Depot latitude in degrees.
    #[arg(long = ARG_OPTIMIZE_DEPOT_LATITUDE, value_name = "deg", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) depot_latitude: Option<f64>,
    /// Depot longitude in degrees.
    #[arg(long = ARG_OPTIMIZE_DEPOT_LONGITUDE, value_name = "deg", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) depot_longitude: Option<f64>,
    /// Deliveries a vehicle takes before the next vehicle is used.
    #[arg(long = ARG_OPTIMIZE_MIN_DELIVERIES, value_name = "count")]
    #[serde(default)]
    pub(crate) min_deliveries: Option<usize>,
    /// Capacity in kilograms applied to every vehicle instead of its own.
    #[arg(long = ARG_OPTIMIZE_CAPACITY_OVERRIDE, value_name = "kg")]
    #[serde(default)]
    pub(crate) capacity_override: Option<u32>,
    /// When to move on to the next vehicle: respect-minimum or prefer-savings.
    #[arg(long = ARG_OPTIMIZE_ADVANCE_POLICY, value_name = "policy")]
    #[serde(default)]
    pub(crate) advance_policy: Option<String>,
    /// Average driving speed used for duration estimates.
    #[arg(long = ARG_OPTIMIZE_AVERAGE_SPEED, value_name = "kmh")]
    #[serde(default)]
    pub(crate) average_speed_kmh: Option<f64>,
    /// Maximum number of cached distances.
    #[arg(long = ARG_OPTIMIZE_CACHE_CAPACITY, value_name = "entries")]
    #[serde(default)]
    pub(crate) cache_capacity: Option<usize>,
}

impl OptimizeArgs {
    pub(crate) fn into_config(self) -> Result<OptimizeConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        OptimizeConfig::try_from(merged)
    }
}

/// Where planning distances come from.
#[derive(Debug, Clone)]
pub(crate) enum DistanceBackend {
    /// Great-circle distances only.
    Offline,
    /// Road distances from an OSRM service.
    Osrm(OsrmDistanceSourceConfig),
}

/// Resolved `optimize` command configuration.
#[derive(Debug, Clone)]
pub(crate) struct OptimizeConfig {
    /// Path to the JSON request file.
    pub(crate) request_path: Utf8PathBuf,
    /// Distance source selection.
    pub(crate) distances: DistanceBackend,
    /// Optimizer tuning.
    pub(crate) optimizer: SavingsOptimizerConfig,
    /// Bound on the distance cache.
    pub(crate) cache_capacity: NonZeroUsize,
}

impl OptimizeConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        Self::require_existing(&self.request_path, ARG_OPTIMIZE_REQUEST)
    }

    fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
        match file_is_file(path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::SourcePathNotFile {
                field,
                path: path.to_path_buf(),
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(CliError::MissingSourceFile {
                    field,
                    path: path.to_path_buf(),
                })
            }
            Err(source) => Err(CliError::InspectSourcePath {
                field,
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

impl TryFrom<OptimizeArgs> for OptimizeConfig {
    type Error = CliError;

    fn try_from(args: OptimizeArgs) -> Result<Self, Self::Error> {
        let request_path = args.request_path.ok_or(CliError::MissingArgument {
            field: ARG_OPTIMIZE_REQUEST,
            env: ENV_OPTIMIZE_REQUEST,
        })?;

        let depot = Coordinate::new(
            args.depot_latitude.unwrap_or(DEFAULT_DEPOT.latitude),
            args.depot_longitude.unwrap_or(DEFAULT_DEPOT.longitude),
        )
        .map_err(CliError::InvalidDepot)?;

        let min_deliveries =
            args.min_deliveries
                .map_or(Ok(DEFAULT_MIN_DELIVERIES_PER_VEHICLE), |count| {
                    NonZeroUsize::new(count).ok_or_else(|| CliError::InvalidArgument {
                        field: ARG_OPTIMIZE_MIN_DELIVERIES,
                        reason: "must be at least 1".to_owned(),
                    })
                })?;

        let advance_policy = args
            .advance_policy
            .as_deref()
            .map(str::parse::<VehicleAdvancePolicy>)
            .transpose()
            .map_err(|reason| CliError::InvalidArgument {
                field: ARG_OPTIMIZE_ADVANCE_POLICY,
                reason,
            })?
            .unwrap_or_default();

        let average_speed_kmh = args.average_speed_kmh.unwrap_or(DEFAULT_AVERAGE_SPEED_KMH);
        if !average_speed_kmh.is_finite() || average_speed_kmh <= 0.0 {
            return Err(CliError::InvalidArgument {
                field: ARG_OPTIMIZE_AVERAGE_SPEED,
                reason: format!("{average_speed_kmh} is not a positive speed"),
            });
        }

        let cache_capacity =
            NonZeroUsize::new(args.cache_capacity.unwrap_or(DEFAULT_CACHE_CAPACITY)).ok_or_else(
                || CliError::InvalidArgument {
                    field: ARG_OPTIMIZE_CACHE_CAPACITY,
                    reason: "must be at least 1".to_owned(),
                },
            )?;

        let timeout_secs = args.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(CliError::InvalidArgument {
                field: ARG_OPTIMIZE_TIMEOUT_SECS,
                reason: "must be at least 1 second".to_owned(),
            });
        }

        let distances = if args.offline.unwrap_or(false) {
            DistanceBackend::Offline
        } else {
            let base_url = args
                .osrm_base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
            DistanceBackend::Osrm(
                OsrmDistanceSourceConfig::new(base_url)
                    .with_timeout(Duration::from_secs(timeout_secs)),
            )
        };

        let mut optimizer = SavingsOptimizerConfig::default()
            .with_depot(depot)
            .with_min_deliveries_per_vehicle(min_deliveries)
            .with_advance_policy(advance_policy)
            .with_average_speed_kmh(average_speed_kmh);
        optimizer.vehicle_capacity_override = args.capacity_override;

        Ok(Self {
            request_path,
            distances,
            optimizer,
            cache_capacity,
        })
    }
}

/// Builds an optimizer for the current invocation.
pub(super) trait OptimizerBuilder {
    fn build(&self, config: &OptimizeConfig) -> Result<Box<dyn RouteOptimizer>, CliError>;
}

pub(super) struct DefaultOptimizerBuilder;

impl OptimizerBuilder for DefaultOptimizerBuilder {
    fn build(&self, config: &OptimizeConfig) -> Result<Box<dyn RouteOptimizer>, CliError> {
        let cache = Arc::new(DistanceCache::bounded(config.cache_capacity));
        match &config.distances {
            DistanceBackend::Offline => {
                debug!("planning with great-circle distances only");
                let provider = DistanceProvider::new(HaversineDistanceSource, cache);
                Ok(Box::new(SavingsOptimizer::with_config(
                    provider,
                    config.optimizer.clone(),
                )))
            }
            DistanceBackend::Osrm(osrm) => {
                debug!("planning with road distances from {}", osrm.base_url);
                let source = OsrmDistanceSource::with_config(osrm.clone()).map_err(|source| {
                    CliError::BuildDistanceSource {
                        base_url: osrm.base_url.clone(),
                        source,
                    }
                })?;
                let provider = DistanceProvider::new(source, cache);
                Ok(Box::new(SavingsOptimizer::with_config(
                    provider,
                    config.optimizer.clone(),
                )))
            }
        }
    }
}

pub(super) fn run_optimize(args: OptimizeArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    let builder = DefaultOptimizerBuilder;
    run_optimize_with(args, &builder, &mut stdout)
}

pub(super) fn run_optimize_with(
    args: OptimizeArgs,
    builder: &dyn OptimizerBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let response = execute_optimize(args, builder)?;
    write_optimize_response(writer, &response)
}

fn execute_optimize(
    args: OptimizeArgs,
    builder: &dyn OptimizerBuilder,
) -> Result<OptimizeResponse, CliError> {
    let config = resolve_optimize_config(args)?;
    let request = load_optimize_request(&config.request_path)?;
    info!(
        "loaded {} orders and {} vehicles for {} from {}",
        request.orders.len(),
        request.vehicles.len(),
        request.date,
        config.request_path
    );
    let optimizer = builder.build(&config)?;
    optimizer
        .optimize(&request)
        .map_err(|source| CliError::Optimize { source })
}

fn resolve_optimize_config(args: OptimizeArgs) -> Result<OptimizeConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

/// Loads a JSON-encoded [`OptimizeRequest`] from disk.
pub(super) fn load_optimize_request(path: &Utf8Path) -> Result<OptimizeRequest, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenOptimizeRequest {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|source| CliError::ParseOptimizeRequest {
        path: path.to_path_buf(),
        source,
    })
}

fn write_optimize_response(
    writer: &mut dyn Write,
    response: &OptimizeResponse,
) -> Result<(), CliError> {
    let payload =
        serde_json::to_string_pretty(response).map_err(CliError::SerializeOptimizeResponse)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOptimizeOutput)?;
    writer
        .write_all(b"\n")
        .map_err(CliError::WriteOptimizeOutput)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<OptimizeConfig, CliError> {
    let merged = OptimizeArgs::merge_from_layers(layers).map_err(CliError::from)?;
    OptimizeConfig::try_from(merged)
}
