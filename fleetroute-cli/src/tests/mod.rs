//! Shared test harness modules for the fleetroute CLI.

use super::*;
use crate::optimize::{
    DEFAULT_CACHE_CAPACITY, DEFAULT_TIMEOUT_SECS, DefaultOptimizerBuilder, DistanceBackend,
    OptimizeConfig, OptimizerBuilder, config_from_layers_for_test, load_optimize_request,
    run_optimize_with,
};

mod helpers;
