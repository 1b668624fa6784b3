//! Clarke–Wright savings route optimizer for fleetroute.
//!
//! This crate provides [`SavingsOptimizer`], the default implementation of the
//! [`RouteOptimizer`](fleetroute_core::RouteOptimizer) trait. Each order is a
//! pickup followed by a delivery; routes start and end at a single depot.
//!
//! A run is a fixed pipeline:
//!
//! 1. [`savings`] ranks every positive join between two orders.
//! 2. [`merge`] applies the joins greedily, filling one vehicle at a time
//!    under its capacity.
//! 3. [`assign`] pairs the resulting route groups with vehicles.
//! 4. [`build`] turns each pairing into a named, costed
//!    [`RoutePlan`](fleetroute_core::RoutePlan).
//!
//! The pipeline is deterministic; ties between equal savings keep
//! enumeration order.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod assign;
pub mod build;
pub mod merge;
pub mod savings;
mod solver;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use merge::VehicleAdvancePolicy;
pub use solver::{
    DEFAULT_AVERAGE_SPEED_KMH, DEFAULT_DEPOT, DEFAULT_MIN_DELIVERIES_PER_VEHICLE,
    DEFAULT_ROUTE_NAME_PREFIX, SavingsOptimizer, SavingsOptimizerConfig,
};
