//! Facade crate for the Fleetroute delivery planning engine.
//!
//! This crate re-exports the core domain types and exposes the savings
//! optimizer and the OSRM distance source behind feature flags.
//!
//! # Examples
//!
//! ```rust
//! # #[cfg(feature = "solver-savings")]
//! # fn main() -> Result<(), fleetroute::OptimizeError> {
//! use std::sync::Arc;
//! use fleetroute::{
//!     DistanceCache, DistanceProvider, HaversineDistanceSource, OptimizeRequest,
//!     RouteOptimizer, SavingsOptimizer, Vehicle, VehicleId,
//! };
//!
//! let provider = DistanceProvider::new(
//!     HaversineDistanceSource,
//!     Arc::new(DistanceCache::unbounded()),
//! );
//! let optimizer = SavingsOptimizer::new(provider);
//! let request = OptimizeRequest {
//!     date: jiff::civil::date(2024, 5, 6),
//!     orders: Vec::new(),
//!     vehicles: vec![Vehicle::new(VehicleId(1))],
//! };
//!
//! assert!(optimizer.optimize(&request)?.plans.is_empty());
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "solver-savings"))]
//! # fn main() {}
//! ```

#![forbid(unsafe_code)]

pub use fleetroute_core::{
    Coordinate, CoordinateError, DistanceCache, DistanceError, DistanceProvider, DistanceSource,
    DriverId, FallbackDistanceSource, HaversineDistanceSource, Leg, OptimizeDiagnostics,
    OptimizeError, OptimizeRequest, OptimizeResponse, Order, OrderId, OrderPriority, OrderStatus,
    RouteOptimizer, RoutePlan, RouteStatus, Stop, Vehicle, VehicleId, plan_day,
};

#[cfg(feature = "solver-savings")]
pub use fleetroute_solver_savings::{SavingsOptimizer, SavingsOptimizerConfig, VehicleAdvancePolicy};

#[cfg(feature = "osrm")]
pub use fleetroute_data::routing::{OsrmDistanceSource, OsrmDistanceSourceConfig};
