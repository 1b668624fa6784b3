//! Core domain types for the fleetroute engine.
//!
//! This crate holds everything the route optimizers share: the order, vehicle
//! and route-plan model, the [`DistanceSource`] strategy with its caching,
//! failure-tolerant [`DistanceProvider`], the [`RouteOptimizer`] seam, the
//! persistence collaborators and [`plan_day`], which wires them together.
//!
//! Constructors that can reject input return `Result` so invalid data is
//! caught before it reaches an optimizer.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod coordinate;
pub mod distance;
mod optimizer;
mod order;
mod plan;
mod planning;
mod repository;
mod vehicle;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use coordinate::{Coordinate, CoordinateError};
pub use distance::{
    CacheStats, DistanceCache, DistanceError, DistanceProvider, DistanceSource,
    FallbackDistanceSource, HaversineDistanceSource, Leg, haversine_km,
};
pub use optimizer::{
    Location, OptimizeDiagnostics, OptimizeError, OptimizeRequest, OptimizeResponse,
    RouteOptimizer,
};
pub use order::{Order, OrderId, OrderPriority, OrderStatus, OrderStatusError};
pub use plan::{RoutePlan, RoutePlanId, RouteStatus, Stop};
pub use planning::{PlanningError, plan_day};
pub use repository::{OrderRepository, RepositoryError, RouteRepository, VehicleRepository};
pub use vehicle::{DEFAULT_CAPACITY_KG, DriverId, Vehicle, VehicleId};
