//! Test-only utilities for `fleetroute-solver-savings`.
//!
//! The helpers in this module are available to unit tests and behavioural
//! tests. They are gated behind the `test-support` feature (and `cfg(test)`).

use std::sync::Arc;

use jiff::civil::{Date, date};

use fleetroute_core::test_support::PlanarDistanceSource;
use fleetroute_core::{
    Coordinate, DistanceCache, DistanceProvider, OptimizeRequest, Order, OrderId, Vehicle,
    VehicleId,
};

use crate::{SavingsOptimizer, SavingsOptimizerConfig};

/// Day used by fixtures that do not care about dates.
#[must_use]
pub fn planning_day() -> Date {
    date(2024, 5, 6)
}

/// Construct a pending order from `(latitude, longitude)` pairs.
///
/// # Examples
/// ```rust
/// use fleetroute_solver_savings::test_support::order;
///
/// let order = order(1, (0.0, 1.0), (0.0, 2.0), 10);
/// assert_eq!(order.id.0, 1);
/// assert_eq!(order.delivery.longitude, 2.0);
/// ```
#[must_use]
pub fn order(id: u64, pickup: (f64, f64), delivery: (f64, f64), weight_kg: u32) -> Order {
    let (pickup_lat, pickup_lon) = pickup;
    let (delivery_lat, delivery_lon) = delivery;
    Order::new(
        OrderId(id),
        Coordinate {
            latitude: pickup_lat,
            longitude: pickup_lon,
        },
        Coordinate {
            latitude: delivery_lat,
            longitude: delivery_lon,
        },
        weight_kg,
        planning_day(),
    )
}

/// Construct an active vehicle with the given capacity.
#[must_use]
pub fn vehicle(id: u64, capacity_kg: u32) -> Vehicle {
    Vehicle::new(VehicleId(id)).with_capacity(capacity_kg)
}

/// A request for [`planning_day`].
#[must_use]
pub fn request(orders: Vec<Order>, vehicles: Vec<Vehicle>) -> OptimizeRequest {
    OptimizeRequest {
        date: planning_day(),
        orders,
        vehicles,
    }
}

/// A provider over a 100 km per degree flat grid with a private cache.
#[must_use]
pub fn planar_provider() -> DistanceProvider<PlanarDistanceSource> {
    DistanceProvider::new(
        PlanarDistanceSource::default(),
        Arc::new(DistanceCache::unbounded()),
    )
}

/// An optimizer on the flat grid with its depot at the origin.
#[must_use]
pub fn planar_optimizer(config: SavingsOptimizerConfig) -> SavingsOptimizer<PlanarDistanceSource> {
    SavingsOptimizer::with_config(
        planar_provider(),
        config.with_depot(Coordinate {
            latitude: 0.0,
            longitude: 0.0,
        }),
    )
}

/// Two clusters of two orders each, one north and one east of the origin.
///
/// Joins inside a cluster save about 200 km; joins across clusters save
/// about 60 km.
#[must_use]
pub fn two_clusters(weight_kg: u32) -> Vec<Order> {
    vec![
        order(1, (0.0, 1.0), (0.0, 1.02), weight_kg),
        order(2, (0.0, 1.01), (0.0, 1.03), weight_kg),
        order(3, (1.0, 0.0), (1.02, 0.0), weight_kg),
        order(4, (1.01, 0.0), (1.03, 0.0), weight_kg),
    ]
}
