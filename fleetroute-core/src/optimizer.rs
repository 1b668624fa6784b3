//! The route optimization seam: request, response and error types.

use std::fmt;
use std::time::Duration;

use jiff::civil::Date;
use thiserror::Error;

use crate::{CoordinateError, Order, OrderId, RoutePlan, Vehicle};

/// Input to a single optimization run.
///
/// The caller supplies snapshots; the optimizer never fetches data itself.
///
/// # Examples
/// ```rust
/// use fleetroute_core::{OptimizeRequest, Vehicle, VehicleId};
/// use jiff::civil::date;
///
/// let request = OptimizeRequest {
///     date: date(2024, 5, 6),
///     orders: Vec::new(),
///     vehicles: vec![Vehicle::new(VehicleId(1))],
/// };
/// assert!(request.orders.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptimizeRequest {
    /// Planning day.
    pub date: Date,
    /// Orders to place on routes.
    pub orders: Vec<Order>,
    /// Fleet available for the day.
    pub vehicles: Vec<Vehicle>,
}

/// Counters describing how a run went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptimizeDiagnostics {
    /// Wall-clock time spent inside the optimizer.
    pub elapsed: Duration,
    /// Savings candidates with a positive value.
    pub candidates: usize,
    /// Merges actually applied.
    pub merges: usize,
    /// Distance cache hits during the run.
    pub cache_hits: u64,
    /// Distance cache misses during the run.
    pub cache_misses: u64,
}

/// Output of a successful optimization run.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptimizeResponse {
    /// Route plans ready to persist, named in output order.
    pub plans: Vec<RoutePlan>,
    /// Orders that ended up on no plan, in input order.
    pub unassigned: Vec<OrderId>,
    /// Run counters.
    pub diagnostics: OptimizeDiagnostics,
}

impl OptimizeResponse {
    /// Total distance over every plan, in kilometres.
    #[must_use]
    pub fn total_distance_km(&self) -> f64 {
        self.plans.iter().map(|plan| plan.total_distance_km).sum()
    }
}

/// Which location of a request failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// The depot every route starts and ends at.
    Depot,
    /// Pickup location of an order.
    Pickup(OrderId),
    /// Delivery location of an order.
    Delivery(OrderId),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Depot => f.write_str("depot"),
            Self::Pickup(order) => write!(f, "pickup of {order}"),
            Self::Delivery(order) => write!(f, "delivery of {order}"),
        }
    }
}

/// Errors returned by [`RouteOptimizer::optimize`].
///
/// Infeasible orders and distance lookup failures are not errors: the former
/// come back in [`OptimizeResponse::unassigned`] and the latter degrade to
/// great-circle distances.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimizeError {
    /// Orders exist but no active vehicle can carry anything.
    #[error("no active vehicle with capacity is available for {orders} orders")]
    NoCapacityAvailable {
        /// Number of orders that could not be planned.
        orders: usize,
    },
    /// A coordinate was out of range.
    #[error("invalid coordinate at {location}: {source}")]
    InvalidCoordinate {
        /// Offending location.
        location: Location,
        /// Range violation.
        #[source]
        source: CoordinateError,
    },
    /// An order had zero weight.
    #[error("{order} must weigh at least 1 kg")]
    InvalidWeight {
        /// Offending order.
        order: OrderId,
    },
}

/// Partition orders into capacity-feasible vehicle routes.
///
/// Implementations must be `Send + Sync`; a single optimizer instance may
/// serve concurrent requests against a shared distance cache.
pub trait RouteOptimizer: Send + Sync {
    /// Plan routes for one day.
    ///
    /// An empty order list yields an empty response whatever the fleet.
    ///
    /// # Errors
    ///
    /// Returns [`OptimizeError`] for invalid input or when orders exist but
    /// no vehicle can take them.
    fn optimize(&self, request: &OptimizeRequest) -> Result<OptimizeResponse, OptimizeError>;
}

impl<T: RouteOptimizer + ?Sized> RouteOptimizer for &T {
    fn optimize(&self, request: &OptimizeRequest) -> Result<OptimizeResponse, OptimizeError> {
        (**self).optimize(request)
    }
}

impl<T: RouteOptimizer + ?Sized> RouteOptimizer for std::sync::Arc<T> {
    fn optimize(&self, request: &OptimizeRequest) -> Result<OptimizeResponse, OptimizeError> {
        (**self).optimize(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Location::Depot, "depot")]
    #[case(Location::Pickup(OrderId(4)), "pickup of order#4")]
    #[case(Location::Delivery(OrderId(9)), "delivery of order#9")]
    fn locations_render_for_operators(#[case] location: Location, #[case] expected: &str) {
        assert_eq!(location.to_string(), expected);
    }

    #[rstest]
    fn invalid_coordinate_names_the_location() {
        let err = OptimizeError::InvalidCoordinate {
            location: Location::Pickup(OrderId(2)),
            source: CoordinateError::LatitudeOutOfRange(95.0),
        };
        assert_eq!(
            err.to_string(),
            "invalid coordinate at pickup of order#2: latitude 95 is outside [-90, 90]"
        );
    }

    #[rstest]
    fn empty_response_has_no_distance() {
        assert_eq!(OptimizeResponse::default().total_distance_km(), 0.0);
    }
}
