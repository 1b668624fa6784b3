//! Persistence collaborators consumed by [`crate::plan_day`].
//!
//! The engine owns none of these stores. Implementations live with the
//! application; in-memory versions for tests are in `test_support`.

use jiff::civil::Date;
use thiserror::Error;

use crate::{Order, OrderId, OrderStatus, RoutePlan, Vehicle};

/// Errors reported by repository implementations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// The referenced order does not exist.
    #[error("{0} not found")]
    OrderNotFound(OrderId),
    /// The backing store failed.
    #[error("repository backend failed: {message}")]
    Backend {
        /// Backend error detail.
        message: String,
    },
}

/// Read eligible orders and record their status transitions.
pub trait OrderRepository: Send + Sync {
    /// Orders requested for `date` whose status allows routing.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] when the store cannot be read.
    fn eligible_orders(&self, date: Date) -> Result<Vec<Order>, RepositoryError>;

    /// Persist a new status for an order.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::OrderNotFound`] for unknown orders or
    /// [`RepositoryError::Backend`] when the write fails.
    fn update_status(&self, order: OrderId, status: OrderStatus) -> Result<(), RepositoryError>;
}

/// Read the vehicles available for planning.
pub trait VehicleRepository: Send + Sync {
    /// Every active vehicle.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] when the store cannot be read.
    fn active_vehicles(&self) -> Result<Vec<Vehicle>, RepositoryError>;
}

/// Persist finished route plans.
pub trait RouteRepository: Send + Sync {
    /// Store a plan and its stops, returning it with its identifier set.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] when the write fails.
    fn create_route(&self, plan: RoutePlan) -> Result<RoutePlan, RepositoryError>;
}
