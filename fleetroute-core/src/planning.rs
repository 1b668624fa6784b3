//! Plan one delivery day end to end against the repositories.

use jiff::civil::Date;
use log::info;
use thiserror::Error;

use crate::{
    OptimizeError, OptimizeRequest, OptimizeResponse, OrderId, OrderRepository, OrderStatus,
    RepositoryError, RouteOptimizer, RouteRepository, VehicleRepository,
};

/// Errors returned by [`plan_day`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanningError {
    /// Orders or vehicles could not be read.
    #[error("failed to load planning input: {0}")]
    Load(#[source] RepositoryError),
    /// The optimizer rejected the request.
    #[error(transparent)]
    Optimize(#[from] OptimizeError),
    /// A plan could not be stored.
    #[error("failed to persist route {name}: {source}")]
    Persist {
        /// Name of the plan that failed.
        name: String,
        /// Repository failure.
        #[source]
        source: RepositoryError,
    },
    /// An order status could not be written after its plan was stored.
    #[error("failed to mark {order} assigned: {source}")]
    StatusUpdate {
        /// Order whose status write failed.
        order: OrderId,
        /// Repository failure.
        #[source]
        source: RepositoryError,
    },
}

/// Read, optimize, persist, then record assignments for `date`.
///
/// Every plan is persisted before any order status is written, so a
/// persistence failure leaves all orders untouched and the day can be
/// re-planned. The returned response carries the persisted plans with their
/// repository identifiers.
///
/// # Errors
///
/// Returns [`PlanningError`] wrapping the first failing step.
pub fn plan_day<O, R, V, P>(
    optimizer: &O,
    orders: &R,
    vehicles: &V,
    routes: &P,
    date: Date,
) -> Result<OptimizeResponse, PlanningError>
where
    O: RouteOptimizer + ?Sized,
    R: OrderRepository + ?Sized,
    V: VehicleRepository + ?Sized,
    P: RouteRepository + ?Sized,
{
    let request = OptimizeRequest {
        date,
        orders: orders.eligible_orders(date).map_err(PlanningError::Load)?,
        vehicles: vehicles.active_vehicles().map_err(PlanningError::Load)?,
    };
    let mut response = optimizer.optimize(&request)?;

    let mut persisted = Vec::with_capacity(response.plans.len());
    for plan in std::mem::take(&mut response.plans) {
        let name = plan.name.clone();
        let stored = routes
            .create_route(plan)
            .map_err(|source| PlanningError::Persist { name, source })?;
        persisted.push(stored);
    }

    for order in persisted.iter().flat_map(|plan| plan.order_ids()) {
        orders
            .update_status(order, OrderStatus::Assigned)
            .map_err(|source| PlanningError::StatusUpdate { order, source })?;
    }

    info!(
        "planned {date}: {} routes, {} unassigned orders, {:.1} km",
        persisted.len(),
        response.unassigned.len(),
        persisted.iter().map(|plan| plan.total_distance_km).sum::<f64>()
    );
    response.plans = persisted;
    Ok(response)
}
