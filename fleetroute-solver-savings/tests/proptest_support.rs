//! Proptest strategies for savings optimizer property-based tests.
//!
//! Generated inputs satisfy the optimizer's preconditions: coordinates are in
//! range, weights are positive and order identifiers are unique.

use std::collections::HashSet;

use fleetroute_core::{OptimizeResponse, Order, OrderId, Vehicle};
use fleetroute_solver_savings::test_support::{order, vehicle};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

/// Strategy for a set of orders near the origin with unique identifiers.
///
/// Pickups and deliveries fall within two degrees of the origin so savings
/// are mostly positive on the flat test grid.
pub fn order_set_strategy(min_count: usize, max_count: usize) -> impl Strategy<Value = Vec<Order>> {
    proptest::collection::vec(order_parts_strategy(), min_count..=max_count).prop_map(|parts| {
        (1_u64..)
            .zip(parts)
            .map(|(id, (pickup, delivery, weight_kg))| order(id, pickup, delivery, weight_kg))
            .collect()
    })
}

fn order_parts_strategy() -> impl Strategy<Value = ((f64, f64), (f64, f64), u32)> {
    let point = || (-2.0_f64..2.0_f64, -2.0_f64..2.0_f64);
    (point(), point(), 1_u32..=600_u32)
}

/// Strategy for a fleet of active vehicles.
pub fn fleet_strategy(min_count: usize, max_count: usize) -> impl Strategy<Value = Vec<Vehicle>> {
    proptest::collection::vec(200_u32..=1500_u32, min_count..=max_count).prop_map(|capacities| {
        (1_u64..)
            .zip(capacities)
            .map(|(id, capacity_kg)| vehicle(id, capacity_kg))
            .collect()
    })
}

/// Every order appears on at most one plan, and at most once on it.
pub fn assert_orders_planned_once(response: &OptimizeResponse) -> Result<(), TestCaseError> {
    let mut seen = HashSet::new();
    for id in response.plans.iter().flat_map(|plan| plan.order_ids()) {
        prop_assert!(seen.insert(id), "{id} appears on more than one stop");
    }
    Ok(())
}

/// Planned and unassigned orders together account for every input order.
pub fn assert_orders_accounted_for(
    orders: &[Order],
    response: &OptimizeResponse,
) -> Result<(), TestCaseError> {
    let mut reported: Vec<OrderId> = response
        .plans
        .iter()
        .flat_map(|plan| plan.order_ids())
        .chain(response.unassigned.iter().copied())
        .collect();
    reported.sort_unstable();
    let mut expected: Vec<OrderId> = orders.iter().map(|order| order.id).collect();
    expected.sort_unstable();
    prop_assert_eq!(reported, expected);
    Ok(())
}
