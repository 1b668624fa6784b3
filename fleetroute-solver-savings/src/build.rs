//! Turn vehicle assignments into persisted-ready route plans.

use jiff::civil::Date;
use log::warn;

use fleetroute_core::{Coordinate, DistanceProvider, DistanceSource, Leg, Order, RoutePlan};

use crate::assign::Assignment;

/// Legs driven when serving `orders` in sequence from `depot`.
///
/// Each order is picked up and delivered before the next pickup; the walk
/// starts and ends at the depot. No orders means no legs.
#[must_use]
pub fn route_legs(depot: Coordinate, orders: &[Order]) -> Vec<Leg> {
    let Some(last) = orders.last() else {
        return Vec::new();
    };
    let mut legs = Vec::with_capacity(orders.len() * 2 + 1);
    let mut at = depot;
    for order in orders {
        legs.push(Leg::new(at, order.pickup));
        legs.push(Leg::new(order.pickup, order.delivery));
        at = order.delivery;
    }
    legs.push(Leg::new(last.delivery, depot));
    legs
}

/// Whole minutes needed to drive `distance_km` at `speed_kmh`, rounded up.
///
/// A non-positive or non-finite speed yields zero.
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "value is clamped to the u32 range before the cast"
)]
pub fn estimate_minutes(distance_km: f64, speed_kmh: f64) -> u32 {
    if !speed_kmh.is_finite() || speed_kmh <= 0.0 {
        return 0;
    }
    let minutes = (distance_km / speed_kmh * 60.0).ceil();
    if minutes.is_nan() {
        return 0;
    }
    minutes.clamp(0.0, f64::from(u32::MAX)) as u32
}

/// Builds named route plans with distance and duration estimates.
#[derive(Debug)]
pub struct RouteBuilder<'a, S> {
    provider: &'a DistanceProvider<S>,
    depot: Coordinate,
    name_prefix: &'a str,
    average_speed_kmh: f64,
}

impl<'a, S: DistanceSource> RouteBuilder<'a, S> {
    /// Plans start and end at `depot` and are named `"{name_prefix} {k}"`.
    #[must_use]
    pub const fn new(
        provider: &'a DistanceProvider<S>,
        depot: Coordinate,
        name_prefix: &'a str,
        average_speed_kmh: f64,
    ) -> Self {
        Self {
            provider,
            depot,
            name_prefix,
            average_speed_kmh,
        }
    }

    /// Build the `position`-th plan (1-based) of a run.
    ///
    /// `orders` is the slice the assignment indexes into. Stops carry order
    /// snapshots already marked assigned.
    #[must_use]
    pub fn build(
        &self,
        position: usize,
        assignment: &Assignment<'_>,
        orders: &[Order],
        date: Date,
    ) -> RoutePlan {
        let stops: Vec<Order> = assignment
            .orders
            .iter()
            .filter_map(|idx| orders.get(*idx))
            .cloned()
            .map(|mut order| {
                if let Err(err) = order.mark_assigned() {
                    warn!("routing {} despite its status: {err}", order.id);
                }
                order
            })
            .collect();

        let total_distance_km: f64 = route_legs(self.depot, &stops)
            .into_iter()
            .map(|leg| self.provider.leg_distance(leg))
            .sum();

        let mut plan = RoutePlan::new(
            format!("{} {position}", self.name_prefix),
            assignment.vehicle,
            date,
            stops,
        );
        plan.capacity_kg = assignment.capacity_kg;
        plan.total_distance_km = total_distance_km;
        plan.estimated_duration_minutes = estimate_minutes(total_distance_km, self.average_speed_kmh);
        plan.optimized = true;
        plan
    }
}
